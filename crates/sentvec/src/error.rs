use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid model repository string: {0}")]
    InvalidRepoString(&'static str),

    #[error("Model load error: {0}")]
    ModelLoad(&'static str),

    #[error("Unsupported model architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("Unsupported pooling configuration: {0}")]
    UnsupportedPooling(&'static str),

    #[error("Inference error: {0}")]
    Inference(&'static str),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Tokenization error: {0}")]
    Tokenization(#[from] tokenizers::Error),

    #[error("Serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("HF Hub error: {0}")]
    HFHub(#[from] hf_hub::api::sync::ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;
