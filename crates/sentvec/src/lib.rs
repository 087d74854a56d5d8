#![doc = include_str!("../README.md")]

mod config;
pub mod device;
pub mod encoder;
mod error;
pub mod model;
pub mod pooling;
pub mod repo;
pub mod utils;

pub use candle_core::Device;
pub use encoder::{Embedding, Encoder, SentenceEncoder};
pub use error::{Error, Result};
pub use pooling::Pooling;
