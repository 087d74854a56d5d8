//! Model configuration
//!
//! An encoder is defined by the `config.json` at the root of a Hugging Face model
//! repository and by its pooling strategy (optionally defined in a
//! `1_Pooling/config.json` file in the same repository).

use candle_transformers::models::bert::Config as BertConfig;
use candle_transformers::models::jina_bert::Config as JinaBertConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::pooling::Pooling;
use crate::{Error, Result};

/// The fields of `config.json` shared by every supported architecture.
#[derive(Debug, Deserialize)]
struct BaseModelConfig {
    #[serde(default)]
    architectures: Vec<String>,
    model_type: String,
    hidden_size: usize,
    #[serde(alias = "n_positions")]
    max_position_embeddings: usize,
}

pub(crate) enum Architecture {
    Bert(BertConfig),
    JinaBert(JinaBertConfig),
}

pub(crate) struct ModelDefinition {
    pub(crate) architecture: Architecture,
    pub(crate) pooling: Pooling,
    /// Size of the produced embeddings.
    pub(crate) hidden_size: usize,
    pub(crate) max_position_embeddings: usize,
}

impl ModelDefinition {
    pub(crate) fn from_files(
        config_path: &Path,
        pooling_config_path: Option<&Path>,
        pooling: Option<Pooling>,
    ) -> Result<Self> {
        let config_str = fs::read_to_string(config_path)?;
        let base: BaseModelConfig = serde_json::from_str(&config_str)?;
        let architecture = parse_architecture(&base, &config_str)?;
        let pooling = Pooling::resolve(pooling, pooling_config_path)?;

        Ok(Self {
            architecture,
            pooling,
            hidden_size: base.hidden_size,
            max_position_embeddings: base.max_position_embeddings,
        })
    }
}

fn parse_architecture(base: &BaseModelConfig, config_str: &str) -> Result<Architecture> {
    let is_jina = base
        .architectures
        .iter()
        .any(|arch| arch.starts_with("JinaBert"));

    match base.model_type.as_str() {
        "bert" if is_jina => Ok(Architecture::JinaBert(serde_json::from_str(config_str)?)),
        "bert" => Ok(Architecture::Bert(serde_json::from_str(config_str)?)),
        other => Err(Error::UnsupportedArchitecture(other.to_string())),
    }
}
