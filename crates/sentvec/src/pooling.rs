use candle_core::{IndexOp, Tensor, D};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[cfg(feature = "clap")]
use clap::ValueEnum;

use crate::{Error, Result};

/// How per-token hidden states are reduced to one vector per sentence.
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Pooling {
    /// Select the CLS token as embedding
    Cls,
    /// Average the token embeddings, ignoring padding
    Mean,
}

/// Subset of a sentence-transformers `1_Pooling/config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PoolConfig {
    #[serde(default)]
    pooling_mode_cls_token: bool,
    #[serde(default)]
    pooling_mode_mean_tokens: bool,
}

impl Pooling {
    /// Pick the pooling strategy for a model: an explicit choice wins, then the
    /// repository's pooling config, then mean pooling.
    pub(crate) fn resolve(
        explicit: Option<Pooling>,
        pooling_config_path: Option<&Path>,
    ) -> Result<Pooling> {
        if let Some(pooling) = explicit {
            return Ok(pooling);
        }

        let Some(path) = pooling_config_path else {
            tracing::info!("No pooling configuration found, using mean pooling");
            return Ok(Pooling::Mean);
        };

        let config: PoolConfig = serde_json::from_str(&fs::read_to_string(path)?)?;

        if config.pooling_mode_cls_token {
            Ok(Pooling::Cls)
        } else if config.pooling_mode_mean_tokens {
            Ok(Pooling::Mean)
        } else {
            Err(Error::UnsupportedPooling(
                "only CLS and mean pooling are supported",
            ))
        }
    }

    /// Pool `hidden_states` of shape `(batch, tokens, hidden)` into `(batch, hidden)`.
    ///
    /// `attention_mask` has shape `(batch, tokens)` and is zero on padding.
    pub fn pool(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        match self {
            Pooling::Cls => Ok(hidden_states.i((.., 0))?),
            Pooling::Mean => {
                let mask = attention_mask
                    .to_dtype(hidden_states.dtype())?
                    .unsqueeze(D::Minus1)?;

                let summed = hidden_states.broadcast_mul(&mask)?.sum(1)?;
                let counts = mask.sum(1)?;

                Ok(summed.broadcast_div(&counts)?)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};
    use std::fs;
    use tempfile::tempdir;

    fn hidden_states() -> Result<Tensor> {
        // 2 sentences, 3 tokens, 2 dimensions
        Ok(Tensor::new(
            &[
                [[1f32, 1.], [3., 3.], [100., 100.]],
                [[2f32, 4.], [4., 8.], [6., 12.]],
            ],
            &Device::Cpu,
        )?)
    }

    #[test]
    fn test_mean_pooling_ignores_padding() -> Result<()> {
        let mask = Tensor::new(&[[1u32, 1, 0], [1, 1, 1]], &Device::Cpu)?;

        let pooled = Pooling::Mean.pool(&hidden_states()?, &mask)?;
        assert_eq!(pooled.dims2()?, (2, 2));

        let pooled = pooled.to_vec2::<f32>()?;
        assert_eq!(pooled[0], vec![2., 2.]);
        assert_eq!(pooled[1], vec![4., 8.]);

        Ok(())
    }

    #[test]
    fn test_cls_pooling() -> Result<()> {
        let mask = Tensor::ones((2, 3), DType::U32, &Device::Cpu)?;

        let pooled = Pooling::Cls.pool(&hidden_states()?, &mask)?.to_vec2::<f32>()?;
        assert_eq!(pooled, vec![vec![1., 1.], vec![2., 4.]]);

        Ok(())
    }

    #[test]
    fn test_resolve_prefers_explicit_choice() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"pooling_mode_mean_tokens": true}"#)?;

        let pooling = Pooling::resolve(Some(Pooling::Cls), Some(path.as_path()))?;
        assert_eq!(pooling, Pooling::Cls);

        Ok(())
    }

    #[test]
    fn test_resolve_from_pooling_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        fs::write(
            &path,
            r#"{
                "word_embedding_dimension": 384,
                "pooling_mode_cls_token": false,
                "pooling_mode_mean_tokens": true,
                "pooling_mode_max_tokens": false,
                "pooling_mode_mean_sqrt_len_tokens": false
            }"#,
        )?;
        assert_eq!(Pooling::resolve(None, Some(path.as_path()))?, Pooling::Mean);

        fs::write(&path, r#"{"pooling_mode_cls_token": true}"#)?;
        assert_eq!(Pooling::resolve(None, Some(path.as_path()))?, Pooling::Cls);

        fs::write(&path, r#"{"pooling_mode_max_tokens": true}"#)?;
        assert!(matches!(
            Pooling::resolve(None, Some(path.as_path())),
            Err(Error::UnsupportedPooling(_))
        ));

        Ok(())
    }

    #[test]
    fn test_resolve_defaults_to_mean() -> Result<()> {
        assert_eq!(Pooling::resolve(None, None)?, Pooling::Mean);
        Ok(())
    }
}
