use candle_core::{Device, Tensor};
use std::marker::PhantomData;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

use crate::config::ModelDefinition;
use crate::model::{load_model, EncoderModel};
use crate::pooling::Pooling;
use crate::repo::{ModelFiles, ModelSource};
use crate::utils::normalize_l2;
use crate::{Error, Result};

/// A single sentence embedding.
pub type Embedding = Vec<f32>;

/// Anything that turns a batch of sentences into one embedding per sentence.
///
/// Implementations must return exactly one vector per input, in input order, and
/// every vector must have length [`Encoder::dimension`].
pub trait Encoder: Send {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>>;

    fn dimension(&self) -> usize;
}

/// A pretrained transformer with its tokenizer and pooling strategy.
pub struct SentenceEncoder {
    model: Box<dyn EncoderModel>,
    tokenizer: Tokenizer,
    pooling: Pooling,
    normalize: bool,
    dimension: usize,
}

impl SentenceEncoder {
    /// Retrieve a builder object for constructing a [`SentenceEncoder`] instance.
    pub fn builder() -> SentenceEncoderBuilder<Uninitialised> {
        SentenceEncoderBuilder::new()
    }

    fn from_source(
        source: &ModelSource,
        device: &Device,
        pooling: Option<Pooling>,
        normalize: bool,
    ) -> Result<Self> {
        let span = tracing::span!(tracing::Level::TRACE, "encoder-load");
        let _enter = span.enter();

        let ModelFiles {
            config,
            tokenizer,
            weights,
            pooling_config,
        } = source.resolve_files()?;

        let definition = ModelDefinition::from_files(&config, pooling_config.as_deref(), pooling)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer)?;
        tokenizer.with_padding(None);
        tokenizer.with_truncation(Some(TruncationParams {
            max_length: definition.max_position_embeddings,
            ..Default::default()
        }))?;

        let model = load_model(&weights, &definition.architecture, device)?;

        tracing::debug!(
            "loaded encoder with dimension {} and {:?} pooling",
            definition.hidden_size,
            definition.pooling
        );

        Ok(Self {
            model,
            tokenizer,
            pooling: definition.pooling,
            normalize,
            dimension: definition.hidden_size,
        })
    }

    pub fn pooling(&self) -> Pooling {
        self.pooling
    }

    /// Run the model over a batch and return the pooled `(batch, hidden)` tensor.
    pub fn encode_batch(&self, sentences: &[String]) -> Result<Tensor> {
        let span = tracing::span!(tracing::Level::TRACE, "encoder-encode-batch");
        let _enter = span.enter();

        let inputs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let encodings = self.tokenizer.encode_batch(inputs, true)?;

        let sequences: Vec<&[u32]> = encodings.iter().map(|e| e.get_ids()).collect();
        let embeddings = embed_token_ids(self.model.as_ref(), self.pooling, &sequences)?;

        let embeddings = if self.normalize {
            normalize_l2(&embeddings)?
        } else {
            embeddings
        };

        tracing::trace!("generated embeddings {:?}", embeddings.shape());
        Ok(embeddings)
    }
}

impl Encoder for SentenceEncoder {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        // The model can't run on a zero-sized batch.
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.encode_batch(sentences)?.to_vec2::<f32>()?;
        if embeddings.len() != sentences.len() {
            return Err(Error::Inference(
                "model returned a different number of embeddings than sentences",
            ));
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Run every sequence through the model on its own and pool it into one row.
///
/// The Bert forward pass takes no attention mask, so padded batches would let
/// padding tokens change the hidden states of the real ones.
fn embed_token_ids(
    model: &dyn EncoderModel,
    pooling: Pooling,
    sequences: &[&[u32]],
) -> Result<Tensor> {
    let device = model.device();
    let pooled = sequences
        .iter()
        .map(|ids| {
            let token_ids = Tensor::new(*ids, device)?.unsqueeze(0)?;
            let attention_mask = token_ids.ones_like()?;

            tracing::trace!("running inference on {:?}", token_ids.shape());
            let hidden_states = model.forward(&token_ids)?;
            pooling.pool(&hidden_states, &attention_mask)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Tensor::cat(&pooled, 0)?)
}

pub trait BuilderState {}

pub struct Uninitialised;
pub struct Initialised;

impl BuilderState for Uninitialised {}
impl BuilderState for Initialised {}

pub struct SentenceEncoderBuilder<S>
where
    S: BuilderState,
{
    source: Option<ModelSource>,
    pooling: Option<Pooling>,
    normalize: bool,
    device: Device,
    _marker: PhantomData<S>,
}

impl Default for SentenceEncoderBuilder<Uninitialised> {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceEncoderBuilder<Uninitialised> {
    pub fn new() -> SentenceEncoderBuilder<Uninitialised> {
        Self {
            source: None,
            pooling: None,
            normalize: false,
            device: Device::Cpu,
            _marker: PhantomData,
        }
    }
}

impl<S> SentenceEncoderBuilder<S>
where
    S: BuilderState,
{
    fn with_source(self, source: ModelSource) -> SentenceEncoderBuilder<Initialised> {
        SentenceEncoderBuilder::<Initialised> {
            source: Some(source),
            pooling: self.pooling,
            normalize: self.normalize,
            device: self.device,
            _marker: PhantomData,
        }
    }

    /// Load from a `<repo>[:<revision>]` on the Hugging Face Hub.
    pub fn with_model_repo<MR: AsRef<str>>(
        self,
        model_repo: MR,
    ) -> Result<SentenceEncoderBuilder<Initialised>> {
        let source = ModelSource::from_repo_string(model_repo.as_ref())?;
        Ok(self.with_source(source))
    }

    /// Load from a local folder laid out like a Hugging Face model repository.
    pub fn with_model_folder<P: AsRef<Path>>(
        self,
        model_folder: P,
    ) -> SentenceEncoderBuilder<Initialised> {
        self.with_source(ModelSource::from_path(model_folder))
    }

    pub fn with_pooling(self, pooling: Pooling) -> Self {
        Self {
            pooling: Some(pooling),
            ..self
        }
    }

    pub fn with_normalize(self, normalize: bool) -> Self {
        Self { normalize, ..self }
    }

    pub fn with_device(self, device: Device) -> Self {
        Self { device, ..self }
    }
}

impl SentenceEncoderBuilder<Initialised> {
    pub fn build(self) -> Result<SentenceEncoder> {
        match self.source {
            None => Err(Error::ModelLoad("No model directory or repository given.")),
            Some(source) => SentenceEncoder::from_source(
                &source,
                &self.device,
                self.pooling,
                self.normalize,
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use candle_core::DType;
    use candle_nn::{VarBuilder, VarMap};
    use candle_transformers::models::bert::{BertModel, Config as BertConfig};
    use tempfile::tempdir;

    const TINY_BERT_CONFIG: &str = r#"{
        "vocab_size": 16,
        "hidden_size": 8,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "max_position_embeddings": 32,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null,
        "model_type": "bert"
    }"#;

    /// A two-layer Bert with random weights.
    fn tiny_bert() -> Result<BertModel> {
        let config: BertConfig = serde_json::from_str(TINY_BERT_CONFIG)?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = BertModel::load(vb, &config)?;

        for var in varmap.all_vars() {
            let random = Tensor::randn(0f32, 1f32, var.as_tensor().dims(), &Device::Cpu)?;
            var.set(&random)?;
        }

        Ok(model)
    }

    #[test]
    fn test_vector_does_not_depend_on_batch() -> Result<()> {
        let model = tiny_bert()?;
        let short: &[u32] = &[1, 5, 2];
        let long: &[u32] = &[1, 3, 4, 6, 7, 2];

        for pooling in [Pooling::Mean, Pooling::Cls] {
            let alone = embed_token_ids(&model, pooling, &[short])?.to_vec2::<f32>()?;
            let batched = embed_token_ids(&model, pooling, &[long, short])?.to_vec2::<f32>()?;

            assert_eq!(batched.len(), 2);
            assert_eq!(batched[1].len(), 8);
            for (a, b) in alone[0].iter().zip(&batched[1]) {
                assert_relative_eq!(*a, *b, epsilon = 1e-5);
            }
            assert_ne!(batched[0], batched[1]);
        }

        Ok(())
    }

    #[test]
    fn test_build_from_incomplete_folder_fails() -> Result<()> {
        let dir = tempdir()?;

        let result = SentenceEncoder::builder()
            .with_model_folder(dir.path())
            .with_pooling(Pooling::Cls)
            .with_normalize(true)
            .build();
        assert!(matches!(result, Err(Error::ModelLoad(_))));

        Ok(())
    }

    #[test]
    fn test_invalid_repo_string_fails_early() {
        let result = SentenceEncoder::builder().with_model_repo("not|a|repo");
        assert!(matches!(result, Err(Error::InvalidRepoString(_))));
    }
}
