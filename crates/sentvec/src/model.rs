use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;

// Re-exports
pub use candle_transformers::models::{bert::BertModel, jina_bert::BertModel as JinaBertModel};

use crate::config::Architecture;
use crate::repo::WeightsPath;
use crate::Result;

/// A transformer that maps token ids `(batch, tokens)` to hidden states
/// `(batch, tokens, hidden)`.
pub trait EncoderModel: Send {
    fn forward(&self, token_ids: &Tensor) -> Result<Tensor>;

    fn device(&self) -> &Device;
}

impl EncoderModel for BertModel {
    #[inline]
    fn forward(&self, token_ids: &Tensor) -> Result<Tensor> {
        let token_type_ids = token_ids.zeros_like()?;
        Ok(BertModel::forward(self, token_ids, &token_type_ids)?)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

impl EncoderModel for JinaBertModel {
    #[inline]
    fn forward(&self, token_ids: &Tensor) -> Result<Tensor> {
        Ok(Module::forward(self, token_ids)?)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

pub(crate) fn load_model(
    weights: &WeightsPath,
    architecture: &Architecture,
    device: &Device,
) -> Result<Box<dyn EncoderModel>> {
    tracing::debug!("loading weights from {:?}", weights);

    let vb = match weights {
        WeightsPath::Pth(path) => VarBuilder::from_pth(path, DType::F32, device)?,
        // SAFETY: the weights file is not modified while the model is alive.
        WeightsPath::Safetensors(path) => unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)?
        },
    };

    Ok(match architecture {
        Architecture::Bert(cfg) => Box::new(BertModel::load(vb, cfg)?),
        Architecture::JinaBert(cfg) => Box::new(JinaBertModel::new(vb, cfg)?),
    })
}
