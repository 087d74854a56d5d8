use anyhow::Result;
use sentvec::Encoder;

use crate::server::data_models::ModelCard;
use crate::server::infer::{DedicatedExecutor, EncodeHandler, EncoderClient};

/// Represents the state of the server.
pub struct ServerState {
    pub client: EncoderClient,
    pub model: ModelCard,
    // Dropping the state stops the encoder worker.
    _executor: DedicatedExecutor<EncodeHandler>,
}

impl ServerState {
    /// Move the encoder onto its worker thread.
    pub fn new(model_id: impl Into<String>, encoder: Box<dyn Encoder>) -> Result<Self> {
        let model = ModelCard::new(model_id, encoder.dimension());
        let executor = DedicatedExecutor::new(EncodeHandler::new(encoder))?;
        let client = EncoderClient::new(&executor);

        Ok(Self {
            client,
            model,
            _executor: executor,
        })
    }
}
