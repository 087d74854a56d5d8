use sentvec::{Embedding, Encoder};

use crate::server::infer::client::Client;
use crate::server::infer::handler::RequestHandler;
use crate::server::infer::DedicatedExecutor;
use crate::server::ServerError;

/// Owns the encoder on the worker thread.
pub struct EncodeHandler {
    encoder: Box<dyn Encoder>,
}

impl EncodeHandler {
    pub fn new(encoder: Box<dyn Encoder>) -> Self {
        Self { encoder }
    }
}

impl RequestHandler for EncodeHandler {
    type Input = Vec<String>;
    type Output = Vec<Embedding>;

    fn handle(&mut self, sentences: Vec<String>) -> anyhow::Result<Vec<Embedding>> {
        Ok(self.encoder.embed(&sentences)?)
    }
}

/// Handle used by the routes to reach the encoder worker.
#[derive(Clone)]
pub struct EncoderClient(Client<EncodeHandler>);

impl EncoderClient {
    pub(crate) fn new(executor: &DedicatedExecutor<EncodeHandler>) -> Self {
        Self(Client::new(executor))
    }

    pub async fn encode(&self, sentences: Vec<String>) -> Result<Vec<Embedding>, ServerError> {
        self.0.request(sentences).await?.map_err(ServerError::Inference)
    }
}
