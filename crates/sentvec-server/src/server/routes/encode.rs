use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tokio::time::Instant;

use crate::server::data_models::EncodedSentence;
use crate::server::state::ServerState;
use crate::server::ServerError;

/// Embed a JSON array of strings, answering in input order.
pub async fn encode_batch(
    State(server_state): State<Arc<ServerState>>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<Vec<EncodedSentence>>, ServerError> {
    let Json(sentences) = payload?;
    tracing::info!("Encoding {} sentences: {:?}", sentences.len(), sentences);

    let start = Instant::now();
    let vectors = server_state.client.encode(sentences.clone()).await?;
    tracing::trace!("Inference took {} ms", start.elapsed().as_millis());

    Ok(Json(EncodedSentence::zip(sentences, vectors)?))
}
