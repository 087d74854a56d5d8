use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::server::data_models::ModelCard;
use crate::server::state::ServerState;

pub async fn get_model(State(server_state): State<Arc<ServerState>>) -> Json<ModelCard> {
    Json(server_state.model.clone())
}
