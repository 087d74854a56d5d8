use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use sentvec::device::{default_device, print_device_info};
use sentvec::{Encoder, Pooling, SentenceEncoder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::server::routes::{default, encode, model};
use crate::server::state::ServerState;

#[derive(Debug, Args)]
pub struct RouterArgs {
    /// Hugging Face Hub repository, as `repo_id` or `repo_id:revision`.
    #[clap(
        short,
        long,
        default_value = "sentence-transformers/all-MiniLM-L6-v2",
        conflicts_with = "model_folder"
    )]
    pub model_repo: String,

    /// Local folder holding config.json, tokenizer.json and the weights.
    #[clap(long)]
    pub model_folder: Option<PathBuf>,

    /// Overrides the pooling strategy found in the model folder.
    #[clap(long, value_enum)]
    pub pooling: Option<Pooling>,

    /// L2-normalize every returned vector.
    #[clap(long)]
    pub normalize: bool,

    /// Abort requests that take longer than this many seconds.
    #[clap(long)]
    pub timeout_secs: Option<u64>,
}

pub fn init_router(args: &RouterArgs) -> anyhow::Result<Router> {
    let device = default_device()?;
    print_device_info(&device);

    let builder = SentenceEncoder::builder();
    let (builder, model_id) = match &args.model_folder {
        Some(folder) => (
            builder.with_model_folder(folder),
            folder.display().to_string(),
        ),
        None => (
            builder.with_model_repo(&args.model_repo)?,
            args.model_repo.clone(),
        ),
    };
    let builder = match args.pooling {
        Some(pooling) => builder.with_pooling(pooling),
        None => builder,
    };

    tracing::info!("Loading model {}", model_id);
    let encoder = builder
        .with_normalize(args.normalize)
        .with_device(device)
        .build()?;
    tracing::info!(
        "Loaded model {} (dimension {}, {:?} pooling)",
        model_id,
        encoder.dimension(),
        encoder.pooling()
    );

    router_with_encoder(
        model_id,
        Box::new(encoder),
        args.timeout_secs.map(Duration::from_secs),
    )
}

/// Build the service around an already loaded encoder.
pub fn router_with_encoder(
    model_id: impl Into<String>,
    encoder: Box<dyn Encoder>,
    timeout: Option<Duration>,
) -> anyhow::Result<Router> {
    let state = Arc::new(ServerState::new(model_id, encoder)?);

    let router = Router::new()
        .route("/", post(encode::encode_batch))
        .route("/health", get(default::health_check))
        .route("/model", get(model::get_model))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                // Log the matched route's path (with placeholders not filled in).
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                )
            }),
        );

    let router = match timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    };

    Ok(router)
}
