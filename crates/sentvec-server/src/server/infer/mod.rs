mod batch;
mod client;
pub mod encode;
pub mod executor;
pub mod handler;

pub use encode::{EncodeHandler, EncoderClient};
pub use executor::DedicatedExecutor;
use uuid::Uuid;

type TaskId = Uuid;
