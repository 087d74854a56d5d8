use anyhow::Result;
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::server::infer::batch::QueueEntry;
use crate::server::infer::handler::RequestHandler;

const WORKER_THREAD_NAME: &str = "encoder-worker";

/// Queue command
pub(crate) enum Command<THandler>
where
    THandler: RequestHandler,
{
    Append(QueueEntry<THandler>),
    Stop,
}

/// Owns a stateful request handler on a dedicated OS thread.
///
/// Requests are processed one at a time, in the order they were queued. The
/// worker stops when the executor is dropped, after draining what was queued
/// before the drop.
pub struct DedicatedExecutor<THandler>
where
    THandler: RequestHandler,
{
    pub(crate) tx: UnboundedSender<Command<THandler>>,
}

impl<THandler> DedicatedExecutor<THandler>
where
    THandler: RequestHandler,
{
    pub fn new(handler: THandler) -> Result<Self> {
        let (tx, rx) = unbounded_channel();

        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || queue_task(rx, handler))?;

        Ok(Self { tx })
    }
}

impl<THandler> Drop for DedicatedExecutor<THandler>
where
    THandler: RequestHandler,
{
    fn drop(&mut self) {
        if self.tx.send(Command::Stop).is_err() {
            tracing::warn!("Worker already stopped");
        }
    }
}

fn queue_task<THandler>(mut receiver: UnboundedReceiver<Command<THandler>>, mut handler: THandler)
where
    THandler: RequestHandler,
{
    while let Some(cmd) = receiver.blocking_recv() {
        match cmd {
            Command::Append(entry) => {
                tracing::trace!(
                    "Processing task {}, added {}ms ago",
                    entry.id,
                    entry.queue_time.elapsed().as_millis()
                );

                let response = handler.handle(entry.request);
                if let Err(err) = &response {
                    tracing::error!("Task {} failed: {:#}", entry.id, err);
                }

                if entry.response_tx.send(response).is_ok() {
                    tracing::trace!("Successfully sent response for task {}", entry.id)
                } else {
                    tracing::warn!("Requester for task {} went away", entry.id)
                }
            }
            Command::Stop => {
                tracing::info!("Stopping queue task");
                break;
            }
        }
    }
}
