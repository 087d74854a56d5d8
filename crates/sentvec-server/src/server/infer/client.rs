use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use crate::server::infer::batch::{QueueEntry, Response};
use crate::server::infer::executor::Command;
use crate::server::infer::handler::RequestHandler;
use crate::server::infer::DedicatedExecutor;
use crate::server::ServerError;

pub(crate) struct Client<THandler>
where
    THandler: RequestHandler,
{
    tx: UnboundedSender<Command<THandler>>,
}

impl<THandler> Client<THandler>
where
    THandler: RequestHandler,
{
    pub(crate) fn new(executor: &DedicatedExecutor<THandler>) -> Self {
        Self {
            tx: executor.tx.clone(),
        }
    }

    /// Queue a request and wait for the worker's answer.
    pub(crate) async fn request(&self, value: THandler::Input) -> Result<Response<THandler>, ServerError> {
        let (tx, rx) = oneshot::channel();

        let command = Command::Append(QueueEntry::new(value, tx));
        self.tx
            .send(command)
            .map_err(|_| ServerError::EncoderUnavailable)?;

        rx.await.map_err(|_| ServerError::EncoderUnavailable)
    }
}

impl<THandler> Clone for Client<THandler>
where
    THandler: RequestHandler,
{
    fn clone(&self) -> Self {
        Client {
            tx: self.tx.clone(),
        }
    }
}
