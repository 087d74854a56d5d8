/// Trait representing a (stateful) task processor that should run inside its
/// own thread.
pub trait RequestHandler
where
    Self: Send + Sized + 'static,
{
    type Input: Send + 'static;
    type Output: Send + 'static;

    fn handle(&mut self, request: Self::Input) -> anyhow::Result<Self::Output>;
}
