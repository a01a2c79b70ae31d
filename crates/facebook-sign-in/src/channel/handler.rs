use super::MethodCall;
use crate::handle::CallerHandle;

/// Receives the method calls sent over one channel.
///
/// The handler owns the [`CallerHandle`] from the moment it is called and must eventually
/// answer it, either before returning or later from another task.
#[async_trait::async_trait]
pub trait MethodCallHandler: Send + Sync {
    /// Handle a call. Returning only means the channel may accept the next message, the answer
    /// can still be pending.
    async fn handle(&self, call: MethodCall, handle: CallerHandle);
}
