//! The caller side of a method call.

use serde_json::Value;
use tokio::sync::oneshot;

use crate::{channel::MethodResponse, error::ChannelError};

/// Delivers the answer to a method call back to whoever sent it. Implemented by the host's
/// result object, or by a [`oneshot`] sender for calls made from Rust.
pub trait Reply: Send {
    #[allow(missing_docs)]
    fn send(self: Box<Self>, response: MethodResponse);
}

impl Reply for oneshot::Sender<MethodResponse> {
    fn send(self: Box<Self>, response: MethodResponse) {
        if oneshot::Sender::send(*self, response).is_err() {
            tracing::debug!("Caller stopped waiting before the response was delivered");
        }
    }
}

/// A caller awaiting exactly one answer.
///
/// Every terminal operation consumes the handle, so a caller can never be answered twice. A
/// handle that is dropped without being answered replies with an `abandoned` error instead of
/// leaving the caller waiting forever.
pub struct CallerHandle {
    method: String,
    reply: Option<Box<dyn Reply>>,
}

impl std::fmt::Debug for CallerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerHandle")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl CallerHandle {
    #[allow(missing_docs)]
    pub fn new(method: impl Into<String>, reply: impl Reply + 'static) -> Self {
        Self {
            method: method.into(),
            reply: Some(Box::new(reply)),
        }
    }

    /// Create a handle whose answer can be awaited through the returned [`ResponseReceiver`].
    pub fn channel(method: impl Into<String>) -> (Self, ResponseReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self::new(method, tx), ResponseReceiver(rx))
    }

    /// The method this handle answers.
    pub fn method(&self) -> &str {
        &self.method
    }

    #[allow(missing_docs)]
    pub fn resolve(self, value: Value) {
        self.respond(MethodResponse::Success(value));
    }

    #[allow(missing_docs)]
    pub fn reject(self, error: ChannelError) {
        self.respond(MethodResponse::Error(error));
    }

    #[allow(missing_docs)]
    pub fn not_implemented(self) {
        self.respond(MethodResponse::NotImplemented);
    }

    #[allow(missing_docs)]
    pub fn respond(mut self, response: MethodResponse) {
        if let Some(reply) = self.reply.take() {
            reply.send(response);
        }
    }
}

impl Drop for CallerHandle {
    fn drop(&mut self) {
        if let Some(reply) = self.reply.take() {
            tracing::warn!(method = %self.method, "Caller handle dropped without a response");
            reply.send(MethodResponse::Error(ChannelError::abandoned()));
        }
    }
}

/// Receives the answer for a handle created by [`CallerHandle::channel`].
#[derive(Debug)]
pub struct ResponseReceiver(oneshot::Receiver<MethodResponse>);

impl ResponseReceiver {
    /// Wait for the answer.
    pub async fn recv(self) -> MethodResponse {
        self.0
            .await
            .unwrap_or_else(|_| MethodResponse::Error(ChannelError::abandoned()))
    }

    /// Return the answer if it has already been delivered.
    pub fn try_recv(&mut self) -> Option<MethodResponse> {
        self.0.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::error::ErrorCode;

    #[derive(Clone, Default)]
    struct RecordingReply(Arc<Mutex<Vec<MethodResponse>>>);

    impl Reply for RecordingReply {
        fn send(self: Box<Self>, response: MethodResponse) {
            self.0.lock().expect("Mutex is not poisoned").push(response);
        }
    }

    #[tokio::test]
    async fn resolve_delivers_the_value() {
        let (handle, receiver) = CallerHandle::channel("sign_in");

        handle.resolve(json!({ "user_id": "U123" }));

        assert_eq!(
            receiver.recv().await,
            MethodResponse::Success(json!({ "user_id": "U123" }))
        );
    }

    #[test]
    fn not_implemented_is_distinct_from_an_error() {
        let (handle, mut receiver) = CallerHandle::channel("unknown");
        assert_eq!(handle.method(), "unknown");

        handle.not_implemented();

        assert_eq!(receiver.try_recv(), Some(MethodResponse::NotImplemented));
    }

    #[test]
    fn answering_sends_exactly_one_response() {
        let reply = RecordingReply::default();
        let handle = CallerHandle::new("sign_in", reply.clone());

        handle.reject(ChannelError::cancelled());

        let responses = reply.0.lock().expect("Mutex is not poisoned");
        assert_eq!(responses.len(), 1);
        assert!(matches!(
            &responses[0],
            MethodResponse::Error(e) if e.code == ErrorCode::Cancelled
        ));
    }

    #[test]
    fn dropping_an_unanswered_handle_replies_abandoned() {
        let reply = RecordingReply::default();
        drop(CallerHandle::new("sign_in", reply.clone()));

        let responses = reply.0.lock().expect("Mutex is not poisoned");
        assert!(matches!(
            responses.as_slice(),
            [MethodResponse::Error(e)] if e.code == ErrorCode::Abandoned
        ));
    }

    #[test]
    fn try_recv_is_empty_until_answered() {
        let (handle, mut receiver) = CallerHandle::channel("sign_out");

        assert_eq!(receiver.try_recv(), None);
        handle.resolve(Value::Null);
        assert_eq!(receiver.try_recv(), Some(MethodResponse::Success(Value::Null)));
    }
}
