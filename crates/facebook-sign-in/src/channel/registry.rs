use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::{MethodCall, MethodCallHandler, MethodResponse};
use crate::{error::ChannelError, handle::CallerHandle};

/// Routes encoded method calls to the handler registered for their channel.
pub struct ChannelRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn MethodCallHandler>>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register `handler` for `channel`, replacing any previous handler.
    pub async fn register(&self, channel: impl Into<String>, handler: Arc<dyn MethodCallHandler>) {
        let channel = channel.into();
        tracing::debug!(%channel, "Registering method call handler");
        self.handlers.write().await.insert(channel, handler);
    }

    #[allow(missing_docs)]
    pub async fn unregister(&self, channel: &str) -> bool {
        self.handlers.write().await.remove(channel).is_some()
    }

    /// Decode `message`, dispatch it and wait for the answer, returning the encoded
    /// [`MethodResponse`].
    pub async fn handle_message(&self, channel: &str, message: &[u8]) -> Vec<u8> {
        let response = match serde_json::from_slice::<MethodCall>(message) {
            Ok(call) => self.dispatch(channel, call).await,
            Err(e) => {
                tracing::warn!(%channel, "Received undecodable method call: {e}");
                ChannelError::malformed_call(e).into()
            }
        };

        serde_json::to_vec(&response).expect("Serializing a MethodResponse should not fail")
    }

    /// Dispatch an already decoded call and wait for its answer.
    pub async fn dispatch(&self, channel: &str, call: MethodCall) -> MethodResponse {
        // Don't hold the lock while the handler waits on the SDK.
        let handler = self.handlers.read().await.get(channel).cloned();
        let Some(handler) = handler else {
            tracing::debug!(%channel, method = %call.method, "No handler registered for channel");
            return MethodResponse::NotImplemented;
        };

        let (handle, response) = CallerHandle::channel(call.method.clone());
        handler.handle(call, handle).await;
        response.recv().await
    }
}
