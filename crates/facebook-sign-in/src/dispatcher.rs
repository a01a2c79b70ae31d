//! Handles the method calls arriving on the plugin's channel.

use std::{sync::Arc, time::Duration};

use facebook_sign_in_threading::{AttemptCounter, AttemptToken, CancellationToken, PutError};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::instrument;

use crate::{
    activity::ActivityBinding,
    channel::{MethodCall, MethodCallHandler, MethodResponse, methods},
    error::ChannelError,
    handle::CallerHandle,
    pending::{PendingCall, PendingKind, ResultSlot},
    sdk::LoginSdk,
};

/// Validates incoming calls and drives the SDK and the result slot.
///
/// `sign_in` parks its caller in the slot before starting the login, and the caller is answered
/// later by the [`LoginCallbackAdapter`](crate::LoginCallbackAdapter). Because the slot holds a
/// single entry, a second `sign_in` waits until the first one has been answered before it
/// reaches the SDK, and `sign_out` waits for an in-flight login in the same way.
pub struct RequestDispatcher {
    sdk: Arc<dyn LoginSdk>,
    slot: Arc<ResultSlot>,
    activity: Arc<ActivityBinding>,
    attempts: AttemptCounter,
    login_timeout: Option<Duration>,
    platform_version: String,
    runtime: Handle,
    shutdown: CancellationToken,
}

pub(crate) struct DispatcherParts {
    pub(crate) sdk: Arc<dyn LoginSdk>,
    pub(crate) slot: Arc<ResultSlot>,
    pub(crate) activity: Arc<ActivityBinding>,
    pub(crate) login_timeout: Option<Duration>,
    pub(crate) platform_version: String,
    pub(crate) runtime: Handle,
    pub(crate) shutdown: CancellationToken,
}

impl RequestDispatcher {
    pub(crate) fn new(parts: DispatcherParts) -> Self {
        Self {
            sdk: parts.sdk,
            slot: parts.slot,
            activity: parts.activity,
            attempts: AttemptCounter::new(),
            login_timeout: parts.login_timeout,
            platform_version: parts.platform_version,
            runtime: parts.runtime,
            shutdown: parts.shutdown,
        }
    }

    /// Handle `call`, answering `handle` now or once the SDK reports back.
    ///
    /// Returns as soon as the channel can take the next call: immediately for invalid calls,
    /// after the login has been started for `sign_in`, and after the logout has completed for
    /// `sign_out`. Both of the latter wait for the slot first.
    /// Calls arriving after the plugin detached are rejected with `detached`.
    pub async fn handle_call(&self, call: MethodCall, handle: CallerHandle) {
        if self.shutdown.is_cancelled() {
            handle.reject(ChannelError::detached());
            return;
        }

        match call.method.as_str() {
            methods::GET_PLATFORM_VERSION => {
                handle.resolve(Value::String(self.platform_version.clone()));
            }
            methods::SIGN_IN => match call.argument::<Vec<String>>("permissions") {
                Some(permissions) => self.sign_in(permissions, handle).await,
                None => {
                    tracing::debug!("Rejecting sign in without permissions");
                    handle.reject(ChannelError::missing_permissions());
                }
            },
            methods::SIGN_OUT => self.sign_out(handle).await,
            other => {
                tracing::debug!(method = other, "Method not implemented");
                handle.not_implemented();
            }
        }
    }

    /// Handle `call` and wait for its answer.
    pub async fn invoke(&self, call: MethodCall) -> MethodResponse {
        let (handle, response) = CallerHandle::channel(call.method.clone());
        self.handle_call(call, handle).await;
        response.recv().await
    }

    #[instrument(skip(self, handle))]
    async fn sign_in(&self, permissions: Vec<String>, handle: CallerHandle) {
        let token = self.attempts.next();
        let pending = PendingCall::new(token, PendingKind::SignIn, handle);

        if let Err(PutError(pending)) = self.slot.put(pending).await {
            pending.handle.reject(ChannelError::detached());
            return;
        }

        // A new login supersedes any that timed out, so their events are no longer expected.
        let stale = self.slot.clear_abandoned();
        if stale > 0 {
            tracing::warn!(attempt = %token, stale, "Timed out logins never reported back");
        }

        tracing::debug!(attempt = %token, "Starting login");
        self.sdk.log_in(self.activity.current(), permissions);

        if let Some(timeout) = self.login_timeout {
            self.spawn_watchdog(token, timeout);
        }
    }

    #[instrument(skip(self, handle))]
    async fn sign_out(&self, handle: CallerHandle) {
        let token = self.attempts.next();
        let pending = PendingCall::new(token, PendingKind::SignOut, handle);

        if let Err(PutError(pending)) = self.slot.put(pending).await {
            pending.handle.reject(ChannelError::detached());
            return;
        }

        self.sdk.log_out();

        match self.slot.take_if(|pending| pending.token == token) {
            Some(pending) => {
                tracing::debug!(attempt = %token, "Signed out");
                pending.handle.resolve(Value::Null);
            }
            // A stray login event got to the entry first and has answered it already.
            None => tracing::debug!(attempt = %token, "Sign out was answered by a login event"),
        }
    }

    /// Give up on `token` once `timeout` has passed. The SDK may still report the outcome
    /// later; until the next login starts, the slot discards that event instead of pairing it
    /// with a newer caller.
    fn spawn_watchdog(&self, token: AttemptToken, timeout: Duration) {
        let slot = self.slot.clone();
        let shutdown = self.shutdown.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if let Some(pending) = slot.abandon_if(|pending| pending.token == token) {
                        tracing::warn!(attempt = %token, ?timeout, "Login timed out");
                        pending.handle.reject(ChannelError::timeout());
                    }
                }
            }
        });
    }
}

#[async_trait::async_trait]
impl MethodCallHandler for RequestDispatcher {
    async fn handle(&self, call: MethodCall, handle: CallerHandle) {
        self.handle_call(call, handle).await;
    }
}
