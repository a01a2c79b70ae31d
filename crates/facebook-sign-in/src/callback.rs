//! Turns the SDK's login callbacks into answers for the pending `sign_in`.

use std::sync::Arc;

use tokio::{runtime::Handle, sync::mpsc};

use crate::{
    outcome::{LoginOutcome, LoginResult},
    pending::ResultSlot,
    sdk::LoginCallback,
};

enum LoginEvent {
    Success(LoginResult),
    Cancel,
    Error(Option<String>),
}

impl From<LoginEvent> for LoginOutcome {
    fn from(event: LoginEvent) -> Self {
        match event {
            LoginEvent::Success(result) => LoginOutcome::Success(result.into()),
            LoginEvent::Cancel => LoginOutcome::Cancelled,
            LoginEvent::Error(message) => LoginOutcome::Failed { message },
        }
    }
}

/// The [`LoginCallback`] registered with the SDK.
///
/// Callbacks may arrive on any thread and must not block it, so each event is queued and
/// handled by a task on the plugin's runtime. That task takes the pending caller out of the
/// slot, waiting for one to be put if necessary, and answers it. Events are handled strictly in
/// the order the SDK reported them.
pub struct LoginCallbackAdapter {
    events: mpsc::UnboundedSender<LoginEvent>,
}

impl LoginCallbackAdapter {
    pub(crate) fn spawn(slot: Arc<ResultSlot>, runtime: &Handle) -> Arc<Self> {
        let (events, receiver) = mpsc::unbounded_channel();
        runtime.spawn(resolve_events(slot, receiver));
        Arc::new(Self { events })
    }

    fn deliver(&self, event: LoginEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("Login event received after the plugin was detached");
        }
    }
}

impl LoginCallback for LoginCallbackAdapter {
    fn on_success(&self, result: LoginResult) {
        tracing::debug!(expires_at = ?result.access_token.expires_at(), "Login succeeded");
        self.deliver(LoginEvent::Success(result));
    }

    fn on_cancel(&self) {
        self.deliver(LoginEvent::Cancel);
    }

    fn on_error(&self, message: Option<String>) {
        self.deliver(LoginEvent::Error(message));
    }
}

async fn resolve_events(slot: Arc<ResultSlot>, mut receiver: mpsc::UnboundedReceiver<LoginEvent>) {
    while let Some(event) = receiver.recv().await {
        let outcome = LoginOutcome::from(event);
        match slot.pop_unless_abandoned().await {
            Ok(Some(pending)) => pending.complete_login(outcome),
            Ok(None) => tracing::warn!(
                outcome = outcome.kind(),
                "Discarding login event for an attempt that already timed out"
            ),
            Err(e) => {
                tracing::debug!("No longer resolving login events: {e}");
                break;
            }
        }
    }
}
