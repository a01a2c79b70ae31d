use facebook_sign_in_threading::{AttemptToken, PendingResultSlot};
use serde_json::Value;

use crate::{handle::CallerHandle, outcome::LoginOutcome};

/// The slot shared by the dispatcher and the login callback.
pub(crate) type ResultSlot = PendingResultSlot<PendingCall>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingKind {
    SignIn,
    SignOut,
}

/// A caller parked in the [`ResultSlot`].
#[derive(Debug)]
pub(crate) struct PendingCall {
    pub(crate) token: AttemptToken,
    pub(crate) kind: PendingKind,
    pub(crate) handle: CallerHandle,
}

impl PendingCall {
    pub(crate) fn new(token: AttemptToken, kind: PendingKind, handle: CallerHandle) -> Self {
        Self {
            token,
            kind,
            handle,
        }
    }

    /// Answer the caller with the outcome reported by the SDK.
    pub(crate) fn complete_login(self, outcome: LoginOutcome) {
        match self.kind {
            PendingKind::SignIn => {
                tracing::debug!(attempt = %self.token, outcome = outcome.kind(), "Resolving sign in");
                self.handle.respond(outcome.into());
            }
            PendingKind::SignOut => {
                // Only happens if the SDK reports a login nobody asked for. The sign out itself
                // has already been performed, so it is answered as usual.
                tracing::warn!(
                    attempt = %self.token,
                    outcome = outcome.kind(),
                    "Login event arrived while a sign out was pending"
                );
                self.handle.resolve(Value::Null);
            }
        }
    }
}
