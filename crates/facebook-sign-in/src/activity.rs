//! Tracks the foreground activity and forwards activity results to the SDK.

use std::sync::{Arc, RwLock};

use crate::sdk::{ActivityContext, ActivityResult, LoginSdk};

/// The activity the plugin is currently attached to.
///
/// Set and cleared by the host lifecycle; readers take a snapshot at the moment they need it
/// and never keep it across lifecycle transitions.
#[derive(Default)]
pub struct ActivityBinding {
    current: RwLock<Option<ActivityContext>>,
}

impl ActivityBinding {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `activity`, replacing whatever was bound before.
    pub fn attach(&self, activity: ActivityContext) {
        tracing::debug!(activity = %activity.name(), "Attached to activity");
        *self.current.write().expect("RwLock is not poisoned") = Some(activity);
    }

    /// Clear the binding, returning the activity that was bound.
    pub fn detach(&self) -> Option<ActivityContext> {
        let previous = self.current.write().expect("RwLock is not poisoned").take();
        if let Some(activity) = &previous {
            tracing::debug!(activity = %activity.name(), "Detached from activity");
        }
        previous
    }

    /// Snapshot of the bound activity.
    pub fn current(&self) -> Option<ActivityContext> {
        self.current.read().expect("RwLock is not poisoned").clone()
    }

    #[allow(missing_docs)]
    pub fn is_attached(&self) -> bool {
        self.current.read().expect("RwLock is not poisoned").is_some()
    }
}

/// Passes activity results through to the SDK while an activity is attached.
pub struct ActivityResultRelay {
    sdk: Arc<dyn LoginSdk>,
    activity: Arc<ActivityBinding>,
}

impl ActivityResultRelay {
    #[allow(missing_docs)]
    pub fn new(sdk: Arc<dyn LoginSdk>, activity: Arc<ActivityBinding>) -> Self {
        Self { sdk, activity }
    }

    /// Returns whether the SDK consumed the result. Results arriving while no activity is
    /// attached are not forwarded.
    pub fn on_activity_result(&self, result: ActivityResult) -> bool {
        if !self.activity.is_attached() {
            tracing::debug!(
                request_code = result.request_code,
                "Ignoring activity result while detached from an activity"
            );
            return false;
        }
        self.sdk.on_activity_result(result)
    }
}
