//! Capabilities the host platform provides to the plugin.

use std::{any::Any, sync::Arc};

use crate::outcome::LoginResult;

/// The foreground UI context a login is presented from.
pub trait Activity: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Lets platform bindings recover their own activity type.
    fn as_any(&self) -> &dyn Any;
}

/// A reference to the current foreground activity, if any.
pub type ActivityContext = Arc<dyn Activity>;

/// An activity result delivered by the operating system, forwarded to the SDK untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    #[allow(missing_docs)]
    pub request_code: i32,
    #[allow(missing_docs)]
    pub result_code: i32,
    /// Opaque result payload.
    pub data: Option<Vec<u8>>,
}

/// The native login SDK.
///
/// `log_in` returns immediately; the outcome is reported later, from any thread, through the
/// [`LoginCallback`] given to `register_callback`. Exactly one callback fires per `log_in`.
pub trait LoginSdk: Send + Sync {
    #[allow(missing_docs)]
    fn log_in(&self, activity: Option<ActivityContext>, permissions: Vec<String>);

    /// Log out synchronously.
    fn log_out(&self);

    #[allow(missing_docs)]
    fn register_callback(&self, callback: Arc<dyn LoginCallback>);

    #[allow(missing_docs)]
    fn unregister_callback(&self);

    /// Hand an activity result to the SDK's callback manager. Returns whether it was consumed.
    fn on_activity_result(&self, result: ActivityResult) -> bool;
}

/// Receives the outcome of a login started through [`LoginSdk::log_in`].
pub trait LoginCallback: Send + Sync {
    #[allow(missing_docs)]
    fn on_success(&self, result: LoginResult);

    #[allow(missing_docs)]
    fn on_cancel(&self);

    /// `message` is the SDK exception's message, which may be absent.
    fn on_error(&self, message: Option<String>);
}
