//! Callback interfaces implemented by the host platform, and the bridges that adapt them to the
//! traits `facebook-sign-in` is written against.

use std::{
    any::Any,
    sync::{Arc, Mutex},
};

use facebook_sign_in::{
    AccessToken, LoginResult, MethodResponse,
    handle::Reply,
    sdk::{Activity, ActivityContext, ActivityResult, LoginCallback, LoginSdk},
};

use crate::error::Result;

/// The Facebook `LoginManager` together with its `CallbackManager`.
#[uniffi::export(with_foreign)]
pub trait NativeLoginSdk: Send + Sync {
    /// Start a login. Must return without waiting for the user.
    fn log_in(
        &self,
        activity: Option<Arc<dyn NativeActivity>>,
        permissions: Vec<String>,
    ) -> Result<()>;

    /// Log out synchronously.
    fn log_out(&self) -> Result<()>;

    /// Route the SDK's login callbacks to `callback`.
    fn register_callback(&self, callback: Arc<LoginCallbackHandle>) -> Result<()>;

    /// Stop routing login callbacks.
    fn unregister_callback(&self) -> Result<()>;

    /// Hand an activity result to the callback manager. Returns whether it was consumed.
    fn on_activity_result(
        &self,
        request_code: i32,
        result_code: i32,
        data: Option<Vec<u8>>,
    ) -> Result<bool>;
}

/// The foreground activity or view controller.
#[uniffi::export(with_foreign)]
pub trait NativeActivity: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> String;
}

/// Answers one method channel call. Exactly one of the methods is invoked per call.
#[uniffi::export(with_foreign)]
pub trait MethodResult: Send + Sync {
    /// The call succeeded. `result_json` is the JSON encoded result value.
    fn success(&self, result_json: String) -> Result<()>;

    /// The call failed with an error `code`, optional message and optional JSON encoded details.
    fn error(
        &self,
        code: String,
        message: Option<String>,
        details_json: Option<String>,
    ) -> Result<()>;

    /// The method is not handled by this plugin.
    fn not_implemented(&self) -> Result<()>;
}

/// The access token reported by the SDK on a successful login.
#[derive(uniffi::Record, Debug, Clone)]
pub struct NativeAccessToken {
    /// The token string.
    pub token: String,
    /// Facebook user id.
    pub user_id: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_millis: i64,
    /// Granted permissions.
    pub permissions: Vec<String>,
    /// Declined permissions.
    pub declined_permissions: Vec<String>,
}

impl From<NativeAccessToken> for LoginResult {
    fn from(token: NativeAccessToken) -> Self {
        LoginResult {
            access_token: AccessToken {
                token: token.token,
                user_id: token.user_id,
                expires: token.expires_millis,
                permissions: token.permissions,
                declined_permissions: token.declined_permissions,
            },
        }
    }
}

/// Receives the SDK's login callbacks. Handed to [`NativeLoginSdk::register_callback`].
///
/// Every method returns immediately and may be called from any thread.
#[derive(uniffi::Object)]
pub struct LoginCallbackHandle(Arc<dyn LoginCallback>);

#[uniffi::export]
impl LoginCallbackHandle {
    /// The login succeeded.
    pub fn on_success(&self, access_token: NativeAccessToken) {
        self.0.on_success(access_token.into());
    }

    /// The user cancelled the login.
    pub fn on_cancel(&self) {
        self.0.on_cancel();
    }

    /// The login failed with the SDK exception's message.
    pub fn on_error(&self, message: Option<String>) {
        self.0.on_error(message);
    }
}

/// Implements [`LoginSdk`] on top of a [`NativeLoginSdk`].
pub(crate) struct LoginSdkBridge {
    native: Arc<dyn NativeLoginSdk>,
    callback: Mutex<Option<Arc<dyn LoginCallback>>>,
}

impl LoginSdkBridge {
    pub(crate) fn new(native: Arc<dyn NativeLoginSdk>) -> Self {
        Self {
            native,
            callback: Mutex::new(None),
        }
    }

    fn registered_callback(&self) -> Option<Arc<dyn LoginCallback>> {
        self.callback
            .lock()
            .expect("Mutex is not poisoned")
            .clone()
    }
}

impl LoginSdk for LoginSdkBridge {
    fn log_in(&self, activity: Option<ActivityContext>, permissions: Vec<String>) {
        let activity = activity.and_then(|activity| {
            activity
                .as_any()
                .downcast_ref::<ActivityBridge>()
                .map(|bridge| bridge.0.clone())
        });

        if let Err(e) = self.native.log_in(activity, permissions) {
            // No SDK callback will follow, so the pending caller is answered here.
            tracing::error!("Native log in failed: {e}");
            match self.registered_callback() {
                Some(callback) => callback.on_error(Some(e.to_string())),
                None => tracing::warn!("No login callback registered to report the failure"),
            }
        }
    }

    fn log_out(&self) {
        if let Err(e) = self.native.log_out() {
            tracing::error!("Native log out failed: {e}");
        }
    }

    fn register_callback(&self, callback: Arc<dyn LoginCallback>) {
        *self.callback.lock().expect("Mutex is not poisoned") = Some(callback.clone());
        if let Err(e) = self
            .native
            .register_callback(Arc::new(LoginCallbackHandle(callback)))
        {
            tracing::error!("Registering the login callback failed: {e}");
        }
    }

    fn unregister_callback(&self) {
        self.callback.lock().expect("Mutex is not poisoned").take();
        if let Err(e) = self.native.unregister_callback() {
            tracing::error!("Unregistering the login callback failed: {e}");
        }
    }

    fn on_activity_result(&self, result: ActivityResult) -> bool {
        self.native
            .on_activity_result(result.request_code, result.result_code, result.data)
            .unwrap_or_else(|e| {
                tracing::error!("Forwarding the activity result failed: {e}");
                false
            })
    }
}

/// Implements [`Activity`] on top of a [`NativeActivity`].
pub(crate) struct ActivityBridge(pub(crate) Arc<dyn NativeActivity>);

impl Activity for ActivityBridge {
    fn name(&self) -> String {
        self.0.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Implements [`Reply`] on top of a [`MethodResult`].
pub(crate) struct ForeignReply(pub(crate) Arc<dyn MethodResult>);

impl Reply for ForeignReply {
    fn send(self: Box<Self>, response: MethodResponse) {
        let delivered = match response {
            MethodResponse::Success(value) => self.0.success(value.to_string()),
            MethodResponse::Error(error) => self.0.error(
                error.code.as_str().to_owned(),
                error.message,
                error.details.map(|details| details.to_string()),
            ),
            MethodResponse::NotImplemented => self.0.not_implemented(),
        };

        if let Err(e) = delivered {
            tracing::error!("Delivering the method result failed: {e}");
        }
    }
}
