use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use facebook_sign_in_threading::CancellationToken;
use tokio::runtime::Handle;

use crate::{
    activity::{ActivityBinding, ActivityResultRelay},
    callback::LoginCallbackAdapter,
    channel::{ChannelRegistry, MethodCall, MethodResponse},
    dispatcher::{DispatcherParts, RequestDispatcher},
    error::ChannelError,
    handle::CallerHandle,
    pending::ResultSlot,
    sdk::{ActivityContext, ActivityResult, LoginSdk},
    settings::PluginSettings,
};

/// The plugin instance, alive between engine attach and detach.
///
/// Owns the result slot and registers its [`LoginCallbackAdapter`] with the SDK it was given;
/// nothing is registered globally. Dropping the plugin detaches it.
pub struct FacebookSignInPlugin {
    settings: PluginSettings,
    sdk: Arc<dyn LoginSdk>,
    slot: Arc<ResultSlot>,
    activity: Arc<ActivityBinding>,
    dispatcher: Arc<RequestDispatcher>,
    relay: ActivityResultRelay,
    shutdown: CancellationToken,
    detached: AtomicBool,
}

impl FacebookSignInPlugin {
    /// Attach to the engine: register the login callback with `sdk` and start resolving login
    /// events on `runtime`.
    pub fn attach(sdk: Arc<dyn LoginSdk>, settings: PluginSettings, runtime: Handle) -> Self {
        let slot = Arc::new(ResultSlot::new());
        let activity = Arc::new(ActivityBinding::new());
        let shutdown = CancellationToken::new();

        let callback = LoginCallbackAdapter::spawn(slot.clone(), &runtime);
        sdk.register_callback(callback);

        let dispatcher = Arc::new(RequestDispatcher::new(DispatcherParts {
            sdk: sdk.clone(),
            slot: slot.clone(),
            activity: activity.clone(),
            login_timeout: settings.login_timeout(),
            platform_version: settings.platform_version(),
            runtime,
            shutdown: shutdown.clone(),
        }));
        let relay = ActivityResultRelay::new(sdk.clone(), activity.clone());

        tracing::info!(channel = %settings.channel_name, "Facebook sign in plugin attached");

        Self {
            settings,
            sdk,
            slot,
            activity,
            dispatcher,
            relay,
            shutdown,
            detached: AtomicBool::new(false),
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// The handler answering this plugin's channel.
    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        self.dispatcher.clone()
    }

    /// Register the dispatcher in `registry` under the configured channel name.
    pub async fn register(&self, registry: &ChannelRegistry) {
        registry
            .register(self.settings.channel_name.clone(), self.dispatcher.clone())
            .await;
    }

    /// See [`RequestDispatcher::handle_call`]. Calls made after detaching are rejected.
    pub async fn handle_method_call(&self, call: MethodCall, handle: CallerHandle) {
        self.dispatcher.handle_call(call, handle).await;
    }

    /// Handle `call` and wait for its answer.
    pub async fn invoke(&self, call: MethodCall) -> MethodResponse {
        let (handle, response) = CallerHandle::channel(call.method.clone());
        self.handle_method_call(call, handle).await;
        response.recv().await
    }

    #[allow(missing_docs)]
    pub fn on_attached_to_activity(&self, activity: ActivityContext) {
        self.activity.attach(activity);
    }

    #[allow(missing_docs)]
    pub fn on_reattached_to_activity_for_config_changes(&self, activity: ActivityContext) {
        self.activity.attach(activity);
    }

    #[allow(missing_docs)]
    pub fn on_detached_from_activity_for_config_changes(&self) {
        self.activity.detach();
    }

    #[allow(missing_docs)]
    pub fn on_detached_from_activity(&self) {
        self.activity.detach();
    }

    /// Forward an activity result to the SDK. Returns whether it was consumed.
    pub fn on_activity_result(&self, result: ActivityResult) -> bool {
        self.relay.on_activity_result(result)
    }

    #[allow(missing_docs)]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Detach from the engine: unregister the login callback, reject the caller still waiting
    /// in the slot (and any caller waiting to get into it) with a `detached` error, and stop
    /// pending timeouts. Calling it again has no effect.
    pub fn detach(&self) {
        if self.detached.swap(true, Ordering::AcqRel) {
            return;
        }

        self.sdk.unregister_callback();
        self.shutdown.cancel();
        self.activity.detach();

        if let Some(pending) = self.slot.close() {
            tracing::debug!(attempt = %pending.token, "Rejecting pending call on detach");
            pending.handle.reject(ChannelError::detached());
        }

        tracing::info!(channel = %self.settings.channel_name, "Facebook sign in plugin detached");
    }
}

impl Drop for FacebookSignInPlugin {
    fn drop(&mut self) {
        self.detach();
    }
}
