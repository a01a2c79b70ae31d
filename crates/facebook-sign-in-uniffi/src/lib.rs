#![doc = include_str!("../README.md")]

uniffi::setup_scaffolding!();

use std::sync::Arc;

use facebook_sign_in::{
    CallerHandle, ChannelError, ErrorCode, FacebookSignInPlugin, MethodCall, PluginSettings,
    sdk::ActivityResult,
};
use serde_json::Value;
use tokio::sync::mpsc;

mod error;
pub mod platform;

pub use error::{FacebookSignInError, Result};
use platform::{ActivityBridge, ForeignReply, LoginSdkBridge, MethodResult, NativeActivity};

struct InboundCall {
    /// `Err` when the arguments could not be decoded. The rejection still waits its turn.
    call: Result<MethodCall, ChannelError>,
    handle: CallerHandle,
}

/// The plugin instance owned by the host while it is attached to the engine.
#[derive(uniffi::Object)]
pub struct FacebookSignInClient {
    plugin: Arc<FacebookSignInPlugin>,
    calls: mpsc::UnboundedSender<InboundCall>,
    // Shut down after the plugin has detached.
    _runtime: tokio::runtime::Runtime,
}

#[uniffi::export]
impl FacebookSignInClient {
    /// Attach the plugin, registering its login callback with `sdk`.
    #[uniffi::constructor]
    pub fn new(
        sdk: Arc<dyn platform::NativeLoginSdk>,
        settings: Option<PluginSettings>,
    ) -> Result<Self> {
        init_logger();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("facebook-sign-in")
            .enable_all()
            .build()
            .map_err(|e| FacebookSignInError::Runtime(e.to_string()))?;

        let plugin = Arc::new(FacebookSignInPlugin::attach(
            Arc::new(LoginSdkBridge::new(sdk)),
            settings.unwrap_or_default(),
            runtime.handle().clone(),
        ));

        // Calls are handled one at a time in arrival order, like the platform's main thread.
        let (calls, mut inbound) = mpsc::unbounded_channel::<InboundCall>();
        let dispatcher = plugin.clone();
        runtime.spawn(async move {
            while let Some(InboundCall { call, handle }) = inbound.recv().await {
                match call {
                    Ok(call) => dispatcher.handle_method_call(call, handle).await,
                    Err(error) => handle.reject(error),
                }
            }
        });

        Ok(Self {
            plugin,
            calls,
            _runtime: runtime,
        })
    }

    /// Name of the method channel the host should register.
    pub fn channel_name(&self) -> String {
        self.plugin.settings().channel_name.clone()
    }

    /// Handle a call received on the method channel. Returns immediately; `result` is answered
    /// once the call completes.
    pub fn on_method_call(
        &self,
        method: String,
        arguments_json: Option<String>,
        result: Arc<dyn MethodResult>,
    ) {
        let handle = CallerHandle::new(method.clone(), ForeignReply(result));

        let call = match arguments_json
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
        {
            Ok(arguments) => Ok(MethodCall::new(method, arguments.unwrap_or(Value::Null))),
            Err(e) => Err(ChannelError::new(
                ErrorCode::MalformedCall,
                format!("Failed to read the arguments of `{method}`: {e}"),
            )),
        };

        if let Err(mpsc::error::SendError(inbound)) = self.calls.send(InboundCall { call, handle })
        {
            inbound.handle.reject(ChannelError::new(
                ErrorCode::Detached,
                "The plugin is no longer attached",
            ));
        }
    }

    #[allow(missing_docs)]
    pub fn on_attached_to_activity(&self, activity: Arc<dyn NativeActivity>) {
        self.plugin
            .on_attached_to_activity(Arc::new(ActivityBridge(activity)));
    }

    #[allow(missing_docs)]
    pub fn on_reattached_to_activity_for_config_changes(&self, activity: Arc<dyn NativeActivity>) {
        self.plugin
            .on_reattached_to_activity_for_config_changes(Arc::new(ActivityBridge(activity)));
    }

    #[allow(missing_docs)]
    pub fn on_detached_from_activity_for_config_changes(&self) {
        self.plugin.on_detached_from_activity_for_config_changes();
    }

    #[allow(missing_docs)]
    pub fn on_detached_from_activity(&self) {
        self.plugin.on_detached_from_activity();
    }

    /// Forward an activity result to the SDK. Returns whether it was consumed.
    pub fn on_activity_result(
        &self,
        request_code: i32,
        result_code: i32,
        data: Option<Vec<u8>>,
    ) -> bool {
        self.plugin.on_activity_result(ActivityResult {
            request_code,
            result_code,
            data,
        })
    }

    /// Detach the plugin from the engine. Pending and waiting calls are rejected.
    pub fn detach(&self) {
        self.plugin.detach();
    }
}

impl Drop for FacebookSignInClient {
    fn drop(&mut self) {
        self.plugin.detach();
    }
}

fn init_logger() {
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    #[cfg(target_os = "ios")]
    let _ = oslog::OsLogger::new("com.facebook.signin")
        .level_filter(log::LevelFilter::Info)
        .init();

    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_tag("facebook_sign_in")
            .with_max_level(log::LevelFilter::Info),
    );
}
