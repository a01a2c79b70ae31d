#![allow(dead_code)]

use std::{
    any::Any,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use facebook_sign_in::{
    AccessToken, FacebookSignInPlugin, LoginResult, MethodCall, MethodResponse, PluginSettings,
    sdk::{Activity, ActivityContext, ActivityResult, LoginCallback, LoginSdk},
};
use serde_json::json;
use tokio::task::JoinHandle;

/// A login started through the mock SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct LogIn {
    pub activity: Option<String>,
    pub permissions: Vec<String>,
}

/// Records every call the plugin makes and lets the test fire the login callback.
#[derive(Default)]
pub struct MockSdk {
    callback: Mutex<Option<Arc<dyn LoginCallback>>>,
    log_ins: Mutex<Vec<LogIn>>,
    log_outs: AtomicUsize,
    unregistered: AtomicBool,
    activity_results: Mutex<Vec<ActivityResult>>,
}

impl MockSdk {
    pub fn callback(&self) -> Arc<dyn LoginCallback> {
        self.callback
            .lock()
            .expect("Mutex is not poisoned")
            .clone()
            .expect("Callback should be registered")
    }

    pub fn log_ins(&self) -> Vec<LogIn> {
        self.log_ins.lock().expect("Mutex is not poisoned").clone()
    }

    pub fn log_in_count(&self) -> usize {
        self.log_ins.lock().expect("Mutex is not poisoned").len()
    }

    pub fn log_out_count(&self) -> usize {
        self.log_outs.load(Ordering::SeqCst)
    }

    pub fn is_unregistered(&self) -> bool {
        self.unregistered.load(Ordering::SeqCst)
    }

    pub fn activity_results(&self) -> Vec<ActivityResult> {
        self.activity_results
            .lock()
            .expect("Mutex is not poisoned")
            .clone()
    }

    /// Fire `on_success` from another thread, the way the native SDK does.
    pub fn succeed_on_native_thread(&self, result: LoginResult) {
        let callback = self.callback();
        std::thread::spawn(move || callback.on_success(result))
            .join()
            .expect("Thread should not panic");
    }
}

impl LoginSdk for MockSdk {
    fn log_in(&self, activity: Option<ActivityContext>, permissions: Vec<String>) {
        self.log_ins
            .lock()
            .expect("Mutex is not poisoned")
            .push(LogIn {
                activity: activity.map(|activity| activity.name()),
                permissions,
            });
    }

    fn log_out(&self) {
        self.log_outs.fetch_add(1, Ordering::SeqCst);
    }

    fn register_callback(&self, callback: Arc<dyn LoginCallback>) {
        *self.callback.lock().expect("Mutex is not poisoned") = Some(callback);
    }

    fn unregister_callback(&self) {
        self.unregistered.store(true, Ordering::SeqCst);
    }

    fn on_activity_result(&self, result: ActivityResult) -> bool {
        self.activity_results
            .lock()
            .expect("Mutex is not poisoned")
            .push(result);
        true
    }
}

pub struct TestActivity(pub &'static str);

impl Activity for TestActivity {
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn attach(settings: PluginSettings) -> (Arc<MockSdk>, Arc<FacebookSignInPlugin>) {
    let sdk = Arc::new(MockSdk::default());
    let plugin = FacebookSignInPlugin::attach(
        sdk.clone(),
        settings,
        tokio::runtime::Handle::current(),
    );
    (sdk, Arc::new(plugin))
}

pub fn sign_in_call(permissions: &[&str]) -> MethodCall {
    MethodCall::new("sign_in", json!({ "permissions": permissions }))
}

/// Invoke `call` on a separate task so the test can keep driving the SDK.
pub fn spawn_invoke(
    plugin: &Arc<FacebookSignInPlugin>,
    call: MethodCall,
) -> JoinHandle<MethodResponse> {
    let plugin = plugin.clone();
    tokio::spawn(async move { plugin.invoke(call).await })
}

/// Wait until `condition` holds, failing the test after a few seconds.
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Condition was not met in time");
}

/// Give other tasks a chance to run, so that the absence of an effect is meaningful.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

pub fn login_result(user_id: &str, permissions: &[&str], declined: &[&str]) -> LoginResult {
    LoginResult {
        access_token: AccessToken {
            token: "T".into(),
            user_id: user_id.into(),
            expires: 1_700_000_000,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            declined_permissions: declined.iter().map(|p| p.to_string()).collect(),
        },
    }
}

pub fn error_code(response: &MethodResponse) -> &'static str {
    match response {
        MethodResponse::Error(error) => error.code.as_str(),
        other => panic!("Expected an error, got {other:?}"),
    }
}
