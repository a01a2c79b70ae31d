mod common;

use common::*;
use facebook_sign_in::{MethodCall, MethodResponse, PluginSettings};
use serde_json::Value;

fn sign_out_call() -> MethodCall {
    MethodCall::new("sign_out", Value::Null)
}

#[tokio::test]
async fn sign_out_without_a_pending_sign_in_completes_immediately() {
    let (sdk, plugin) = attach(PluginSettings::default());

    let response = plugin.invoke(sign_out_call()).await;

    assert_eq!(response, MethodResponse::Success(Value::Null));
    assert_eq!(sdk.log_out_count(), 1);
}

#[tokio::test]
async fn repeated_sign_outs_each_complete() {
    let (sdk, plugin) = attach(PluginSettings::default());

    for _ in 0..3 {
        assert!(plugin.invoke(sign_out_call()).await.is_success());
    }
    assert_eq!(sdk.log_out_count(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sign_out_waits_for_the_pending_sign_in() {
    let (sdk, plugin) = attach(PluginSettings::default());

    let sign_in = spawn_invoke(&plugin, sign_in_call(&["public_profile"]));
    eventually(|| sdk.log_in_count() == 1).await;

    let sign_out = spawn_invoke(&plugin, sign_out_call());
    settle().await;
    assert!(!sign_out.is_finished());
    assert_eq!(sdk.log_out_count(), 0, "Logout must wait for the login callback");

    sdk.succeed_on_native_thread(login_result("U123", &["public_profile"], &[]));

    assert!(sign_in.await.expect("Task panicked").is_success());
    assert_eq!(
        sign_out.await.expect("Task panicked"),
        MethodResponse::Success(Value::Null)
    );
    assert_eq!(sdk.log_out_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sign_in_after_sign_out_starts_a_new_login() {
    let (sdk, plugin) = attach(PluginSettings::default());

    assert!(plugin.invoke(sign_out_call()).await.is_success());

    let sign_in = spawn_invoke(&plugin, sign_in_call(&["email"]));
    eventually(|| sdk.log_in_count() == 1).await;
    sdk.callback().on_cancel();

    assert_eq!(error_code(&sign_in.await.expect("Task panicked")), "cancelled");
}
