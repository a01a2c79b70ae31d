#![doc = include_str!("../README.md")]

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

pub mod activity;
mod callback;
pub mod channel;
mod dispatcher;
mod error;
pub mod handle;
pub mod outcome;
mod pending;
mod plugin;
pub mod sdk;
mod settings;

pub use callback::LoginCallbackAdapter;
pub use channel::{ChannelRegistry, MethodCall, MethodCallHandler, MethodResponse};
pub use dispatcher::RequestDispatcher;
pub use error::{ChannelError, ErrorCode};
pub use handle::CallerHandle;
pub use outcome::{AccessToken, LoginOutcome, LoginResult, SignInResponse};
pub use plugin::FacebookSignInPlugin;
pub use settings::{DEFAULT_CHANNEL_NAME, PluginSettings};
