//! Wire types of the method channel shared with the host application.

mod handler;
mod registry;

pub use handler::MethodCallHandler;
pub use registry::ChannelRegistry;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ChannelError;

/// Method names understood by the plugin.
pub mod methods {
    #[allow(missing_docs)]
    pub const GET_PLATFORM_VERSION: &str = "getPlatformVersion";
    #[allow(missing_docs)]
    pub const SIGN_IN: &str = "sign_in";
    #[allow(missing_docs)]
    pub const SIGN_OUT: &str = "sign_out";
}

/// An inbound method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    #[allow(missing_docs)]
    pub method: String,
    /// Arguments as sent by the host. Usually a map, `null` when the method takes none.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    #[allow(missing_docs)]
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Read the argument stored under `key`. Returns `None` when the key is absent or the value
    /// does not have the requested shape.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.arguments.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }
}

/// The single answer owed to every [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodResponse {
    #[allow(missing_docs)]
    Success(Value),
    #[allow(missing_docs)]
    Error(ChannelError),
    /// The channel has no method with the requested name. This is not an error, the host
    /// interprets it as "missing implementation".
    NotImplemented,
}

impl MethodResponse {
    #[allow(missing_docs)]
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }
}

impl From<ChannelError> for MethodResponse {
    fn from(value: ChannelError) -> Self {
        MethodResponse::Error(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn call_without_arguments_decodes_to_null() {
        let call: MethodCall =
            serde_json::from_str(r#"{ "method": "sign_out" }"#).expect("Valid call");

        assert_eq!(call.method, methods::SIGN_OUT);
        assert_eq!(call.arguments, Value::Null);
    }

    #[test]
    fn argument_distinguishes_empty_from_absent() {
        let empty = MethodCall::new(methods::SIGN_IN, json!({ "permissions": [] }));
        let absent = MethodCall::new(methods::SIGN_IN, json!({}));
        let null = MethodCall::new(methods::SIGN_IN, json!({ "permissions": null }));
        let malformed = MethodCall::new(methods::SIGN_IN, json!({ "permissions": ["email", 3] }));

        assert_eq!(empty.argument::<Vec<String>>("permissions"), Some(vec![]));
        assert_eq!(absent.argument::<Vec<String>>("permissions"), None);
        assert_eq!(null.argument::<Vec<String>>("permissions"), None);
        assert_eq!(malformed.argument::<Vec<String>>("permissions"), None);
    }

    #[test]
    fn responses_use_tagged_envelopes() {
        let success = MethodResponse::Success(json!("Android 14"));
        let error = MethodResponse::Error(ChannelError::new(ErrorCode::Cancelled, "cancelled"));

        assert_eq!(
            serde_json::to_value(&success).expect("Serialization should not fail"),
            json!({ "success": "Android 14" })
        );
        assert_eq!(
            serde_json::to_value(&error).expect("Serialization should not fail"),
            json!({ "error": { "code": "cancelled", "message": "cancelled", "details": null } })
        );
        assert_eq!(
            serde_json::to_value(MethodResponse::NotImplemented)
                .expect("Serialization should not fail"),
            json!("not_implemented")
        );
    }
}
