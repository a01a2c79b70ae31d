use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The error kinds understood by the host side of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// `sign_in` was called without a usable `permissions` argument.
    MissingPermissions,
    /// The user dismissed the login UI.
    Cancelled,
    /// The native SDK reported a failure.
    Exception,
    /// No login callback arrived within the configured timeout.
    Timeout,
    /// The plugin was detached from the engine before the call could complete.
    Detached,
    /// The call was dropped without ever being answered.
    Abandoned,
    /// The incoming message could not be decoded as a method call.
    MalformedCall,
}

impl ErrorCode {
    /// The string sent over the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingPermissions => "missing_permissions",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Exception => "exception",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Detached => "detached",
            ErrorCode::Abandoned => "abandoned",
            ErrorCode::MalformedCall => "malformed_call",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error answer to a method call.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {}", .message.as_deref().unwrap_or("<no message>"))]
pub struct ChannelError {
    #[allow(missing_docs)]
    pub code: ErrorCode,
    /// Human readable message. Not guaranteed to be present for SDK failures.
    pub message: Option<String>,
    /// Extra information for the host, forwarded untouched.
    pub details: Option<Value>,
}

impl ChannelError {
    #[allow(missing_docs)]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            details: None,
        }
    }

    #[allow(missing_docs)]
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub(crate) fn missing_permissions() -> Self {
        Self::new(ErrorCode::MissingPermissions, "No permissions").with_details("")
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "User has cancelled the operation").with_details("")
    }

    pub(crate) fn exception(message: Option<String>) -> Self {
        Self {
            code: ErrorCode::Exception,
            message,
            details: Some("Exception while executing the operation".into()),
        }
    }

    pub(crate) fn timeout() -> Self {
        Self::new(
            ErrorCode::Timeout,
            "The login did not complete within the configured timeout",
        )
    }

    pub(crate) fn detached() -> Self {
        Self::new(ErrorCode::Detached, "The plugin has been detached")
    }

    pub(crate) fn abandoned() -> Self {
        Self::new(ErrorCode::Abandoned, "The call was dropped without a response")
    }

    pub(crate) fn malformed_call(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MalformedCall,
            format!("Failed to read method call: {reason}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn codes_serialize_as_wire_strings() {
        for code in [
            ErrorCode::MissingPermissions,
            ErrorCode::Cancelled,
            ErrorCode::Exception,
            ErrorCode::Timeout,
            ErrorCode::Detached,
            ErrorCode::Abandoned,
            ErrorCode::MalformedCall,
        ] {
            assert_eq!(
                serde_json::to_value(code).expect("Serialization should not fail"),
                json!(code.as_str())
            );
        }
    }

    #[test]
    fn exception_keeps_an_absent_sdk_message() {
        let error = ChannelError::exception(None);

        assert_eq!(error.code, ErrorCode::Exception);
        assert_eq!(error.message, None);
        assert_eq!(error.to_string(), "exception: <no message>");
    }
}
