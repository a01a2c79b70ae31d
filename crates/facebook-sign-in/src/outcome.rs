//! Results of a login attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{channel::MethodResponse, error::ChannelError};

/// The access token the native SDK hands back after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    #[allow(missing_docs)]
    pub token: String,
    #[allow(missing_docs)]
    pub user_id: String,
    /// Expiry as epoch milliseconds, exactly as the SDK reports it. Tokens that never expire
    /// may carry values far outside any calendar range.
    pub expires: i64,
    /// Granted permissions, in the order the SDK reports them.
    pub permissions: Vec<String>,
    /// Declined permissions, in the order the SDK reports them.
    pub declined_permissions: Vec<String>,
}

impl AccessToken {
    /// The expiry as a timestamp, or `None` when it is out of range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires)
    }
}

/// Payload of the SDK's success callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    #[allow(missing_docs)]
    pub access_token: AccessToken,
}

/// The mapping `sign_in` resolves with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignInResponse {
    #[allow(missing_docs)]
    pub access_token: String,
    #[allow(missing_docs)]
    pub user_id: String,
    /// Token expiry as epoch milliseconds.
    pub expires: i64,
    #[allow(missing_docs)]
    pub permissions: Vec<String>,
    #[allow(missing_docs)]
    pub declined_permissions: Vec<String>,
}

impl From<LoginResult> for SignInResponse {
    fn from(result: LoginResult) -> Self {
        let token = result.access_token;
        SignInResponse {
            access_token: token.token,
            user_id: token.user_id,
            expires: token.expires,
            permissions: token.permissions,
            declined_permissions: token.declined_permissions,
        }
    }
}

/// How a login attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    #[allow(missing_docs)]
    Success(SignInResponse),
    /// The user backed out of the login UI.
    Cancelled,
    /// The SDK failed. The message is whatever the SDK provided, possibly nothing.
    Failed {
        #[allow(missing_docs)]
        message: Option<String>,
    },
}

impl LoginOutcome {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            LoginOutcome::Success(_) => "success",
            LoginOutcome::Cancelled => "cancelled",
            LoginOutcome::Failed { .. } => "failed",
        }
    }
}

impl From<LoginOutcome> for MethodResponse {
    fn from(outcome: LoginOutcome) -> Self {
        match outcome {
            LoginOutcome::Success(response) => MethodResponse::Success(
                serde_json::to_value(response).expect("Serializing SignInResponse should not fail"),
            ),
            LoginOutcome::Cancelled => ChannelError::cancelled().into(),
            LoginOutcome::Failed { message } => ChannelError::exception(message).into(),
        }
    }
}
