pub type Result<T, E = FacebookSignInError> = std::result::Result<T, E>;

// Name is converted from *Error to *Exception, so we can't just name the enum Error because
// Exception already exists
#[derive(uniffi::Error, thiserror::Error, Debug)]
pub enum FacebookSignInError {
    #[error("Failed to start the plugin runtime: {0}")]
    Runtime(String),

    #[error("Native login SDK failed: {0}")]
    NativeSdk(String),

    #[error("Callback invocation failed")]
    CallbackError,
}

/// Required From implementation for UNIFFI callback error handling
/// Converts unexpected mobile exceptions into FacebookSignInError
impl From<uniffi::UnexpectedUniFFICallbackError> for FacebookSignInError {
    fn from(_: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::CallbackError
    }
}
