use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The channel name the host application uses to reach this plugin.
pub const DEFAULT_CHANNEL_NAME: &str = "facebook_sign_in";

/// Plugin behavior settings. They are fixed once the plugin has been attached.
///
/// Defaults to
///
/// ```
/// # use facebook_sign_in::PluginSettings;
/// let settings = PluginSettings {
///     channel_name: "facebook_sign_in".to_string(),
///     login_timeout_ms: None,
///     platform_version: None,
/// };
/// assert_eq!(settings, PluginSettings::default());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct PluginSettings {
    /// Name of the method channel the plugin answers on.
    pub channel_name: String,
    /// Reject a pending `sign_in` with a `timeout` error if the SDK has not called back within
    /// this many milliseconds. `None` waits indefinitely.
    pub login_timeout_ms: Option<u64>,
    /// Value returned by `getPlatformVersion`, e.g. `Android 14`. Falls back to the name of the
    /// operating system the plugin was compiled for.
    pub platform_version: Option<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.into(),
            login_timeout_ms: None,
            platform_version: None,
        }
    }
}

impl PluginSettings {
    #[allow(missing_docs)]
    pub fn login_timeout(&self) -> Option<Duration> {
        self.login_timeout_ms.map(Duration::from_millis)
    }

    #[allow(missing_docs)]
    pub fn platform_version(&self) -> String {
        match &self.platform_version {
            Some(version) => version.clone(),
            None => os_name().to_string(),
        }
    }
}

fn os_name() -> &'static str {
    match std::env::consts::OS {
        "android" => "Android",
        "ios" => "iOS",
        "macos" => "macOS",
        "linux" => "Linux",
        "windows" => "Windows",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: PluginSettings =
            serde_json::from_str(r#"{ "loginTimeoutMs": 30000 }"#).expect("Valid settings");

        assert_eq!(settings.channel_name, DEFAULT_CHANNEL_NAME);
        assert_eq!(settings.login_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.platform_version, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<PluginSettings>(r#"{ "timeout": 1 }"#);

        assert!(result.is_err());
    }

    #[test]
    fn platform_version_prefers_the_configured_value() {
        let settings = PluginSettings {
            platform_version: Some("Android 14".into()),
            ..Default::default()
        };

        assert_eq!(settings.platform_version(), "Android 14");
        assert!(!PluginSettings::default().platform_version().is_empty());
    }
}
