use serde::Deserialize;

/// Channel name used by the iCloud bridge unless configured otherwise.
pub const DEFAULT_CHANNEL_NAME: &str = "com.draexl.project-manager/iCloud";

/// Settings for a [`MethodChannel`](crate::MethodChannel).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Name the shell uses to address the channel.
    pub name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl ChannelConfig {
    /// Use a different channel name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
