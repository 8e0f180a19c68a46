use serde::Deserialize;

const DEFAULT_STORY_ASSET_TTL_SECS: u64 = 5 * 60;
const DEFAULT_EMAIL_CHOOSER_TITLE: &str = "Send email via...";

/// Plugin configuration, read from `plugins.native-share` in `tauri.conf.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// How long a stories asset stays on the pasteboard.
    pub story_asset_ttl_secs: u64,
    /// Title of the Android chooser shown for email intents.
    pub email_chooser_title: String,
    /// Android `FileProvider` authority. The native side falls back to
    /// `<package>.fileprovider` when unset.
    pub file_provider_authority: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            story_asset_ttl_secs: DEFAULT_STORY_ASSET_TTL_SECS,
            email_chooser_title: DEFAULT_EMAIL_CHOOSER_TITLE.to_string(),
            file_provider_authority: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "storyAssetTtlSecs": 30 }"#).unwrap();
        assert_eq!(config.story_asset_ttl_secs, 30);
        assert_eq!(config.email_chooser_title, "Send email via...");
        assert!(config.file_provider_authority.is_none());
    }
}
