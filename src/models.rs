use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Anchor for popover-style presentation on tablets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePosition {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// When true the popover is centred in the view and the rect is ignored.
    #[serde(default = "default_center")]
    pub center: bool,
}

fn default_center() -> bool {
    true
}

/// A share request as sent by the frontend.
///
/// At least one of `file_paths` or `text` must be non-empty for the system
/// channel; the app-specific channels each have their own requirements.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub file_paths: Vec<String>,
    pub text: Option<String>,
    pub subject: Option<String>,
    /// Channel identifier such as `whatsapp` or `email`. Defaults to `system`.
    pub platform: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<String>,
    pub mime_type: Option<String>,
    pub position: Option<SharePosition>,
}

impl ShareRequest {
    /// The text body, if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn first_file(&self) -> Option<&str> {
        self.file_paths.first().map(String::as_str)
    }
}

/// The terminal result of one share request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ShareOutcome {
    pub fn success(platform: impl Into<String>) -> Self {
        Self {
            success: true,
            platform: Some(platform.into()),
            message: None,
        }
    }

    pub fn failure(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            platform: Some(platform.into()),
            message: Some(message.into()),
        }
    }

    /// `success` mirrors whether the OS accepted a fire-and-forget open.
    pub fn opened(platform: impl Into<String>, accepted: bool) -> Self {
        Self {
            success: accepted,
            platform: Some(platform.into()),
            message: (!accepted).then(|| "The URL could not be opened".to_string()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Reply of a native boolean probe.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeProbe {
    pub value: bool,
}

/// A file attached to a native presentation, with its resolved MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    pub path: String,
    pub name: String,
    pub mime_type: String,
}

/// The app a share sheet is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetApp {
    pub channel: String,
    pub package_name: String,
    pub url_scheme: String,
}

/// Everything a native share sheet needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSheet {
    pub files: Vec<SharedFile>,
    pub text: Option<String>,
    pub subject: Option<String>,
    /// MIME type of the whole send: the override, else the first file's, else `text/plain`.
    pub mime_type: String,
    pub target: Option<TargetApp>,
    pub position: Option<SharePosition>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<SharedFile>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsDraft {
    pub recipient: Option<String>,
    pub body: Option<String>,
}

/// A modal composer the user fills in and dismisses.
#[derive(Debug, Clone)]
pub enum Composer {
    Email(EmailDraft),
    Sms(SmsDraft),
}

impl Composer {
    pub fn channel(&self) -> Channel {
        match self {
            Composer::Email(_) => Channel::Email,
            Composer::Sms(_) => Channel::Sms,
        }
    }
}

/// Media staged on the pasteboard for the stories composer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAsset {
    pub path: String,
    pub mime_type: String,
    pub target: TargetApp,
    pub expires_in_secs: u64,
}

/// Reply of a native presentation once the user is done with it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCompletion {
    pub success: bool,
    /// Identifier of the activity the user picked, when the OS reports one.
    pub activity: Option<String>,
    pub message: Option<String>,
}

impl NativeCompletion {
    pub fn into_outcome(self, channel: Channel) -> ShareOutcome {
        ShareOutcome {
            success: self.success,
            platform: Some(self.activity.unwrap_or_else(|| channel.id().to_string())),
            message: self.message,
        }
    }
}
