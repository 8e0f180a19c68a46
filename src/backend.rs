use crate::channel::AppTarget;
use crate::models::{Composer, ShareSheet, StoryAsset};
use crate::pending::Completion;
use crate::Result;

/// Which modal composer a capability probe is about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ComposerKind {
    Email,
    Sms,
}

impl ComposerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComposerKind::Email => "email",
            ComposerKind::Sms => "sms",
        }
    }
}

/// The native primitives the dispatcher is built from.
///
/// Probes and URL opens return synchronously. Presentations hand their
/// [`Completion`] to the platform and must finish it (or drop it) once the
/// user is done. Implementations are responsible for running presentation
/// work on the UI thread.
pub trait ShareBackend: Send + Sync {
    /// Whether `app` is installed and can be addressed.
    fn is_app_installed(&self, app: &AppTarget) -> bool;

    /// Whether the device has a configured composer of this kind.
    fn can_compose(&self, kind: ComposerKind) -> bool;

    fn can_open_url(&self, url: &str) -> bool;

    /// Opens `url` fire-and-forget. `Ok(true)` means the OS accepted it.
    fn open_url(&self, url: &str) -> Result<bool>;

    fn present_share_sheet(&self, sheet: ShareSheet, completion: Completion) -> Result<()>;

    fn present_composer(&self, composer: Composer, completion: Completion) -> Result<()>;

    /// Places a stories asset on the pasteboard with an expiry.
    fn stage_story_asset(&self, asset: StoryAsset) -> Result<()>;
}
