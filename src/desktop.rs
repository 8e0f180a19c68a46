use std::sync::Arc;

use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Runtime, Window};

use crate::backend::{ComposerKind, ShareBackend};
use crate::channel::AppTarget;
use crate::links;
use crate::models::*;
use crate::pending::{Completion, PendingCompletions};
use crate::platform;
use crate::{Config, Dispatcher, Error, Result};

pub fn init<R: Runtime, C: DeserializeOwned>(
    app: &AppHandle<R>,
    _api: PluginApi<R, C>,
    config: Config,
) -> Result<NativeShare<R>> {
    Ok(NativeShare {
        _app: app.clone(),
        pending: Arc::new(PendingCompletions::new()),
        config,
    })
}

/// Access to the share APIs.
pub struct NativeShare<R: Runtime> {
    _app: AppHandle<R>,
    pending: Arc<PendingCompletions>,
    config: Config,
}

impl<R: Runtime> NativeShare<R> {
    fn dispatcher(&self, window: Window<R>) -> Dispatcher<DesktopBackend<R>> {
        Dispatcher::new(
            DesktopBackend { window },
            Arc::clone(&self.pending),
            self.config.story_asset_ttl_secs,
        )
    }

    pub async fn share(&self, window: Window<R>, request: ShareRequest) -> Result<ShareOutcome> {
        self.dispatcher(window).dispatch(request).await
    }

    pub async fn share_files(
        &self,
        window: Window<R>,
        file_paths: Option<Vec<String>>,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        self.dispatcher(window)
            .share_files(file_paths, text, subject)
            .await
    }

    pub async fn share_text(
        &self,
        window: Window<R>,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        self.dispatcher(window).share_text(text, subject).await
    }

    pub fn can_share_to(&self, window: Window<R>, platform: Option<&str>) -> bool {
        self.dispatcher(window).can_share_to(platform)
    }
}

/// Desktop hosts have no registry of mobile apps and no modal composers:
/// app channels report "not installed", composers become `mailto:`/`sms:`
/// opens, and only web URLs are considered openable.
pub struct DesktopBackend<R: Runtime> {
    window: Window<R>,
}

impl<R: Runtime> ShareBackend for DesktopBackend<R> {
    fn is_app_installed(&self, app: &AppTarget) -> bool {
        log::debug!("{} cannot be probed on desktop", app.package_name);
        false
    }

    fn can_compose(&self, kind: ComposerKind) -> bool {
        match kind {
            ComposerKind::Email => true,
            // Messages handles `sms:` links on macOS only.
            ComposerKind::Sms => cfg!(target_os = "macos"),
        }
    }

    fn can_open_url(&self, url: &str) -> bool {
        ["https://", "http://", "mailto:"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
    }

    fn open_url(&self, url: &str) -> Result<bool> {
        open::that_detached(url)
            .map(|()| true)
            .map_err(|e| Error::NativeApi(format!("Failed to open {url}: {e}")))
    }

    fn present_share_sheet(&self, sheet: ShareSheet, completion: Completion) -> Result<()> {
        platform::present_share_sheet(&self.window, sheet, completion)
    }

    fn present_composer(&self, composer: Composer, completion: Completion) -> Result<()> {
        let url = match composer {
            Composer::Email(draft) => {
                if !draft.attachments.is_empty() {
                    log::warn!(
                        "mailto: cannot carry attachments, dropping {}",
                        draft.attachments.len()
                    );
                }
                links::mailto_url(
                    &draft.recipients,
                    draft.subject.as_deref(),
                    draft.body.as_deref(),
                )
            }
            Composer::Sms(draft) => {
                links::sms_url(draft.recipient.as_deref(), draft.body.as_deref())
            }
        };
        let channel = completion.channel();
        let accepted = self.open_url(&url)?;
        completion.finish(ShareOutcome::opened(channel.id(), accepted));
        Ok(())
    }

    fn stage_story_asset(&self, _asset: StoryAsset) -> Result<()> {
        Err(Error::NativeApi(
            "Stories sharing is not available on desktop".to_string(),
        ))
    }
}
