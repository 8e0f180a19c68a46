use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tauri::{
    plugin::{PluginApi, PluginHandle},
    AppHandle, Runtime, Window,
};

use crate::backend::{ComposerKind, ShareBackend};
use crate::channel::AppTarget;
use crate::models::*;
use crate::pending::{Completion, PendingCompletions};
use crate::{Config, Dispatcher, Result};

#[cfg(target_os = "android")]
const PLUGIN_IDENTIFIER: &str = "app.tauri.nativeshare";

#[cfg(target_os = "ios")]
tauri::ios_plugin_binding!(init_plugin_native_share);

// initializes the Kotlin or Swift plugin classes
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    api: PluginApi<R, C>,
    config: Config,
) -> Result<NativeShare<R>> {
    #[cfg(target_os = "android")]
    let handle = api.register_android_plugin(PLUGIN_IDENTIFIER, "NativeSharePlugin")?;
    #[cfg(target_os = "ios")]
    let handle = api.register_ios_plugin(init_plugin_native_share)?;
    Ok(NativeShare {
        handle: Arc::new(handle),
        pending: Arc::new(PendingCompletions::new()),
        config,
    })
}

/// Access to the share APIs.
pub struct NativeShare<R: Runtime> {
    handle: Arc<PluginHandle<R>>,
    pending: Arc<PendingCompletions>,
    config: Config,
}

impl<R: Runtime> NativeShare<R> {
    fn dispatcher(&self) -> Dispatcher<MobileBackend<R>> {
        let backend = MobileBackend {
            handle: Arc::clone(&self.handle),
            config: self.config.clone(),
        };
        Dispatcher::new(
            backend,
            Arc::clone(&self.pending),
            self.config.story_asset_ttl_secs,
        )
    }

    pub async fn share(&self, _window: Window<R>, request: ShareRequest) -> Result<ShareOutcome> {
        self.dispatcher().dispatch(request).await
    }

    pub async fn share_files(
        &self,
        _window: Window<R>,
        file_paths: Option<Vec<String>>,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        self.dispatcher()
            .share_files(file_paths, text, subject)
            .await
    }

    pub async fn share_text(
        &self,
        _window: Window<R>,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        self.dispatcher().share_text(text, subject).await
    }

    pub fn can_share_to(&self, _window: Window<R>, platform: Option<&str>) -> bool {
        self.dispatcher().can_share_to(platform)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppProbeArgs<'a> {
    package_name: &'a str,
    url_scheme: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComposeProbeArgs {
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UrlArgs<'a> {
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetArgs {
    #[serde(flatten)]
    sheet: ShareSheet,
    file_provider_authority: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailArgs {
    #[serde(flatten)]
    draft: EmailDraft,
    chooser_title: String,
    file_provider_authority: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoryArgs {
    #[serde(flatten)]
    asset: StoryAsset,
    file_provider_authority: Option<String>,
}

/// Forwards every primitive to the native `NativeSharePlugin`.
///
/// The native side performs all presentation on its own UI thread. Probes
/// and URL opens resolve at once; presentations resolve only when the user
/// finishes, so they are run on the blocking pool and finish their
/// [`Completion`] from there.
pub struct MobileBackend<R: Runtime> {
    handle: Arc<PluginHandle<R>>,
    config: Config,
}

impl<R: Runtime> MobileBackend<R> {
    fn probe<P: Serialize>(&self, method: &str, payload: P) -> bool {
        match self.handle.run_mobile_plugin::<NativeProbe>(method, payload) {
            Ok(reply) => reply.value,
            Err(e) => {
                log::error!("{method} failed: {e}");
                false
            }
        }
    }

    fn present<P>(&self, method: &'static str, payload: P, completion: Completion)
    where
        P: Serialize + Send + 'static,
    {
        let handle = Arc::clone(&self.handle);
        tauri::async_runtime::spawn_blocking(move || {
            let channel = completion.channel();
            let outcome = match handle.run_mobile_plugin::<NativeCompletion>(method, payload) {
                Ok(reply) => reply.into_outcome(channel),
                Err(e) => {
                    log::error!("{method} for request {} failed: {e}", completion.id());
                    ShareOutcome::failure(channel.id(), e.to_string())
                }
            };
            completion.finish(outcome);
        });
    }
}

impl<R: Runtime> ShareBackend for MobileBackend<R> {
    fn is_app_installed(&self, app: &AppTarget) -> bool {
        self.probe(
            "isAppInstalled",
            AppProbeArgs {
                package_name: app.package_name,
                url_scheme: app.url_scheme,
            },
        )
    }

    fn can_compose(&self, kind: ComposerKind) -> bool {
        self.probe(
            "canCompose",
            ComposeProbeArgs {
                kind: kind.as_str(),
            },
        )
    }

    fn can_open_url(&self, url: &str) -> bool {
        self.probe("canOpenUrl", UrlArgs { url })
    }

    fn open_url(&self, url: &str) -> Result<bool> {
        let reply = self
            .handle
            .run_mobile_plugin::<NativeProbe>("openUrl", UrlArgs { url })?;
        Ok(reply.value)
    }

    fn present_share_sheet(&self, sheet: ShareSheet, completion: Completion) -> Result<()> {
        let args = SheetArgs {
            sheet,
            file_provider_authority: self.config.file_provider_authority.clone(),
        };
        self.present("presentShareSheet", args, completion);
        Ok(())
    }

    fn present_composer(&self, composer: Composer, completion: Completion) -> Result<()> {
        match composer {
            Composer::Email(draft) => {
                let args = EmailArgs {
                    draft,
                    chooser_title: self.config.email_chooser_title.clone(),
                    file_provider_authority: self.config.file_provider_authority.clone(),
                };
                self.present("presentEmailComposer", args, completion);
            }
            Composer::Sms(draft) => self.present("presentSmsComposer", draft, completion),
        }
        Ok(())
    }

    fn stage_story_asset(&self, asset: StoryAsset) -> Result<()> {
        let args = StoryArgs {
            asset,
            file_provider_authority: self.config.file_provider_authority.clone(),
        };
        self.handle
            .run_mobile_plugin::<serde_json::Value>("stageStoryAsset", args)
            .map(|_| ())
            .map_err(Into::into)
    }
}
