//! Routing of share requests to channels, and the per-channel recipes.
//!
//! Input-validation problems on the system channel and the legacy entry
//! points are returned as [`Error::InvalidArgs`]. Every other failure becomes
//! a `ShareOutcome` with `success == false`.

use std::convert::identity;
use std::path::Path;
use std::sync::Arc;

use crate::backend::{ComposerKind, ShareBackend};
use crate::channel::{AppTarget, Channel, Recipe};
use crate::links;
use crate::mime::{mime_type_for_path, resolve_mime_type};
use crate::models::{
    Composer, EmailDraft, ShareOutcome, ShareRequest, ShareSheet, SharedFile, SmsDraft,
    StoryAsset, TargetApp,
};
use crate::pending::PendingCompletions;
use crate::{Error, Result};

const TEXT_MIME_TYPE: &str = "text/plain";
const NO_CONTENT: &str = "No content to share";

/// A recipe either produces an outcome or bails out early with a failed one.
type Step<T> = std::result::Result<T, ShareOutcome>;

pub struct Dispatcher<B> {
    backend: B,
    pending: Arc<PendingCompletions>,
    story_asset_ttl_secs: u64,
}

impl<B: ShareBackend> Dispatcher<B> {
    pub fn new(backend: B, pending: Arc<PendingCompletions>, story_asset_ttl_secs: u64) -> Self {
        Self {
            backend,
            pending,
            story_asset_ttl_secs,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shares `request` through the channel named by its `platform`.
    pub async fn dispatch(&self, request: ShareRequest) -> Result<ShareOutcome> {
        let channel = Channel::resolve(request.platform.as_deref());
        log::debug!(
            "share to {channel}: {} file(s), text: {}",
            request.file_paths.len(),
            request.text().is_some()
        );

        let step = match channel.recipe() {
            Recipe::DeepLinkMessenger => self.share_to_messenger(channel, &request).await,
            Recipe::VisualMedia { stories } => {
                self.share_to_visual(channel, stories, &request).await
            }
            Recipe::TextFirst => self.share_to_text_first(channel, &request),
            Recipe::ScopedShare => self.share_to_app(channel, &request).await,
            Recipe::Email => self.share_via_email(&request).await,
            Recipe::Sms => self.share_via_sms(&request).await,
            Recipe::System => {
                if request.file_paths.is_empty() && request.text().is_none() {
                    return Err(Error::InvalidArgs(
                        "Either filePaths or text must be provided".to_string(),
                    ));
                }
                self.share_to_system(&request).await
            }
        };

        let outcome = step.unwrap_or_else(identity);
        if !outcome.success {
            log::warn!(
                "share to {channel} failed: {}",
                outcome.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(outcome)
    }

    /// Legacy entry: share files through the system sheet.
    pub async fn share_files(
        &self,
        file_paths: Option<Vec<String>>,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        let file_paths = match file_paths {
            Some(paths) if !paths.is_empty() => paths,
            _ => {
                return Err(Error::InvalidArgs(
                    "filePaths cannot be null or empty".to_string(),
                ))
            }
        };
        self.dispatch(ShareRequest {
            file_paths,
            text,
            subject,
            platform: Some(Channel::System.id().to_string()),
            ..Default::default()
        })
        .await
    }

    /// Legacy entry: share text through the system sheet.
    pub async fn share_text(
        &self,
        text: Option<String>,
        subject: Option<String>,
    ) -> Result<ShareOutcome> {
        let Some(text) = text else {
            return Err(Error::InvalidArgs("text cannot be null".to_string()));
        };
        self.dispatch(ShareRequest {
            text: Some(text),
            subject,
            platform: Some(Channel::System.id().to_string()),
            ..Default::default()
        })
        .await
    }

    /// Point-in-time availability of a channel. Unknown identifiers and the
    /// system channel are always reported as available.
    pub fn can_share_to(&self, platform: Option<&str>) -> bool {
        let Some(channel) = platform.and_then(Channel::parse) else {
            return true;
        };
        match channel.recipe() {
            Recipe::Email => self.backend.can_compose(ComposerKind::Email),
            Recipe::Sms => self.backend.can_compose(ComposerKind::Sms),
            Recipe::System => true,
            _ => channel
                .app()
                .map_or(true, |app| self.backend.is_app_installed(&app)),
        }
    }

    async fn share_to_messenger(
        &self,
        channel: Channel,
        request: &ShareRequest,
    ) -> Step<ShareOutcome> {
        let app = self.ensure_installed(channel)?;

        if let (Some(phone_number), None) = (request.phone_number(), request.first_file()) {
            let url = links::whatsapp_chat_url(phone_number, request.text());
            let accepted = self.open(channel.id(), &url)?;
            return Ok(ShareOutcome::opened(channel.id(), accepted));
        }

        let files = self.first_file_only(channel, request)?;
        if files.is_empty() && request.text().is_none() {
            return Err(ShareOutcome::failure(channel.id(), NO_CONTENT));
        }
        let sheet = ShareSheet {
            mime_type: sheet_mime_type(request, &files),
            files,
            text: request.text().map(str::to_string),
            subject: None,
            target: Some(target_app(channel, app)),
            position: request.position.clone(),
        };
        self.present_sheet(channel, sheet).await
    }

    async fn share_to_visual(
        &self,
        channel: Channel,
        stories: bool,
        request: &ShareRequest,
    ) -> Step<ShareOutcome> {
        let app = self.ensure_installed(channel)?;
        let Some(path) = request.first_file() else {
            return Err(ShareOutcome::failure(
                channel.id(),
                format!("File path required for {}", channel.display_name()),
            ));
        };
        let file = self.shared_file(channel, path)?;

        if stories {
            let asset = StoryAsset {
                path: file.path,
                mime_type: file.mime_type,
                target: target_app(channel, app),
                expires_in_secs: self.story_asset_ttl_secs,
            };
            self.backend
                .stage_story_asset(asset)
                .map_err(|e| native_failure("instagram_stories", e))?;
            let accepted = self.open("instagram_stories", links::INSTAGRAM_STORIES_URL)?;
            return Ok(ShareOutcome::opened("instagram_stories", accepted));
        }

        let sheet = ShareSheet {
            mime_type: resolve_mime_type(request.mime_type.as_deref(), &file.path),
            files: vec![file],
            text: None,
            subject: None,
            target: Some(target_app(channel, app)),
            position: request.position.clone(),
        };
        self.present_sheet(channel, sheet).await
    }

    /// The app deep link is tried first and the web intent is the fallback.
    fn share_to_text_first(&self, channel: Channel, request: &ShareRequest) -> Step<ShareOutcome> {
        let Some(text) = request.text() else {
            return Err(ShareOutcome::failure(
                channel.id(),
                format!("Text required for {}", channel.display_name()),
            ));
        };

        let app_url = links::twitter_app_url(text);
        if self.backend.can_open_url(&app_url) {
            match self.backend.open_url(&app_url) {
                Ok(true) => return Ok(ShareOutcome::success(channel.id())),
                Ok(false) => log::warn!("{channel} app refused the deep link, using the web"),
                Err(e) => log::warn!("{channel} deep link failed: {e}, using the web"),
            }
        }

        let web_platform = format!("{}_web", channel.id());
        let accepted = self.open(&web_platform, &links::twitter_web_url(text))?;
        Ok(ShareOutcome::opened(web_platform, accepted))
    }

    async fn share_to_app(&self, channel: Channel, request: &ShareRequest) -> Step<ShareOutcome> {
        let app = self.ensure_installed(channel)?;
        let files = self.first_file_only(channel, request)?;
        if files.is_empty() && request.text().is_none() {
            return Err(ShareOutcome::failure(channel.id(), NO_CONTENT));
        }
        let sheet = ShareSheet {
            mime_type: sheet_mime_type(request, &files),
            files,
            text: request.text().map(str::to_string),
            subject: None,
            target: Some(target_app(channel, app)),
            position: request.position.clone(),
        };
        self.present_sheet(channel, sheet).await
    }

    async fn share_via_email(&self, request: &ShareRequest) -> Step<ShareOutcome> {
        let channel = Channel::Email;
        if !self.backend.can_compose(ComposerKind::Email) {
            return Err(ShareOutcome::failure(
                channel.id(),
                "Email is not configured on this device",
            ));
        }
        let draft = EmailDraft {
            recipients: request.email_addresses.clone(),
            subject: request.subject().map(str::to_string),
            body: request.text().map(str::to_string),
            attachments: self.shared_files(channel, &request.file_paths)?,
        };
        self.present_composer(Composer::Email(draft)).await
    }

    async fn share_via_sms(&self, request: &ShareRequest) -> Step<ShareOutcome> {
        let channel = Channel::Sms;
        if !self.backend.can_compose(ComposerKind::Sms) {
            return Err(ShareOutcome::failure(
                channel.id(),
                "SMS is not available on this device",
            ));
        }
        let draft = SmsDraft {
            recipient: request.phone_number().map(str::to_string),
            body: request.text().map(str::to_string),
        };
        self.present_composer(Composer::Sms(draft)).await
    }

    async fn share_to_system(&self, request: &ShareRequest) -> Step<ShareOutcome> {
        let channel = Channel::System;
        let files = self.shared_files(channel, &request.file_paths)?;
        let sheet = ShareSheet {
            mime_type: sheet_mime_type(request, &files),
            files,
            text: request.text().map(str::to_string),
            subject: request.subject().map(str::to_string),
            target: None,
            position: request.position.clone(),
        };
        self.present_sheet(channel, sheet).await
    }

    fn ensure_installed(&self, channel: Channel) -> Step<AppTarget> {
        match channel.app() {
            Some(app) if self.backend.is_app_installed(&app) => Ok(app),
            _ => Err(ShareOutcome::failure(
                channel.id(),
                format!("{} is not installed", channel.display_name()),
            )),
        }
    }

    fn open(&self, platform: &str, url: &str) -> Step<bool> {
        self.backend
            .open_url(url)
            .map_err(|e| native_failure(platform, e))
    }

    async fn present_sheet(&self, channel: Channel, sheet: ShareSheet) -> Step<ShareOutcome> {
        let (completion, pending) = self.pending.register(channel);
        self.backend
            .present_share_sheet(sheet, completion)
            .map_err(|e| native_failure(channel.id(), e))?;
        Ok(pending.wait().await)
    }

    async fn present_composer(&self, composer: Composer) -> Step<ShareOutcome> {
        let channel = composer.channel();
        let (completion, pending) = self.pending.register(channel);
        self.backend
            .present_composer(composer, completion)
            .map_err(|e| native_failure(channel.id(), e))?;
        Ok(pending.wait().await)
    }

    /// App-scoped shares attach at most the first file.
    fn first_file_only(&self, channel: Channel, request: &ShareRequest) -> Step<Vec<SharedFile>> {
        match request.first_file() {
            Some(path) => Ok(vec![self.shared_file(channel, path)?]),
            None => Ok(Vec::new()),
        }
    }

    fn shared_files(&self, channel: Channel, paths: &[String]) -> Step<Vec<SharedFile>> {
        paths
            .iter()
            .map(|path| self.shared_file(channel, path))
            .collect()
    }

    fn shared_file(&self, channel: Channel, path: &str) -> Step<SharedFile> {
        let file = Path::new(path);
        if !file.is_file() {
            return Err(ShareOutcome::failure(
                channel.id(),
                format!("File not found: {path}"),
            ));
        }
        Ok(SharedFile {
            path: path.to_string(),
            name: file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string()),
            mime_type: mime_type_for_path(path).to_string(),
        })
    }
}

fn target_app(channel: Channel, app: AppTarget) -> TargetApp {
    TargetApp {
        channel: channel.id().to_string(),
        package_name: app.package_name.to_string(),
        url_scheme: app.url_scheme.to_string(),
    }
}

/// The override wins, then the first file's type, then plain text.
fn sheet_mime_type(request: &ShareRequest, files: &[SharedFile]) -> String {
    match files.first() {
        Some(first) => resolve_mime_type(request.mime_type.as_deref(), &first.path),
        None => TEXT_MIME_TYPE.to_string(),
    }
}

fn native_failure(platform: &str, error: Error) -> ShareOutcome {
    log::error!("native share call failed for {platform}: {error}");
    let message = match error {
        Error::NativeApi(message) => message,
        other => other.to_string(),
    };
    ShareOutcome::failure(platform, message)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::models::NativeCompletion;
    use crate::pending::Completion;

    #[derive(Debug)]
    enum Call {
        Opened(String),
        Sheet(ShareSheet),
        Composer(Composer),
        Staged(StoryAsset),
    }

    /// Records every native call. Presentations finish immediately with
    /// `reply`, unless `hold` is set, in which case completions are parked.
    /// With `fail` set, every native call errors with that message.
    struct FakeBackend {
        installed: HashSet<&'static str>,
        email: bool,
        sms: bool,
        openable: Vec<&'static str>,
        accept_opens: bool,
        hold: bool,
        fail: Option<&'static str>,
        reply: NativeCompletion,
        calls: Mutex<Vec<Call>>,
        held: Mutex<Vec<(Option<String>, Completion)>>,
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self {
                installed: HashSet::new(),
                email: false,
                sms: false,
                openable: Vec::new(),
                accept_opens: true,
                hold: false,
                fail: None,
                reply: NativeCompletion {
                    success: true,
                    activity: None,
                    message: None,
                },
                calls: Mutex::new(Vec::new()),
                held: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeBackend {
        fn with_apps(apps: &[Channel]) -> Self {
            Self {
                installed: apps
                    .iter()
                    .filter_map(|c| c.app())
                    .map(|app| app.package_name)
                    .collect(),
                ..Default::default()
            }
        }

        fn failing(apps: &[Channel], message: &'static str) -> Self {
            Self {
                email: true,
                sms: true,
                fail: Some(message),
                ..Self::with_apps(apps)
            }
        }

        fn check(&self) -> Result<()> {
            match self.fail {
                Some(message) => Err(Error::NativeApi(message.to_string())),
                None => Ok(()),
            }
        }

        fn calls(&self) -> std::sync::MutexGuard<'_, Vec<Call>> {
            self.calls.lock().unwrap()
        }

        /// `label` identifies the presentation when completions are held.
        fn settle(&self, label: Option<String>, completion: Completion) {
            if self.hold {
                self.held.lock().unwrap().push((label, completion));
            } else {
                let channel = completion.channel();
                completion.finish(self.reply.clone().into_outcome(channel));
            }
        }
    }

    impl ShareBackend for FakeBackend {
        fn is_app_installed(&self, app: &AppTarget) -> bool {
            self.installed.contains(app.package_name)
        }

        fn can_compose(&self, kind: ComposerKind) -> bool {
            match kind {
                ComposerKind::Email => self.email,
                ComposerKind::Sms => self.sms,
            }
        }

        fn can_open_url(&self, url: &str) -> bool {
            self.openable.iter().any(|prefix| url.starts_with(prefix))
        }

        fn open_url(&self, url: &str) -> Result<bool> {
            self.calls().push(Call::Opened(url.to_string()));
            self.check()?;
            Ok(self.accept_opens)
        }

        fn present_share_sheet(&self, sheet: ShareSheet, completion: Completion) -> Result<()> {
            let label = sheet.text.clone();
            self.calls().push(Call::Sheet(sheet));
            self.check()?;
            self.settle(label, completion);
            Ok(())
        }

        fn present_composer(&self, composer: Composer, completion: Completion) -> Result<()> {
            let label = match &composer {
                Composer::Email(draft) => draft.subject.clone(),
                Composer::Sms(draft) => draft.body.clone(),
            };
            self.calls().push(Call::Composer(composer));
            self.check()?;
            self.settle(label, completion);
            Ok(())
        }

        fn stage_story_asset(&self, asset: StoryAsset) -> Result<()> {
            self.calls().push(Call::Staged(asset));
            self.check()
        }
    }

    fn dispatcher(backend: FakeBackend) -> Dispatcher<FakeBackend> {
        Dispatcher::new(backend, Arc::new(PendingCompletions::new()), 300)
    }

    fn temp_file(suffix: &str) -> NamedTempFile {
        tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
    }

    fn path_of(file: &NamedTempFile) -> String {
        file.path().to_string_lossy().into_owned()
    }

    fn request(platform: &str) -> ShareRequest {
        ShareRequest {
            platform: Some(platform.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_system_request_is_a_validation_error() {
        let share = dispatcher(FakeBackend::default());
        for platform in [None, Some("system"), Some("not-a-platform")] {
            let request = ShareRequest {
                platform: platform.map(str::to_string),
                text: Some(String::new()),
                ..Default::default()
            };
            let result = share.dispatch(request).await;
            assert!(matches!(result, Err(Error::InvalidArgs(_))), "{platform:?}");
        }
        assert!(share.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn uninstalled_apps_fail_without_presenting() {
        let share = dispatcher(FakeBackend::default());
        let image = temp_file(".png");
        for channel in [
            Channel::WhatsApp,
            Channel::WhatsAppBusiness,
            Channel::Instagram,
            Channel::InstagramStories,
            Channel::Facebook,
            Channel::Telegram,
            Channel::LinkedIn,
        ] {
            let request = ShareRequest {
                file_paths: vec![path_of(&image)],
                text: Some("hello".into()),
                ..request(channel.id())
            };
            let outcome = share.dispatch(request).await.unwrap();
            assert!(!outcome.success);
            let message = outcome.message.unwrap();
            assert!(message.contains(channel.display_name()), "{message}");
            assert!(message.contains("not installed"), "{message}");
        }
        assert!(share.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn instagram_requires_a_file_even_with_text() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::Instagram]));
        for platform in ["instagram", "instagramStories"] {
            let request = ShareRequest {
                text: Some("caption".into()),
                ..request(platform)
            };
            let outcome = share.dispatch(request).await.unwrap();
            assert!(!outcome.success);
            assert_eq!(
                outcome.message.as_deref(),
                Some("File path required for Instagram")
            );
        }
        assert!(share.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn instagram_feed_uses_a_scoped_sheet() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::Instagram]));
        let video = temp_file(".MP4");
        let request = ShareRequest {
            file_paths: vec![path_of(&video)],
            text: Some("ignored".into()),
            ..request("instagram")
        };
        let outcome = share.dispatch(request).await.unwrap();
        assert!(outcome.success);

        let calls = share.backend().calls();
        let Call::Sheet(sheet) = &calls[0] else {
            panic!("expected a share sheet, got {calls:?}");
        };
        assert_eq!(sheet.mime_type, "video/mp4");
        assert_eq!(sheet.files.len(), 1);
        assert!(sheet.text.is_none());
        assert_eq!(
            sheet.target.as_ref().map(|t| t.package_name.as_str()),
            Some("com.instagram.android")
        );
    }

    #[tokio::test]
    async fn instagram_stories_stage_then_open() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::InstagramStories]));
        let image = temp_file(".jpg");
        let request = ShareRequest {
            file_paths: vec![path_of(&image)],
            ..request("instagramStories")
        };
        let outcome = share.dispatch(request).await.unwrap();
        assert_eq!(outcome, ShareOutcome::success("instagram_stories"));

        let calls = share.backend().calls();
        assert_eq!(calls.len(), 2);
        let Call::Staged(asset) = &calls[0] else {
            panic!("expected a staged asset, got {calls:?}");
        };
        assert_eq!(asset.mime_type, "image/jpeg");
        assert_eq!(asset.expires_in_secs, 300);
        assert!(matches!(&calls[1], Call::Opened(url) if url == links::INSTAGRAM_STORIES_URL));
    }

    #[tokio::test]
    async fn missing_file_is_reported_in_band() {
        let share = dispatcher(FakeBackend::default());
        let request = ShareRequest {
            file_paths: vec!["/definitely/not/here.pdf".into()],
            ..request("system")
        };
        let outcome = share.dispatch(request).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("File not found: /definitely/not/here.pdf")
        );
        assert!(share.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn twitter_requires_text() {
        let share = dispatcher(FakeBackend::default());
        let image = temp_file(".png");
        let request = ShareRequest {
            file_paths: vec![path_of(&image)],
            ..request("twitter")
        };
        let outcome = share.dispatch(request).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Text required for Twitter"));
    }

    #[tokio::test]
    async fn twitter_falls_back_to_the_web_with_the_same_text() {
        let text = "launch day! 50% off & more: https://example.com/?a=b";
        let share = dispatcher(FakeBackend::default());
        let outcome = share
            .dispatch(ShareRequest {
                text: Some(text.into()),
                ..request("twitter")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::success("twitter_web"));

        let calls = share.backend().calls();
        let Call::Opened(url) = &calls[0] else {
            panic!("expected an open, got {calls:?}");
        };
        let encoded = url
            .strip_prefix("https://twitter.com/intent/tweet?text=")
            .unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), text);
    }

    #[tokio::test]
    async fn twitter_refused_deep_link_still_tries_the_web() {
        let share = dispatcher(FakeBackend {
            openable: vec!["twitter://"],
            accept_opens: false,
            ..Default::default()
        });
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hi".into()),
                ..request("twitter")
            })
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.platform.as_deref(), Some("twitter_web"));

        let calls = share.backend().calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Opened(url) if url.starts_with("twitter://post")));
        assert!(matches!(&calls[1], Call::Opened(url) if url.starts_with("https://twitter.com/")));
    }

    #[tokio::test]
    async fn twitter_app_deep_link_wins_when_openable() {
        let share = dispatcher(FakeBackend {
            openable: vec!["twitter://"],
            ..Default::default()
        });
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hi".into()),
                ..request("twitter")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::success("twitter"));
        assert_eq!(share.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn system_text_only_presents_a_text_sheet() {
        let share = dispatcher(FakeBackend::default());
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hello".into()),
                ..request("system")
            })
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.platform.as_deref(), Some("system"));

        let calls = share.backend().calls();
        let Call::Sheet(sheet) = &calls[0] else {
            panic!("expected a share sheet, got {calls:?}");
        };
        assert!(sheet.files.is_empty());
        assert_eq!(sheet.text.as_deref(), Some("hello"));
        assert_eq!(sheet.mime_type, "text/plain");
        assert!(sheet.target.is_none());
    }

    #[tokio::test]
    async fn system_files_use_the_first_files_mime_type() {
        let share = dispatcher(FakeBackend::default());
        let (a, b) = (temp_file(".png"), temp_file(".pdf"));
        let outcome = share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&a), path_of(&b)],
                subject: Some("Pictures".into()),
                ..request("system")
            })
            .await
            .unwrap();
        assert!(outcome.success);

        let calls = share.backend().calls();
        let Call::Sheet(sheet) = &calls[0] else {
            panic!("expected a share sheet, got {calls:?}");
        };
        assert_eq!(sheet.files.len(), 2);
        assert_eq!(sheet.mime_type, "image/png");
        assert_eq!(sheet.files[1].mime_type, "application/pdf");
        assert_eq!(sheet.subject.as_deref(), Some("Pictures"));
    }

    #[tokio::test]
    async fn explicit_mime_type_overrides_inference() {
        let share = dispatcher(FakeBackend::default());
        let file = temp_file(".bin");
        share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&file)],
                mime_type: Some("application/x-custom".into()),
                ..request("system")
            })
            .await
            .unwrap();
        let calls = share.backend().calls();
        assert!(matches!(&calls[0], Call::Sheet(sheet) if sheet.mime_type == "application/x-custom"));
    }

    #[tokio::test]
    async fn system_sheet_failure_is_reported_from_the_completion() {
        let share = dispatcher(FakeBackend {
            reply: NativeCompletion {
                success: false,
                activity: None,
                message: Some("Presentation failed".into()),
            },
            ..Default::default()
        });
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hello".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Presentation failed"));
    }

    #[tokio::test]
    async fn whatsapp_with_phone_opens_a_direct_chat() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::WhatsApp]));
        let outcome = share
            .dispatch(ShareRequest {
                phone_number: Some("+1 (555) 123-4567".into()),
                text: Some("hi".into()),
                ..request("whatsapp")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::success("whatsapp"));

        let calls = share.backend().calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            Call::Opened(url) if url == "https://api.whatsapp.com/send?phone=15551234567&text=hi"
        ));
    }

    #[tokio::test]
    async fn whatsapp_refused_chat_link_is_a_failure() {
        let share = dispatcher(FakeBackend {
            accept_opens: false,
            ..FakeBackend::with_apps(&[Channel::WhatsApp])
        });
        let outcome = share
            .dispatch(ShareRequest {
                phone_number: Some("15551234567".into()),
                ..request("whatsapp")
            })
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.platform.as_deref(), Some("whatsapp"));
        assert_eq!(share.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn whatsapp_chat_link_error_is_reported_in_band() {
        let share = dispatcher(FakeBackend::failing(&[Channel::WhatsApp], "os refused"));
        let outcome = share
            .dispatch(ShareRequest {
                phone_number: Some("15551234567".into()),
                ..request("whatsapp")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("whatsapp", "os refused"));
        assert!(share.pending.is_empty());
    }

    #[tokio::test]
    async fn whatsapp_with_files_ignores_the_phone_and_scopes_the_sheet() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::WhatsAppBusiness]));
        let (a, b) = (temp_file(".jpg"), temp_file(".jpg"));
        let outcome = share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&a), path_of(&b)],
                phone_number: Some("15551234567".into()),
                text: Some("look".into()),
                ..request("whatsapp-business")
            })
            .await
            .unwrap();
        assert!(outcome.success);

        let calls = share.backend().calls();
        let Call::Sheet(sheet) = &calls[0] else {
            panic!("expected a share sheet, got {calls:?}");
        };
        assert_eq!(sheet.files.len(), 1);
        assert_eq!(sheet.text.as_deref(), Some("look"));
        assert_eq!(
            sheet.target.as_ref().map(|t| t.package_name.as_str()),
            Some("com.whatsapp.w4b")
        );
    }

    #[tokio::test]
    async fn scoped_share_without_content_fails() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::Telegram]));
        let outcome = share.dispatch(request("telegram")).await.unwrap();
        assert_eq!(outcome, ShareOutcome::failure("telegram", NO_CONTENT));
    }

    #[tokio::test]
    async fn scoped_share_attaches_only_the_first_file() {
        let share = dispatcher(FakeBackend::with_apps(&[Channel::LinkedIn]));
        let (a, b) = (temp_file(".docx"), temp_file(".png"));
        let outcome = share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&a), path_of(&b)],
                ..request("linkedin")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::success("linkedin"));

        let calls = share.backend().calls();
        let Call::Sheet(sheet) = &calls[0] else {
            panic!("expected a share sheet, got {calls:?}");
        };
        assert_eq!(sheet.files.len(), 1);
        assert_eq!(
            sheet.mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[tokio::test]
    async fn email_requires_a_configured_composer() {
        let share = dispatcher(FakeBackend::default());
        let outcome = share.dispatch(request("email")).await.unwrap();
        assert_eq!(
            outcome,
            ShareOutcome::failure("email", "Email is not configured on this device")
        );
    }

    #[tokio::test]
    async fn email_prefills_the_composer() {
        let share = dispatcher(FakeBackend {
            email: true,
            ..Default::default()
        });
        let attachment = temp_file(".pdf");
        let outcome = share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&attachment)],
                text: Some("See attached".into()),
                subject: Some("Invoice".into()),
                email_addresses: vec!["billing@example.com".into()],
                ..request("email")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::success("email"));

        let calls = share.backend().calls();
        let Call::Composer(Composer::Email(draft)) = &calls[0] else {
            panic!("expected an email composer, got {calls:?}");
        };
        assert_eq!(draft.recipients, vec!["billing@example.com".to_string()]);
        assert_eq!(draft.subject.as_deref(), Some("Invoice"));
        assert_eq!(draft.body.as_deref(), Some("See attached"));
        assert_eq!(draft.attachments[0].mime_type, "application/pdf");
        assert!(draft.attachments[0].name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn sms_prefills_recipient_and_body() {
        let share = dispatcher(FakeBackend {
            sms: true,
            ..Default::default()
        });
        let outcome = share
            .dispatch(ShareRequest {
                phone_number: Some("+15551234567".into()),
                text: Some("on my way".into()),
                ..request("sms")
            })
            .await
            .unwrap();
        assert!(outcome.success);

        let calls = share.backend().calls();
        let Call::Composer(Composer::Sms(draft)) = &calls[0] else {
            panic!("expected an sms composer, got {calls:?}");
        };
        assert_eq!(draft.recipient.as_deref(), Some("+15551234567"));
        assert_eq!(draft.body.as_deref(), Some("on my way"));
    }

    #[tokio::test]
    async fn sms_unavailable_is_reported_in_band() {
        let share = dispatcher(FakeBackend::default());
        let outcome = share.dispatch(request("sms")).await.unwrap();
        assert_eq!(
            outcome,
            ShareOutcome::failure("sms", "SMS is not available on this device")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn outstanding_composers_each_get_their_own_result() {
        let share = Arc::new(dispatcher(FakeBackend {
            email: true,
            hold: true,
            ..Default::default()
        }));

        let first = tokio::spawn({
            let share = Arc::clone(&share);
            async move {
                share
                    .dispatch(ShareRequest {
                        subject: Some("first".into()),
                        ..request("email")
                    })
                    .await
            }
        });
        let second = tokio::spawn({
            let share = Arc::clone(&share);
            async move {
                share
                    .dispatch(ShareRequest {
                        subject: Some("second".into()),
                        ..request("email")
                    })
                    .await
            }
        });

        while share.backend().held.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(share.pending.len(), 2);

        // Finish in reverse order, echoing each composer's subject back.
        let held: Vec<_> = share.backend().held.lock().unwrap().drain(..).collect();
        for (subject, completion) in held.into_iter().rev() {
            let subject = subject.unwrap_or_default();
            completion.finish(ShareOutcome::success("email").with_message(subject));
        }

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.message.as_deref(), Some("first"));
        assert_eq!(second.message.as_deref(), Some("second"));
        assert!(share.pending.is_empty());
    }

    #[tokio::test]
    async fn legacy_entry_points_validate_their_arguments() {
        let share = dispatcher(FakeBackend::default());
        assert!(matches!(
            share.share_files(None, None, None).await,
            Err(Error::InvalidArgs(_))
        ));
        assert!(matches!(
            share.share_files(Some(Vec::new()), Some("t".into()), None).await,
            Err(Error::InvalidArgs(_))
        ));
        assert!(matches!(
            share.share_text(None, None).await,
            Err(Error::InvalidArgs(_))
        ));

        let outcome = share.share_text(Some("hi".into()), None).await.unwrap();
        assert!(outcome.success);
        let file = temp_file(".txt");
        let outcome = share
            .share_files(Some(vec![path_of(&file)]), None, None)
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn can_share_to_is_optimistic_for_system_and_unknown() {
        let share = dispatcher(FakeBackend::default());
        assert!(share.can_share_to(Some("system")));
        assert!(share.can_share_to(Some("friendster")));
        assert!(share.can_share_to(None));
        assert!(!share.can_share_to(Some("whatsapp")));
        assert!(!share.can_share_to(Some("twitter")));
        assert!(!share.can_share_to(Some("email")));
        assert!(!share.can_share_to(Some("sms")));
    }

    #[test]
    fn can_share_to_reflects_installed_apps_and_composers() {
        let share = dispatcher(FakeBackend {
            email: true,
            ..FakeBackend::with_apps(&[Channel::Instagram])
        });
        assert!(share.can_share_to(Some("instagram")));
        assert!(share.can_share_to(Some("instagramStories")));
        assert!(share.can_share_to(Some("email")));
        assert!(!share.can_share_to(Some("sms")));
        assert!(!share.can_share_to(Some("telegram")));
    }

    #[tokio::test]
    async fn system_sheet_error_is_reported_in_band() {
        let share = dispatcher(FakeBackend::failing(&[], "no sheet"));
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hello".into()),
                ..request("system")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("system", "no sheet"));
        assert!(share.pending.is_empty());
    }

    #[tokio::test]
    async fn scoped_sheet_error_is_reported_in_band() {
        let share = dispatcher(FakeBackend::failing(&[Channel::Telegram], "no sheet"));
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hello".into()),
                ..request("telegram")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("telegram", "no sheet"));
        assert!(share.pending.is_empty());
    }

    #[tokio::test]
    async fn composer_errors_are_reported_in_band() {
        let share = dispatcher(FakeBackend::failing(&[], "no composer"));
        let outcome = share
            .dispatch(ShareRequest {
                subject: Some("hi".into()),
                ..request("email")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("email", "no composer"));

        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hi".into()),
                ..request("sms")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("sms", "no composer"));
        assert!(share.pending.is_empty());
    }

    #[tokio::test]
    async fn story_staging_error_skips_the_open() {
        let share = dispatcher(FakeBackend::failing(
            &[Channel::InstagramStories],
            "no pasteboard",
        ));
        let image = temp_file(".png");
        let outcome = share
            .dispatch(ShareRequest {
                file_paths: vec![path_of(&image)],
                ..request("instagramStories")
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ShareOutcome::failure("instagram_stories", "no pasteboard")
        );
        let calls = share.backend().calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Staged(_)));
    }

    #[tokio::test]
    async fn twitter_web_open_error_is_reported_in_band() {
        let share = dispatcher(FakeBackend::failing(&[], "os refused"));
        let outcome = share
            .dispatch(ShareRequest {
                text: Some("hello".into()),
                ..request("twitter")
            })
            .await
            .unwrap();
        assert_eq!(outcome, ShareOutcome::failure("twitter_web", "os refused"));
    }
}
