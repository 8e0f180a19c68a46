use tauri::{command, AppHandle, Runtime, Window};

use crate::{models::*, NativeShareExt, Result};

#[command]
pub(crate) async fn share<R: Runtime>(
    app: AppHandle<R>,
    window: Window<R>,
    options: ShareRequest,
) -> Result<ShareOutcome> {
    app.native_share().share(window, options).await
}

#[command]
pub(crate) async fn share_files<R: Runtime>(
    app: AppHandle<R>,
    window: Window<R>,
    file_paths: Option<Vec<String>>,
    text: Option<String>,
    subject: Option<String>,
) -> Result<ShareOutcome> {
    app.native_share()
        .share_files(window, file_paths, text, subject)
        .await
}

#[command]
pub(crate) async fn share_text<R: Runtime>(
    app: AppHandle<R>,
    window: Window<R>,
    text: Option<String>,
    subject: Option<String>,
) -> Result<ShareOutcome> {
    app.native_share().share_text(window, text, subject).await
}

#[command]
pub(crate) async fn can_share_to<R: Runtime>(
    app: AppHandle<R>,
    window: Window<R>,
    platform: Option<String>,
) -> Result<bool> {
    Ok(app.native_share().can_share_to(window, platform.as_deref()))
}
