//! # tauri-plugin-native-share
//!
//! A Tauri plugin that shares files and text through the channel the caller
//! asks for: a specific social or messaging app, the email or SMS composer, or
//! the generic system share sheet.
//!
//! Routing, validation, deep-link construction and MIME inference all happen
//! in Rust. The platform only supplies a handful of primitives (probe an app,
//! open a URL, present a sheet or composer), implemented by the Kotlin/Swift
//! plugin on mobile and by the native desktop share pickers on desktop.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(tauri_plugin_native_share::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! From the frontend:
//!
//! ```js
//! import { invoke } from '@tauri-apps/api/core';
//!
//! const outcome = await invoke('plugin:native-share|share', {
//!   options: { platform: 'whatsapp', phoneNumber: '+1 555 123 4567', text: 'hi' },
//! });
//! if (!outcome.success) console.warn(outcome.message);
//!
//! const ready = await invoke('plugin:native-share|can_share_to', { platform: 'instagram' });
//! ```
//!
//! Only a request with nothing to share is rejected as an error. Every other
//! failure (app missing, file missing, user cancelled) resolves with
//! `{ success: false, message }`.

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

pub use models::*;

#[cfg(desktop)]
mod desktop;
#[cfg(mobile)]
mod mobile;

mod backend;
mod channel;
mod commands;
mod config;
mod dispatch;
mod error;
mod links;
mod mime;
mod models;
mod pending;
#[cfg(desktop)]
mod platform;
#[cfg(any(target_os = "macos", target_os = "windows"))]
mod ui;

pub use backend::{ComposerKind, ShareBackend};
pub use channel::{AppTarget, Channel, Recipe};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use mime::{mime_type_for_path, resolve_mime_type, FALLBACK_MIME_TYPE};
pub use pending::{Completion, PendingCompletions, PendingOutcome, RequestId};

#[cfg(desktop)]
use desktop::NativeShare;
#[cfg(mobile)]
use mobile::NativeShare;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the share APIs.
pub trait NativeShareExt<R: Runtime> {
    fn native_share(&self) -> &NativeShare<R>;
}

impl<R: Runtime, T: Manager<R>> crate::NativeShareExt<R> for T {
    fn native_share(&self) -> &NativeShare<R> {
        self.state::<NativeShare<R>>().inner()
    }
}

/// Initializes the plugin.
///
/// Reads the optional `plugins.native-share` section of `tauri.conf.json`
/// (see [`Config`]) and registers the platform backend.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("native-share")
        .invoke_handler(tauri::generate_handler![
            commands::share,
            commands::share_files,
            commands::share_text,
            commands::can_share_to,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            log::debug!("native-share config: {config:?}");
            #[cfg(mobile)]
            let share = mobile::init(app, api, config)?;
            #[cfg(desktop)]
            let share = desktop::init(app, api, config)?;
            app.manage(share);
            Ok(())
        })
        .build()
}
