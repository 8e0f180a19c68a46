use std::sync::mpsc;

use tauri::{Runtime, Window};

use crate::{Error, Result};

/// Runs `task` on the window's UI thread and blocks until it returns.
///
/// Everything that touches native presentation APIs goes through here. Must
/// not be called from the UI thread itself.
pub fn run_on_ui_thread<R, T, F>(window: &Window<R>, task: F) -> Result<T>
where
    R: Runtime,
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    window.run_on_main_thread(move || {
        if tx.send(task()).is_err() {
            log::warn!("UI task finished after its caller stopped waiting");
        }
    })?;
    rx.recv()
        .map_err(|_| Error::NativeApi("UI thread dropped the task before it ran".to_string()))?
}
