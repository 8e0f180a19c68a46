use tauri::{Runtime, Window};

use crate::models::ShareSheet;
use crate::pending::Completion;
use crate::Error;

/// There is no desktop-wide share sheet on Linux. Dropping the completion
/// resolves the request, and the error becomes an in-band failure.
pub fn present_share_sheet<R: Runtime>(
    _window: &Window<R>,
    sheet: ShareSheet,
    _completion: Completion,
) -> Result<(), Error> {
    log::debug!(
        "no system share sheet for {} file(s) on Linux",
        sheet.files.len()
    );
    Err(Error::NativeApi(
        "The system share sheet is not available on Linux".to_string(),
    ))
}
