use std::cell::RefCell;
use std::sync::Arc;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use tauri::{Runtime, Window};
use windows::ApplicationModel::DataTransfer::{DataRequestedEventArgs, DataTransferManager};
use windows::Storage::IStorageItem;
use windows::{
    core::{Interface, HSTRING},
    Foundation::TypedEventHandler,
    Storage::StorageFile,
    Win32::{
        Foundation::HWND,
        System::WinRT::{RoInitialize, RO_INIT_SINGLETHREADED},
        UI::Shell::IDataTransferManagerInterop,
    },
};
use windows_collections::IIterable;

use super::focus;
use crate::models::ShareSheet;
use crate::pending::Completion;
use crate::ui::run_on_ui_thread;
use crate::Error;

/// Windows requires a title on every data package.
const DEFAULT_TITLE: &str = "Share";

// Keeps the manager and its handler registration alive until the share UI
// asks for data. WinRT objects here are only touched on the UI thread.
thread_local! {
    static ACTIVE_REQUEST: RefCell<Option<(DataTransferManager, i64)>> = RefCell::new(None);
}

impl From<windows::core::Error> for Error {
    fn from(err: windows::core::Error) -> Self {
        Error::NativeApi(err.message().to_string())
    }
}

/// Shows the Windows share UI for the window. The completion resolves once
/// the flyout gives focus back to the window.
pub fn present_share_sheet<R: Runtime>(
    window: &Window<R>,
    sheet: ShareSheet,
    completion: Completion,
) -> Result<(), Error> {
    let watch = focus::arm(window, completion)?;
    let ui_window = window.clone();
    let shown = run_on_ui_thread(window, move || {
        initialize_winrt_thread()?;
        let hwnd = get_hwnd(&ui_window)?;
        let (dtm, interop) = get_data_transfer_manager(hwnd)?;
        let sheet = Arc::new(sheet);

        let handler = TypedEventHandler::new(
            move |_, args: windows::core::Ref<'_, DataRequestedEventArgs>| -> windows::core::Result<()> {
                if let Some(args) = (*args).as_ref() {
                    fill_data_package(args, &sheet)?;
                }
                ACTIVE_REQUEST.with(|active| {
                    if let Some((manager, token)) = active.borrow_mut().take() {
                        let _ = manager.RemoveDataRequested(token);
                    }
                });
                Ok(())
            },
        );

        let token = dtm.DataRequested(&handler)?;
        ACTIVE_REQUEST.with(|active| *active.borrow_mut() = Some((dtm, token)));
        unsafe { interop.ShowShareUIForWindow(hwnd) }?;
        Ok(())
    });

    match shown {
        Ok(()) => {
            watch.start();
            Ok(())
        }
        Err(e) => {
            watch.abort();
            Err(e)
        }
    }
}

fn fill_data_package(
    args: &DataRequestedEventArgs,
    sheet: &Arc<ShareSheet>,
) -> windows::core::Result<()> {
    let request = args.Request()?;
    let data = request.Data()?;
    let title = sheet.subject.as_deref().unwrap_or(DEFAULT_TITLE);
    data.Properties()?.SetTitle(&HSTRING::from(title))?;

    if let Some(text) = sheet.text.as_deref().filter(|t| !t.is_empty()) {
        data.SetText(&HSTRING::from(text))?;
    }
    if sheet.files.is_empty() {
        return Ok(());
    }

    // Resolving storage files is async; the deferral keeps the request open.
    let deferral = request.GetDeferral()?;
    let sheet = Arc::clone(sheet);
    tauri::async_runtime::spawn(async move {
        let mut items: Vec<Option<IStorageItem>> = Vec::new();
        for file in &sheet.files {
            match StorageFile::GetFileFromPathAsync(&HSTRING::from(file.path.as_str()))
                .and_then(|op| op.get())
                .and_then(|storage_file| storage_file.cast::<IStorageItem>())
            {
                Ok(item) => items.push(Some(item)),
                Err(e) => log::error!("cannot share {}: {}", file.path, e),
            }
        }
        if !items.is_empty() {
            let iterable: Result<IIterable<IStorageItem>, _> = items.try_into();
            match iterable {
                Ok(items) => {
                    if let Err(e) = data.SetStorageItemsReadOnly(&items) {
                        log::error!("failed to attach files to the data package: {e}");
                    }
                }
                Err(e) => log::error!("failed to collect storage items: {e:?}"),
            }
        }
        if let Err(e) = deferral.Complete() {
            log::error!("failed to complete the share deferral: {e}");
        }
    });
    Ok(())
}

/// Initializes the Windows Runtime on the current thread.
fn initialize_winrt_thread() -> Result<(), Error> {
    // S_FALSE on repeat calls is not an error.
    unsafe { RoInitialize(RO_INIT_SINGLETHREADED) }
        .map_err(|e| Error::NativeApi(format!("Failed to initialize WinRT: {}", e)))
}

/// Retrieves the native window handle (HWND) from the Tauri window.
fn get_hwnd<R: Runtime>(window: &Window<R>) -> Result<HWND, Error> {
    let handle = window
        .window_handle()
        .map_err(|e| Error::NativeApi(e.to_string()))?;

    match handle.as_raw() {
        RawWindowHandle::Win32(handle) => Ok(HWND(handle.hwnd.get() as *mut std::ffi::c_void)),
        _ => Err(Error::NativeApi(
            "Unsupported window handle type".to_string(),
        )),
    }
}

/// Desktop (non-UWP) apps must go through the interop factory.
fn get_data_transfer_manager(
    hwnd: HWND,
) -> Result<(DataTransferManager, IDataTransferManagerInterop), Error> {
    let interop = windows::core::factory::<DataTransferManager, IDataTransferManagerInterop>()?;
    let dtm = unsafe { interop.GetForWindow(hwnd) }?;
    Ok((dtm, interop))
}
