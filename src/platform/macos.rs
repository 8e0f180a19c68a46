use objc2::{
    rc::{autoreleasepool, Retained},
    runtime::AnyObject,
    AnyThread,
};
use objc2_app_kit::{NSSharingServicePicker, NSView};
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_foundation::{NSArray, NSRectEdge, NSString, NSURL};
use raw_window_handle::{HasWindowHandle, RawWindowHandle, WindowHandle};
use tauri::{Runtime, Window};

use super::focus;
use crate::models::{SharePosition, ShareSheet};
use crate::pending::Completion;
use crate::ui::run_on_ui_thread;
use crate::Error;

/// Shows `NSSharingServicePicker` anchored to the window's content view. The
/// completion resolves once the picker gives focus back to the window.
pub fn present_share_sheet<R: Runtime>(
    window: &Window<R>,
    sheet: ShareSheet,
    completion: Completion,
) -> Result<(), Error> {
    let watch = focus::arm(window, completion)?;
    let ui_window = window.clone();
    let shown = run_on_ui_thread(window, move || {
        let ns_view = get_ns_view(&ui_window)?;
        let items = sheet_items(&sheet);
        if items.is_empty() {
            return Err(Error::InvalidArgs("No content provided to share.".to_string()));
        }

        autoreleasepool(|_pool| {
            let items = NSArray::from_retained_slice(&items);
            let picker = unsafe {
                NSSharingServicePicker::initWithItems(NSSharingServicePicker::alloc(), &items)
            };
            let anchor = anchor_rect(&ns_view, sheet.position.as_ref());
            unsafe {
                picker.showRelativeToRect_ofView_preferredEdge(
                    anchor,
                    &ns_view,
                    NSRectEdge::NSMinYEdge,
                );
            }
        });
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

/// File URLs first, then the text body.
fn sheet_items(sheet: &ShareSheet) -> Vec<Retained<AnyObject>> {
    let mut items: Vec<Retained<AnyObject>> = Vec::new();
    for file in &sheet.files {
        let url = unsafe { NSURL::fileURLWithPath(&NSString::from_str(&file.path)) };
        items.push(Retained::into_super(Retained::into_super(url)));
    }
    if let Some(text) = sheet.text.as_deref().filter(|t| !t.is_empty()) {
        let text = NSString::from_str(text);
        items.push(Retained::into_super(Retained::into_super(text)));
    }
    items
}

/// The caller's anchor when one was given, otherwise the view's centre.
fn anchor_rect(view: &NSView, position: Option<&SharePosition>) -> CGRect {
    let bounds = view.bounds();
    let mid_x = bounds.size.width / 2.0;
    let mid_y = bounds.size.height / 2.0;
    match position.filter(|p| !p.center) {
        Some(p) => CGRect {
            origin: CGPoint {
                x: p.x.unwrap_or(mid_x),
                y: p.y.unwrap_or(mid_y),
            },
            size: CGSize {
                width: p.width.unwrap_or(0.0),
                height: p.height.unwrap_or(0.0),
            },
        },
        None => CGRect {
            origin: CGPoint { x: mid_x, y: mid_y },
            size: CGSize {
                width: 0.0,
                height: 0.0,
            },
        },
    }
}

/// Retrieves the native `NSView` pointer from the Tauri window, compatible with `raw-window-handle`.
fn get_ns_view<R: Runtime>(window: &Window<R>) -> Result<Retained<NSView>, Error> {
    let window_handle: WindowHandle<'_> = window
        .window_handle()
        .map_err(|e| Error::NativeApi(e.to_string()))?;
    if let RawWindowHandle::AppKit(handle) = window_handle.as_raw() {
        let ns_view_ptr = handle.ns_view.as_ptr();
        unsafe { Retained::retain(ns_view_ptr.cast()) }
            .ok_or_else(|| Error::NativeApi("The window has no content view.".to_string()))
    } else {
        Err(Error::NativeApi(
            "Unsupported window handle type on macOS.".to_string(),
        ))
    }
}
