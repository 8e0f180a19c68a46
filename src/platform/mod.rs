//! The desktop system share sheet, one implementation per OS. Each exposes
//! `present_share_sheet(window, sheet, completion)`.

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::*;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::*;

#[cfg(any(target_os = "windows", target_os = "macos"))]
mod focus;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use self::macos::*;
