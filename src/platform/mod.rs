//! Win32 implementations of the display, hotkey and process seams, plus the
//! hidden message window and message boxes.

pub mod gdi;
pub mod hotkey;
pub mod instance;
pub mod window;

use windows::core::HSTRING;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONEXCLAMATION, MB_ICONINFORMATION, MB_OK, MB_TASKMODAL,
};

pub use gdi::ScreenGammaDevice;
pub use hotkey::{Win32HotkeyRegistrar, Win32KeyNames, HOTKEY_ID};
pub use instance::SingleInstance;
pub use window::MessageWindow;

pub fn show_error(title: &str, text: &str) {
    unsafe {
        MessageBoxW(None, &HSTRING::from(text), &HSTRING::from(title), MB_OK | MB_ICONERROR);
    }
}

/// Blocks every window of this thread, including an open dialog, until dismissed.
pub fn show_warning(title: &str, text: &str) {
    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(text),
            &HSTRING::from(title),
            MB_OK | MB_ICONEXCLAMATION | MB_TASKMODAL,
        );
    }
}

pub fn show_info(title: &str, text: &str) {
    unsafe {
        MessageBoxW(None, &HSTRING::from(text), &HSTRING::from(title), MB_OK | MB_ICONINFORMATION);
    }
}
