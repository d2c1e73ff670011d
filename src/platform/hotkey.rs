use crate::hotkey::{
    key_name_lparam, Hotkey, HotkeyError, HotkeyRegistrar, KeyCode, KeyNamer, Modifiers,
};
use windows::Win32::Foundation::{ERROR_HOTKEY_ALREADY_REGISTERED, HWND};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyNameTextW, MapVirtualKeyW, RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
    MAPVK_VK_TO_VSC,
};

/// Hotkey id on the message window. Only one binding exists.
pub const HOTKEY_ID: i32 = 1;

pub struct Win32HotkeyRegistrar {
    hwnd: HWND,
}

impl Win32HotkeyRegistrar {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }
}

impl HotkeyRegistrar for Win32HotkeyRegistrar {
    fn register(&mut self, modifiers: Modifiers, key: KeyCode) -> Result<(), HotkeyError> {
        let flags = HOT_KEY_MODIFIERS(modifiers.bits());
        unsafe { RegisterHotKey(Some(self.hwnd), HOTKEY_ID, flags, key.raw()) }.map_err(|e| {
            if e.code() == ERROR_HOTKEY_ALREADY_REGISTERED.to_hresult() {
                let hotkey = Hotkey {
                    modifiers,
                    key: Some(key),
                };
                HotkeyError::AlreadyRegistered {
                    hotkey: hotkey.describe_with(&Win32KeyNames),
                }
            } else {
                HotkeyError::Os(e.message())
            }
        })
    }

    fn unregister(&mut self) {
        unsafe {
            let _ = UnregisterHotKey(Some(self.hwnd), HOTKEY_ID);
        }
    }
}

/// Key names from the active keyboard layout via `GetKeyNameTextW`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32KeyNames;

impl KeyNamer for Win32KeyNames {
    fn key_name(&self, key: KeyCode) -> Option<String> {
        let scan_code = unsafe { MapVirtualKeyW(key.raw(), MAPVK_VK_TO_VSC) };
        let mut buffer = [0u16; 64];
        let len = unsafe { GetKeyNameTextW(key_name_lparam(scan_code, key), &mut buffer) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..len as usize]))
    }
}
