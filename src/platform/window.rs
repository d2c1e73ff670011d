use super::hotkey::HOTKEY_ID;
use crate::app::AppEvent;
use crate::error::StartupError;
use crossbeam_channel::Sender;
use once_cell::sync::OnceCell;
use windows::core::w;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, RegisterClassW,
    TranslateMessage, HWND_MESSAGE, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WM_HOTKEY, WNDCLASSW,
};

static EVENT_SINK: OnceCell<Sender<AppEvent>> = OnceCell::new();

/// Message-only window that receives `WM_HOTKEY`.
pub struct MessageWindow {
    hwnd: HWND,
}

impl MessageWindow {
    pub fn create(events: Sender<AppEvent>) -> Result<Self, StartupError> {
        EVENT_SINK
            .set(events)
            .map_err(|_| StartupError::Window("message window already created".to_string()))?;

        unsafe {
            let instance = GetModuleHandleW(None).map_err(|e| StartupError::Window(e.message()))?;
            let class_name = w!("GammaTogglerWindowClass");

            let wc = WNDCLASSW {
                lpfnWndProc: Some(Self::window_proc),
                hInstance: instance.into(),
                lpszClassName: class_name,
                ..Default::default()
            };

            // Fails harmlessly if the class is already registered.
            RegisterClassW(&wc);

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class_name,
                w!("Gamma Toggler"),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                Some(instance.into()),
                None,
            )
            .map_err(|e| StartupError::Window(e.message()))?;

            tracing::info!("Message window created");
            Ok(Self { hwnd })
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_HOTKEY if wparam.0 == HOTKEY_ID as usize => {
                if let Some(sink) = EVENT_SINK.get() {
                    let _ = sink.send(AppEvent::HotkeyFired);
                }
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

/// Blocks for the next message on this thread and dispatches it. Returns false on
/// `WM_QUIT` or when the message queue is gone.
pub fn wait_and_dispatch() -> bool {
    unsafe {
        let mut msg = MSG::default();
        if GetMessageW(&mut msg, None, 0, 0).0 <= 0 {
            return false;
        }
        let _ = TranslateMessage(&msg);
        DispatchMessageW(&msg);
        true
    }
}
