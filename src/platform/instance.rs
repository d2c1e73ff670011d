use crate::error::StartupError;
use windows::core::HSTRING;
use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
use windows::Win32::System::Threading::{CreateMutexW, ReleaseMutex};

pub const MUTEX_NAME: &str = "Global\\GammaTogglerSingleInstanceMutex";

/// Named mutex held for the life of the process.
pub struct SingleInstance {
    handle: HANDLE,
}

impl SingleInstance {
    /// Never blocks. Returns `AlreadyRunning` when another process owns the name.
    pub fn acquire(name: &str) -> Result<Self, StartupError> {
        unsafe {
            let handle = CreateMutexW(None, true, &HSTRING::from(name))
                .map_err(|e| StartupError::Mutex(e.message()))?;

            if GetLastError() == ERROR_ALREADY_EXISTS {
                let _ = CloseHandle(handle);
                return Err(StartupError::AlreadyRunning);
            }

            Ok(Self { handle })
        }
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseMutex(self.handle);
            let _ = CloseHandle(self.handle);
        }
    }
}
