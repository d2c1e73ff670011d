use thiserror::Error;

/// Conditions that stop the application before the message loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Application already running.")]
    AlreadyRunning,
    #[error("Could not create mutex: {0}")]
    Mutex(String),
    #[error("Could not create the message window: {0}")]
    Window(String),
    #[error("Could not create the tray icon: {0}")]
    Tray(String),
    #[error("Failed to register hotkey {0}. It might be in use.")]
    HotkeyRegistration(String),
    #[error("Gamma Toggler only runs on Windows.")]
    UnsupportedPlatform,
}

impl StartupError {
    /// A second instance is a normal exit; everything else is a failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AlreadyRunning => 0,
            _ => 1,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "Gamma Toggler",
            _ => "Gamma Toggler Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(StartupError::AlreadyRunning.exit_code(), 0);
        assert_eq!(StartupError::Mutex("denied".into()).exit_code(), 1);
        assert_eq!(StartupError::Window("no class".into()).exit_code(), 1);
        assert_eq!(StartupError::HotkeyRegistration("F10".into()).exit_code(), 1);
        assert_eq!(StartupError::UnsupportedPlatform.exit_code(), 1);
    }

    #[test]
    fn test_hotkey_message_names_binding() {
        let err = StartupError::HotkeyRegistration("Ctrl + F10".into());
        assert_eq!(err.to_string(), "Failed to register hotkey Ctrl + F10. It might be in use.");
    }
}
