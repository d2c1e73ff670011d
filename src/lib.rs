pub mod app;
pub mod display;
pub mod error;
pub mod gamma;
pub mod hotkey;
pub mod keymap;
pub mod logger;
pub mod settings;
pub mod toggle;

#[cfg(windows)]
pub mod dialogs;
#[cfg(windows)]
pub mod platform;

pub use app::{App, AppEvent, Outcome};
pub use display::{DisplayGammaApplier, GammaDevice};
pub use error::StartupError;
pub use gamma::{compute_ramp, GammaRamp, GammaSetting};
pub use hotkey::{Hotkey, HotkeyBinding, KeyCode, Modifiers};
pub use settings::{Settings, SettingsStore};
pub use toggle::ToggleState;
