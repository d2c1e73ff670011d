use crate::display::{DisplayGammaApplier, GammaDevice};
use crate::error::StartupError;
use crate::gamma::GammaSetting;
use crate::hotkey::{Hotkey, HotkeyBinding, HotkeyRegistrar, KeyNamer};
use crate::settings::{Settings, SettingsStore};
use crate::toggle::ToggleState;
use crossbeam_channel::{Receiver, Sender};

pub const APP_NAME: &str = "Gamma Toggler";
pub const INVALID_GAMMA_MESSAGE: &str =
    "Invalid gamma value. Please enter a number between 0.1 and 10.0.";
pub const REREGISTER_FAILED_MESSAGE: &str = "Could not re-register hotkey.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Gamma,
    Hotkey,
}

impl Dialog {
    pub fn title(self) -> &'static str {
        match self {
            Self::Gamma => "Set Gamma",
            Self::Hotkey => "Set Hotkey",
        }
    }
}

/// Everything the shell can tell the controller. Delivered one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    HotkeyFired,
    OpenGammaDialog,
    OpenHotkeyDialog,
    GammaConfirmed(f32),
    HotkeyConfirmed(Hotkey),
    HotkeyDialogCancelled,
    /// The dialog window could not be created at all.
    DialogFailed(Dialog, String),
    ExitRequested,
}

impl AppEvent {
    pub fn opens_dialog(&self) -> bool {
        matches!(self, Self::OpenGammaDialog | Self::OpenHotkeyDialog)
    }
}

/// What the shell should do after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    ShowGammaDialog(GammaSetting),
    ShowHotkeyDialog(Hotkey),
    Warn(&'static str),
    Report(String),
    Exit,
}

pub fn event_channel() -> (Sender<AppEvent>, Receiver<AppEvent>) {
    crossbeam_channel::unbounded()
}

/// Owned application state: target gamma, hotkey binding, toggle flag.
pub struct App<D: GammaDevice, R: HotkeyRegistrar, N: KeyNamer> {
    display: DisplayGammaApplier<D>,
    binding: HotkeyBinding<R, N>,
    target: GammaSetting,
    toggle: ToggleState,
    store: SettingsStore,
    shut_down: bool,
}

impl<D: GammaDevice, R: HotkeyRegistrar, N: KeyNamer> App<D, R, N> {
    pub fn new(
        settings: Settings,
        store: SettingsStore,
        device: D,
        registrar: R,
        namer: N,
    ) -> Self {
        Self {
            display: DisplayGammaApplier::new(device),
            binding: HotkeyBinding::new(settings.hotkey, registrar, namer),
            target: settings.gamma,
            toggle: ToggleState::default(),
            store,
            shut_down: false,
        }
    }

    /// Registers the configured hotkey. Failure here is fatal for the process.
    pub fn start(&mut self) -> Result<(), StartupError> {
        if self.binding.register() {
            Ok(())
        } else {
            Err(StartupError::HotkeyRegistration(self.binding.describe()))
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Outcome {
        match event {
            AppEvent::HotkeyFired => {
                self.on_hotkey_fired();
                Outcome::Continue
            }
            AppEvent::OpenGammaDialog => Outcome::ShowGammaDialog(self.target),
            AppEvent::OpenHotkeyDialog => Outcome::ShowHotkeyDialog(self.begin_hotkey_edit()),
            AppEvent::GammaConfirmed(value) => self.on_gamma_confirmed(value),
            AppEvent::HotkeyConfirmed(hotkey) => self.on_hotkey_confirmed(hotkey),
            AppEvent::HotkeyDialogCancelled => self.on_hotkey_dialog_cancelled(),
            AppEvent::DialogFailed(dialog, reason) => self.on_dialog_failed(dialog, &reason),
            AppEvent::ExitRequested => self.on_exit_requested(),
        }
    }

    pub fn on_hotkey_fired(&mut self) {
        let state = self.toggle.flip();
        let gamma = self.applied_gamma();
        tracing::info!("Hotkey fired: {:?}, applying gamma {:.2}", state, gamma);
        if let Err(e) = self.display.apply_gamma(gamma) {
            tracing::warn!("Gamma {:.2} not applied: {}", gamma, e);
        }
    }

    pub fn on_gamma_confirmed(&mut self, value: f32) -> Outcome {
        let gamma = match GammaSetting::new(value) {
            Ok(gamma) => gamma,
            Err(e) => {
                tracing::warn!("Rejected gamma from dialog: {}", e);
                return Outcome::Warn(INVALID_GAMMA_MESSAGE);
            }
        };

        self.target = gamma;
        tracing::info!("Target gamma set to {:.2}", gamma.value());

        if self.toggle.is_custom() {
            if let Err(e) = self.display.apply_gamma(gamma.value()) {
                tracing::warn!("Gamma {:.2} not applied: {}", gamma.value(), e);
            }
        }

        self.persist();
        Outcome::Continue
    }

    /// Releases the OS registration so the dialog can capture the current
    /// combination, and returns the binding to pre-fill it with.
    pub fn begin_hotkey_edit(&mut self) -> Hotkey {
        self.binding.unregister();
        self.binding.hotkey()
    }

    /// Applies the edited binding. On registration failure the previous binding
    /// is restored and re-registered, and nothing is persisted.
    pub fn on_hotkey_confirmed(&mut self, hotkey: Hotkey) -> Outcome {
        let hotkey = match hotkey.key {
            Some(key) => Hotkey::new(hotkey.modifiers, key),
            None => Hotkey::none(),
        };
        let previous = self.binding.hotkey();

        self.binding.set(hotkey);
        if self.binding.register() {
            tracing::info!("Hotkey changed to {}", self.binding.describe());
            self.persist();
            return Outcome::Continue;
        }

        tracing::warn!("Rolling back hotkey to {}", previous.describe_with(self.binding.namer()));
        self.binding.set(previous);
        if !self.binding.register() {
            tracing::error!("Previous hotkey could not be restored either");
        }
        Outcome::Warn(REREGISTER_FAILED_MESSAGE)
    }

    pub fn on_hotkey_dialog_cancelled(&mut self) -> Outcome {
        if self.binding.register() {
            Outcome::Continue
        } else {
            Outcome::Warn(REREGISTER_FAILED_MESSAGE)
        }
    }

    /// A dialog that never opened changes nothing; the hotkey released for
    /// capture is registered again.
    pub fn on_dialog_failed(&mut self, dialog: Dialog, reason: &str) -> Outcome {
        tracing::error!("{} dialog could not be opened: {}", dialog.title(), reason);
        if dialog == Dialog::Hotkey && !self.binding.register() {
            return Outcome::Warn(REREGISTER_FAILED_MESSAGE);
        }
        Outcome::Report(format!(
            "The {} dialog could not be opened.\n\n{}",
            dialog.title(),
            reason
        ))
    }

    pub fn on_exit_requested(&mut self) -> Outcome {
        tracing::info!("Exit requested");
        self.shutdown();
        Outcome::Exit
    }

    /// Releases the hotkey and restores the neutral ramp. Runs once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.binding.unregister();
        self.display.restore_neutral();
    }

    fn persist(&self) {
        let settings = Settings {
            gamma: self.target,
            hotkey: self.binding.hotkey(),
        };
        if let Err(e) = self.store.save(&settings) {
            tracing::error!("Failed to save settings: {:#}", anyhow::Error::from(e));
        }
    }

    pub fn applied_gamma(&self) -> f32 {
        self.toggle.applied_gamma(self.target)
    }

    pub fn target_gamma(&self) -> GammaSetting {
        self.target
    }

    pub fn toggle_state(&self) -> ToggleState {
        self.toggle
    }

    pub fn hotkey(&self) -> Hotkey {
        self.binding.hotkey()
    }

    pub fn describe_hotkey(&self) -> String {
        self.binding.describe()
    }

    pub fn tooltip(&self) -> String {
        format!(
            "{}\nGamma: {:.2}\nHotkey: {}",
            APP_NAME,
            self.applied_gamma(),
            self.describe_hotkey()
        )
    }

    #[cfg(test)]
    fn display(&self) -> &DisplayGammaApplier<D> {
        &self.display
    }

    #[cfg(test)]
    fn binding(&self) -> &HotkeyBinding<R, N> {
        &self.binding
    }
}

impl<D: GammaDevice, R: HotkeyRegistrar, N: KeyNamer> Drop for App<D, R, N> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
