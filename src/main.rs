#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(not(windows))]
fn main() -> std::process::ExitCode {
    eprintln!("{}", gamma_toggler::StartupError::UnsupportedPlatform);
    std::process::ExitCode::from(1)
}

#[cfg(windows)]
fn main() -> std::process::ExitCode {
    let stream_logs = std::env::args().any(|arg| arg == "--stream-logs");

    let code = match shell::run(stream_logs) {
        Ok(()) => 0,
        Err(e) => shell::report(&e),
    };

    let _ = gamma_toggler::logger::finalize_logs();
    std::process::ExitCode::from(code as u8)
}

#[cfg(windows)]
mod shell {
    use anyhow::Result;
    use crossbeam_channel::{Receiver, Sender};
    use gamma_toggler::app::{event_channel, App, AppEvent, Dialog, Outcome, APP_NAME};
    use gamma_toggler::dialogs;
    use gamma_toggler::display::DisplayGammaApplier;
    use gamma_toggler::error::StartupError;
    use gamma_toggler::logger;
    use gamma_toggler::platform::instance::MUTEX_NAME;
    use gamma_toggler::platform::{
        self, window, MessageWindow, ScreenGammaDevice, SingleInstance, Win32HotkeyRegistrar,
        Win32KeyNames,
    };
    use gamma_toggler::settings::SettingsStore;
    use std::path::PathBuf;
    use tracing::{info, warn};
    use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    type ShellApp = App<ScreenGammaDevice, Win32HotkeyRegistrar, Win32KeyNames>;

    pub fn run(stream_logs: bool) -> Result<()> {
        let _instance = SingleInstance::acquire(MUTEX_NAME)?;

        let store = SettingsStore::beside_executable()?;
        let log_dir = store
            .path()
            .parent()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        logger::init_logger_or_stderr(
            log_dir,
            "gamma-toggler",
            logger::DEFAULT_RETENTION,
            stream_logs,
        );
        install_panic_hook();

        info!("=== Gamma Toggler Starting ===");
        if let Some(log_path) = logger::get_log_path() {
            info!("Log file: {}", log_path.display());
        }
        if stream_logs {
            info!("Streaming mode enabled via --stream-logs");
        }

        let settings = store.load();
        info!("Settings loaded from {}", store.path().display());

        let (events_tx, events_rx) = event_channel();
        let window = MessageWindow::create(events_tx.clone())?;

        let mut app = App::new(
            settings,
            store,
            ScreenGammaDevice,
            Win32HotkeyRegistrar::new(window.hwnd()),
            Win32KeyNames,
        );
        app.start()?;
        info!("Hotkey registered: {}", app.describe_hotkey());

        let tray = build_tray(&app, events_tx.clone())?;

        info!("Entering main event loop");
        loop {
            if !window::wait_and_dispatch() {
                info!("WM_QUIT received, exiting");
                app.shutdown();
                break;
            }

            if !drain_events(&mut app, &events_rx, &events_tx) {
                break;
            }
            tray.set_tooltip(Some(app.tooltip())).ok();
        }

        drop(tray);
        drop(app);
        drop(window);
        info!("=== Gamma Toggler Stopped ===");
        Ok(())
    }

    /// Shows the failure to the user and picks the exit code.
    pub fn report(error: &anyhow::Error) -> i32 {
        match error.downcast_ref::<StartupError>() {
            Some(StartupError::AlreadyRunning) => {
                platform::show_info(APP_NAME, &StartupError::AlreadyRunning.to_string());
                StartupError::AlreadyRunning.exit_code()
            }
            Some(startup) => {
                tracing::error!("Startup failed: {}", startup);
                platform::show_error(startup.title(), &startup.to_string());
                startup.exit_code()
            }
            None => {
                tracing::error!("Fatal error: {:#}", error);
                platform::show_error("Gamma Toggler Error", &format!("{:#}", error));
                1
            }
        }
    }

    /// Handles every queued event. Returns false once the app asked to exit.
    fn drain_events(
        app: &mut ShellApp,
        events_rx: &Receiver<AppEvent>,
        events_tx: &Sender<AppEvent>,
    ) -> bool {
        while let Ok(event) = events_rx.try_recv() {
            let mut next = Some(event);
            while let Some(event) = next.take() {
                match app.handle(event) {
                    Outcome::Continue => {}
                    Outcome::ShowGammaDialog(current) => {
                        next = match dialogs::prompt_gamma(current) {
                            Ok(Some(gamma)) => Some(AppEvent::GammaConfirmed(gamma.value())),
                            Ok(None) => None,
                            Err(e) => Some(AppEvent::DialogFailed(Dialog::Gamma, e.to_string())),
                        };
                        drop_stale_dialog_requests(events_rx, events_tx);
                    }
                    Outcome::ShowHotkeyDialog(current) => {
                        next = Some(match dialogs::prompt_hotkey(current) {
                            Ok(Some(hotkey)) => AppEvent::HotkeyConfirmed(hotkey),
                            Ok(None) => AppEvent::HotkeyDialogCancelled,
                            Err(e) => AppEvent::DialogFailed(Dialog::Hotkey, e.to_string()),
                        });
                        drop_stale_dialog_requests(events_rx, events_tx);
                    }
                    Outcome::Warn(message) => platform::show_warning(APP_NAME, message),
                    Outcome::Report(message) => platform::show_warning(APP_NAME, &message),
                    Outcome::Exit => return false,
                }
            }
        }
        true
    }

    /// Menu clicks made while a dialog was open would reopen it straight away.
    fn drop_stale_dialog_requests(events_rx: &Receiver<AppEvent>, events_tx: &Sender<AppEvent>) {
        let mut drained = 0;
        let mut other_events = Vec::new();
        while let Ok(event) = events_rx.try_recv() {
            if event.opens_dialog() {
                drained += 1;
            } else {
                other_events.push(event);
            }
        }
        for event in other_events {
            let _ = events_tx.send(event);
        }
        if drained > 0 {
            info!("Dropped {} buffered dialog requests", drained);
        }
    }

    fn build_tray(app: &ShellApp, events_tx: Sender<AppEvent>) -> Result<TrayIcon, StartupError> {
        let menu = Menu::new();
        let gamma_item = MenuItem::new("Set Gamma...", true, None);
        let hotkey_item = MenuItem::new("Set Hotkey...", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let separator = PredefinedMenuItem::separator();
        menu.append_items(&[&gamma_item, &hotkey_item, &separator, &exit_item])
            .map_err(|e| StartupError::Tray(e.to_string()))?;

        let gamma_id = gamma_item.id().clone();
        let hotkey_id = hotkey_item.id().clone();
        let exit_id = exit_item.id().clone();

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .with_tooltip(app.tooltip())
            .with_icon(load_icon().map_err(|e| StartupError::Tray(e.to_string()))?)
            .build()
            .map_err(|e| StartupError::Tray(e.to_string()))?;

        info!("Tray icon created");

        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            let app_event = if event.id == gamma_id {
                info!("Set Gamma clicked");
                AppEvent::OpenGammaDialog
            } else if event.id == hotkey_id {
                info!("Set Hotkey clicked");
                AppEvent::OpenHotkeyDialog
            } else if event.id == exit_id {
                info!("Exit clicked");
                AppEvent::ExitRequested
            } else {
                return;
            };
            let _ = events_tx.send(app_event);
        }));

        Ok(tray)
    }

    fn load_icon() -> Result<Icon, tray_icon::BadIcon> {
        let icon_path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.join("icon.ico")));

        match icon_path {
            Some(path) if path.exists() => match Icon::from_path(&path, Some((32, 32))) {
                Ok(icon) => {
                    info!("Loaded icon from {:?}", path);
                    return Ok(icon);
                }
                Err(e) => warn!("Failed to load icon from {:?}: {}. Using fallback.", path, e),
            },
            _ => warn!("Icon file not found beside the executable. Using fallback."),
        }

        Icon::from_rgba(dialogs::fallback_icon_rgba(16), 16, 16)
    }

    /// Restores the neutral ramp before the process dies so the screen is never
    /// left with a custom curve.
    fn install_panic_hook() {
        std::panic::set_hook(Box::new(|info| {
            tracing::error!("Panic: {}", info);
            let _ = logger::finalize_logs();
            DisplayGammaApplier::new(ScreenGammaDevice).restore_neutral();
            platform::show_error(
                "Gamma Toggler Crash",
                &format!("Gamma Toggler crashed. The screen gamma was restored.\n\n{}", info),
            );
        }));
    }
}
