//! Modal settings dialogs. Each one runs its own eframe event loop on the
//! calling thread and returns once the window closes.

use crate::app::{Dialog, APP_NAME, INVALID_GAMMA_MESSAGE};
use crate::gamma::GammaSetting;
use crate::hotkey::Hotkey;
use crate::keymap::{self, Capture};
use crate::platform::{self, Win32KeyNames};
use parking_lot::Mutex;
use std::sync::Arc;

type Outcome<T> = Arc<Mutex<Option<T>>>;

/// Asks for a new target gamma. `Ok(None)` when the dialog was cancelled or closed;
/// `Err` when the window could not be created.
pub fn prompt_gamma(current: GammaSetting) -> eframe::Result<Option<GammaSetting>> {
    run_modal(Dialog::Gamma, [300.0, 130.0], move |outcome| GammaDialog {
        input: format!("{:.2}", current.value()),
        outcome,
        focused: false,
    })
}

/// Captures a new hotkey. `Some(Hotkey::none())` means the user cleared it.
pub fn prompt_hotkey(current: Hotkey) -> eframe::Result<Option<Hotkey>> {
    run_modal(Dialog::Hotkey, [320.0, 150.0], move |outcome| HotkeyDialog {
        capture: current,
        outcome,
    })
}

fn run_modal<T, A>(
    dialog: Dialog,
    size: [f32; 2],
    build: impl FnOnce(Outcome<T>) -> A,
) -> eframe::Result<Option<T>>
where
    T: 'static,
    A: eframe::App + 'static,
{
    let title = dialog.title();
    let outcome: Outcome<T> = Arc::new(Mutex::new(None));
    let app = build(Arc::clone(&outcome));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("{} - {}", APP_NAME, title))
            .with_inner_size(size)
            .with_resizable(false)
            .with_minimize_button(false)
            .with_maximize_button(false)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
            .with_icon(load_window_icon()),
        run_and_return: true,
        centered: true,
        ..Default::default()
    };

    tracing::info!("Opening {} dialog", title);
    eframe::run_native(title, native_options, Box::new(move |_cc| Ok(Box::new(app))))?;

    let result = outcome.lock().take();
    let verdict = if result.is_some() { "confirmed" } else { "cancelled" };
    tracing::info!("{} dialog closed ({})", title, verdict);
    Ok(result)
}

struct GammaDialog {
    input: String,
    outcome: Outcome<GammaSetting>,
    focused: bool,
}

impl GammaDialog {
    fn confirm(&mut self, ctx: &egui::Context) {
        match GammaSetting::parse(&self.input) {
            Ok(gamma) => {
                *self.outcome.lock() = Some(gamma);
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => {
                tracing::warn!("Gamma input {:?} rejected: {}", self.input, e);
                platform::show_warning(APP_NAME, INVALID_GAMMA_MESSAGE);
            }
        }
    }
}

impl eframe::App for GammaDialog {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut confirm = false;
        let mut cancel = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Gamma (0.1 - 10.0):");
            let response =
                ui.add(egui::TextEdit::singleline(&mut self.input).desired_width(f32::INFINITY));
            if !self.focused {
                response.request_focus();
                self.focused = true;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                confirm = true;
            }

            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
                if ui.button("OK").clicked() {
                    confirm = true;
                }
            });
        });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            cancel = true;
        }

        if confirm {
            self.confirm(ctx);
        } else if cancel {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

struct HotkeyDialog {
    capture: Hotkey,
    outcome: Outcome<Hotkey>,
}

impl eframe::App for HotkeyDialog {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut confirm = false;
        let mut cancel = false;

        ctx.input(|i| {
            for event in &i.events {
                match keymap::capture(event) {
                    Some(Capture::Set(hotkey)) => self.capture = hotkey,
                    Some(Capture::Clear) => self.capture = Hotkey::none(),
                    None => {}
                }
            }
            confirm = i.key_pressed(egui::Key::Enter);
            cancel = i.key_pressed(egui::Key::Escape);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Press the new key combination:");
            ui.add_space(4.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                let text = self.capture.describe_with(&Win32KeyNames);
                ui.label(egui::RichText::new(text).strong().size(16.0));
            });

            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
                if ui.button("OK").clicked() {
                    confirm = true;
                }
                if ui.button("Clear").clicked() {
                    self.capture = Hotkey::none();
                }
            });
        });

        if confirm {
            *self.outcome.lock() = Some(self.capture);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else if cancel {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

fn load_window_icon() -> egui::IconData {
    let icon_path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.join("icon.ico")));

    if let Some(path) = icon_path.filter(|p| p.exists()) {
        match image::open(&path) {
            Ok(image) => {
                let rgba = image.to_rgba8();
                let (width, height) = rgba.dimensions();
                return egui::IconData {
                    rgba: rgba.into_raw(),
                    width,
                    height,
                };
            }
            Err(e) => tracing::warn!("Failed to load window icon from {:?}: {}", path, e),
        }
    }

    egui::IconData {
        rgba: fallback_icon_rgba(32),
        width: 32,
        height: 32,
    }
}

/// Flat amber square used when `icon.ico` is missing.
pub fn fallback_icon_rgba(size: usize) -> Vec<u8> {
    [255u8, 176, 64, 255].repeat(size * size)
}
