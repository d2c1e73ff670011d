//! Translation of egui keyboard input into Win32 hotkey terms for the capture dialog.

use crate::hotkey::{Hotkey, KeyCode, Modifiers};
use egui::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Set(Hotkey),
    Clear,
}

pub fn virtual_key(key: Key) -> Option<KeyCode> {
    let raw = match key {
        Key::A => 0x41,
        Key::B => 0x42,
        Key::C => 0x43,
        Key::D => 0x44,
        Key::E => 0x45,
        Key::F => 0x46,
        Key::G => 0x47,
        Key::H => 0x48,
        Key::I => 0x49,
        Key::J => 0x4A,
        Key::K => 0x4B,
        Key::L => 0x4C,
        Key::M => 0x4D,
        Key::N => 0x4E,
        Key::O => 0x4F,
        Key::P => 0x50,
        Key::Q => 0x51,
        Key::R => 0x52,
        Key::S => 0x53,
        Key::T => 0x54,
        Key::U => 0x55,
        Key::V => 0x56,
        Key::W => 0x57,
        Key::X => 0x58,
        Key::Y => 0x59,
        Key::Z => 0x5A,
        Key::Num0 => 0x30,
        Key::Num1 => 0x31,
        Key::Num2 => 0x32,
        Key::Num3 => 0x33,
        Key::Num4 => 0x34,
        Key::Num5 => 0x35,
        Key::Num6 => 0x36,
        Key::Num7 => 0x37,
        Key::Num8 => 0x38,
        Key::Num9 => 0x39,
        Key::F1 => 0x70,
        Key::F2 => 0x71,
        Key::F3 => 0x72,
        Key::F4 => 0x73,
        Key::F5 => 0x74,
        Key::F6 => 0x75,
        Key::F7 => 0x76,
        Key::F8 => 0x77,
        Key::F9 => 0x78,
        Key::F10 => 0x79,
        Key::F11 => 0x7A,
        Key::F12 => 0x7B,
        Key::F13 => 0x7C,
        Key::F14 => 0x7D,
        Key::F15 => 0x7E,
        Key::F16 => 0x7F,
        Key::F17 => 0x80,
        Key::F18 => 0x81,
        Key::F19 => 0x82,
        Key::F20 => 0x83,
        Key::Space => 0x20,
        Key::PageUp => 0x21,
        Key::PageDown => 0x22,
        Key::End => 0x23,
        Key::Home => 0x24,
        Key::ArrowLeft => 0x25,
        Key::ArrowUp => 0x26,
        Key::ArrowRight => 0x27,
        Key::ArrowDown => 0x28,
        Key::Insert => 0x2D,
        Key::Delete => 0x2E,
        Key::Semicolon => 0xBA,
        Key::Equals | Key::Plus => 0xBB,
        Key::Comma => 0xBC,
        Key::Minus => 0xBD,
        Key::Period => 0xBE,
        Key::Slash => 0xBF,
        Key::Backtick => 0xC0,
        Key::OpenBracket => 0xDB,
        Key::Backslash => 0xDC,
        Key::CloseBracket => 0xDD,
        _ => return None,
    };
    KeyCode::from_raw(raw)
}

/// Ctrl, Alt and Shift only; egui does not report the Windows key.
pub fn modifiers(mods: egui::Modifiers) -> Modifiers {
    let mut result = Modifiers::NONE;
    if mods.ctrl {
        result = result | Modifiers::CONTROL;
    }
    if mods.alt {
        result = result | Modifiers::ALT;
    }
    if mods.shift {
        result = result | Modifiers::SHIFT;
    }
    result
}

/// Interprets one input event. Backspace clears; keys with no hotkey mapping
/// (and key releases) are ignored.
pub fn capture(event: &egui::Event) -> Option<Capture> {
    let egui::Event::Key {
        key,
        pressed: true,
        modifiers: mods,
        ..
    } = event
    else {
        return None;
    };

    if *key == Key::Backspace && !mods.any() {
        return Some(Capture::Clear);
    }

    virtual_key(*key).map(|code| Capture::Set(Hotkey::new(modifiers(*mods), code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::BuiltinKeyNames;

    fn press(key: Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn test_letters_and_digits_match_ascii() {
        assert_eq!(virtual_key(Key::A).map(KeyCode::raw), Some('A' as u32));
        assert_eq!(virtual_key(Key::Z).map(KeyCode::raw), Some('Z' as u32));
        assert_eq!(virtual_key(Key::Num0).map(KeyCode::raw), Some('0' as u32));
        assert_eq!(virtual_key(Key::F10), Some(KeyCode::F10));
        assert_eq!(virtual_key(Key::Escape), None);
    }

    #[test]
    fn test_capture_with_modifiers() {
        let mods = egui::Modifiers {
            ctrl: true,
            alt: true,
            ..Default::default()
        };
        let Some(Capture::Set(hotkey)) = capture(&press(Key::A, mods)) else {
            panic!("expected a captured hotkey");
        };
        assert_eq!(hotkey.describe_with(&BuiltinKeyNames), "Ctrl + Alt + A");
        assert!(hotkey.modifiers.contains(Modifiers::NO_REPEAT));
    }

    #[test]
    fn test_backspace_clears() {
        assert_eq!(capture(&press(Key::Backspace, egui::Modifiers::NONE)), Some(Capture::Clear));
    }

    #[test]
    fn test_release_and_unmapped_ignored() {
        let release = egui::Event::Key {
            key: Key::B,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(capture(&release), None);
        assert_eq!(capture(&press(Key::Escape, egui::Modifiers::NONE)), None);
        assert_eq!(capture(&egui::Event::Text("a".into())), None);
    }
}
