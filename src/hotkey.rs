use std::fmt;
use std::ops::BitOr;
use thiserror::Error;

/// Modifier bit-field, using the same bit values as Win32 `RegisterHotKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const ALT: Self = Self(0x0001);
    pub const CONTROL: Self = Self(0x0002);
    pub const SHIFT: Self = Self(0x0004);
    pub const WIN: Self = Self(0x0008);
    pub const NO_REPEAT: Self = Self(0x4000);

    const DISPLAY_ORDER: [(Modifiers, &'static str); 4] = [
        (Self::CONTROL, "Ctrl"),
        (Self::ALT, "Alt"),
        (Self::SHIFT, "Shift"),
        (Self::WIN, "Win"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A Win32 virtual-key code. Zero is reserved for "no key" and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(u32);

impl KeyCode {
    pub const F10: Self = Self(0x79);

    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// A-Z and 0-9, whose virtual-key codes equal their ASCII character.
    pub fn as_alphanumeric(self) -> Option<char> {
        char::from_u32(self.0).filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Option<KeyCode>,
}

impl Hotkey {
    pub const fn none() -> Self {
        Self {
            modifiers: Modifiers::NONE,
            key: None,
        }
    }

    /// A bound hotkey. Auto-repeat is always suppressed.
    pub fn new(modifiers: Modifiers, key: KeyCode) -> Self {
        Self {
            modifiers: modifiers | Modifiers::NO_REPEAT,
            key: Some(key),
        }
    }

    pub fn is_none(&self) -> bool {
        self.key.is_none()
    }

    pub fn describe_with(&self, namer: &impl KeyNamer) -> String {
        let Some(key) = self.key else {
            return "None".to_string();
        };

        let mut text = String::new();
        for (modifier, name) in Modifiers::DISPLAY_ORDER {
            if self.modifiers.contains(modifier) {
                text.push_str(name);
                text.push_str(" + ");
            }
        }

        match key.as_alphanumeric() {
            Some(c) => text.push(c),
            None => text.push_str(&namer.key_name(key).unwrap_or_else(|| "?".to_string())),
        }
        text
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::new(Modifiers::NONE, KeyCode::F10)
    }
}

/// Resolves a display name for keys that are not plain letters or digits.
pub trait KeyNamer {
    fn key_name(&self, key: KeyCode) -> Option<String>;
}

/// Insert, Delete, Home, End, Page Up, Page Down and the four arrows. They share
/// scan codes with the numeric keypad and only get their own names with the
/// extended-key bit.
const EXTENDED_KEY_CODES: [u32; 10] =
    [0x2D, 0x2E, 0x24, 0x23, 0x21, 0x22, 0x26, 0x28, 0x25, 0x27];

/// Builds the `lParam` that `GetKeyNameTextW` expects: scan code in bits 16-23,
/// extended-key flag in bit 24.
pub fn key_name_lparam(scan_code: u32, key: KeyCode) -> i32 {
    let mut lparam = ((scan_code & 0xFF) << 16) as i32;
    if EXTENDED_KEY_CODES.contains(&key.raw()) {
        lparam |= 1 << 24;
    }
    lparam
}

/// Fixed English names for common keys, used where no platform lookup exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKeyNames;

impl KeyNamer for BuiltinKeyNames {
    fn key_name(&self, key: KeyCode) -> Option<String> {
        let raw = key.raw();
        let name = match raw {
            0x70..=0x87 => return Some(format!("F{}", raw - 0x6F)),
            0x60..=0x69 => return Some(format!("Num {}", raw - 0x60)),
            0x08 => "Backspace",
            0x09 => "Tab",
            0x0D => "Enter",
            0x13 => "Pause",
            0x14 => "Caps Lock",
            0x1B => "Esc",
            0x20 => "Space",
            0x21 => "Page Up",
            0x22 => "Page Down",
            0x23 => "End",
            0x24 => "Home",
            0x25 => "Left",
            0x26 => "Up",
            0x27 => "Right",
            0x28 => "Down",
            0x2C => "Sys Req",
            0x2D => "Insert",
            0x2E => "Delete",
            0x6A => "Num *",
            0x6B => "Num +",
            0x6D => "Num -",
            0x6E => "Num Del",
            0x6F => "Num /",
            0x90 => "Num Lock",
            0x91 => "Scroll Lock",
            0xBA => ";",
            0xBB => "=",
            0xBC => ",",
            0xBD => "-",
            0xBE => ".",
            0xBF => "/",
            0xC0 => "`",
            0xDB => "[",
            0xDC => "\\",
            0xDD => "]",
            0xDE => "'",
            _ => return None,
        };
        Some(name.to_string())
    }
}

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("hotkey {hotkey} is already registered by another application")]
    AlreadyRegistered { hotkey: String },
    #[error("failed to register hotkey: {0}")]
    Os(String),
}

/// OS-level global hotkey registration for a single binding.
pub trait HotkeyRegistrar {
    fn register(&mut self, modifiers: Modifiers, key: KeyCode) -> Result<(), HotkeyError>;
    fn unregister(&mut self);
}

/// The active hotkey together with its OS registration.
///
/// The in-memory binding is never rolled back here: when `register` fails,
/// `hotkey()` and `describe()` still reflect the attempted values. Callers that
/// want rollback restore the previous binding themselves.
pub struct HotkeyBinding<R, N> {
    hotkey: Hotkey,
    registrar: R,
    namer: N,
    registered: bool,
}

impl<R: HotkeyRegistrar, N: KeyNamer> HotkeyBinding<R, N> {
    pub fn new(hotkey: Hotkey, registrar: R, namer: N) -> Self {
        Self {
            hotkey,
            registrar,
            namer,
            registered: false,
        }
    }

    pub fn hotkey(&self) -> Hotkey {
        self.hotkey
    }

    /// Replaces the binding without touching the OS registration.
    pub fn set(&mut self, hotkey: Hotkey) {
        self.hotkey = hotkey;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn register(&mut self) -> bool {
        self.unregister();

        let Some(key) = self.hotkey.key else {
            tracing::info!("No hotkey configured; skipping registration");
            return true;
        };

        match self.registrar.register(self.hotkey.modifiers, key) {
            Ok(()) => {
                self.registered = true;
                tracing::info!("Registered hotkey {}", self.describe());
                true
            }
            Err(e) => {
                tracing::warn!("Could not register hotkey {}: {}", self.describe(), e);
                false
            }
        }
    }

    pub fn unregister(&mut self) {
        if self.registered {
            self.registrar.unregister();
            self.registered = false;
        }
    }

    pub fn describe(&self) -> String {
        self.hotkey.describe_with(&self.namer)
    }

    pub fn namer(&self) -> &N {
        &self.namer
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe_with(&BuiltinKeyNames))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Registrar that refuses any combination in `taken`.
    #[derive(Default)]
    pub(crate) struct FakeRegistrar {
        pub taken: HashSet<(u32, u32)>,
        pub active: Option<(u32, u32)>,
        pub register_calls: usize,
        pub unregister_calls: usize,
    }

    impl FakeRegistrar {
        pub fn with_taken(modifiers: Modifiers, key: KeyCode) -> Self {
            let mut registrar = Self::default();
            registrar.taken.insert((modifiers.bits(), key.raw()));
            registrar
        }
    }

    impl HotkeyRegistrar for FakeRegistrar {
        fn register(&mut self, modifiers: Modifiers, key: KeyCode) -> Result<(), HotkeyError> {
            self.register_calls += 1;
            let combo = (modifiers.bits(), key.raw());
            if self.taken.contains(&combo) {
                return Err(HotkeyError::AlreadyRegistered {
                    hotkey: format!("{:#x}/{:#x}", combo.0, combo.1),
                });
            }
            self.active = Some(combo);
            Ok(())
        }

        fn unregister(&mut self) {
            self.unregister_calls += 1;
            self.active = None;
        }
    }

    const KEY_A: KeyCode = match KeyCode::from_raw(0x41) {
        Some(key) => key,
        None => panic!(),
    };

    #[test]
    fn test_describe_ctrl_alt_letter() {
        let hotkey = Hotkey::new(Modifiers::CONTROL | Modifiers::ALT, KEY_A);
        assert_eq!(hotkey.describe_with(&BuiltinKeyNames), "Ctrl + Alt + A");
    }

    #[test]
    fn test_describe_none() {
        assert_eq!(Hotkey::none().describe_with(&BuiltinKeyNames), "None");
        let stray_modifiers = Hotkey {
            modifiers: Modifiers::CONTROL,
            key: KeyCode::from_raw(0),
        };
        assert_eq!(stray_modifiers.describe_with(&BuiltinKeyNames), "None");
    }

    #[test]
    fn test_describe_fixed_modifier_order() {
        let all = Modifiers::WIN | Modifiers::SHIFT | Modifiers::ALT | Modifiers::CONTROL;
        let hotkey = Hotkey::new(all, KeyCode::from_raw(0x37).unwrap());
        assert_eq!(hotkey.describe_with(&BuiltinKeyNames), "Ctrl + Alt + Shift + Win + 7");
    }

    #[test]
    fn test_describe_named_keys() {
        assert_eq!(Hotkey::default().describe_with(&BuiltinKeyNames), "F10");
        let page_up = Hotkey::new(Modifiers::SHIFT, KeyCode::from_raw(0x21).unwrap());
        assert_eq!(page_up.describe_with(&BuiltinKeyNames), "Shift + Page Up");
        let unknown = Hotkey::new(Modifiers::NONE, KeyCode::from_raw(0xFE).unwrap());
        assert_eq!(unknown.describe_with(&BuiltinKeyNames), "?");
    }

    #[test]
    fn test_key_name_lparam_flags_navigation_keys() {
        const EXTENDED: u32 = 1 << 24;
        for raw in [0x2D, 0x2E, 0x24, 0x23, 0x21, 0x22, 0x26, 0x28, 0x25, 0x27] {
            let lparam = key_name_lparam(0x47, KeyCode::from_raw(raw).unwrap()) as u32;
            assert_eq!(lparam & EXTENDED, EXTENDED, "vk {:#x}", raw);
            assert_eq!((lparam >> 16) & 0xFF, 0x47);
        }
    }

    #[test]
    fn test_key_name_lparam_leaves_other_keys_plain() {
        for (scan_code, raw) in [(0x44, 0x79), (0x52, 0x60), (0x1E, 0x41), (0x0B, 0x30)] {
            let lparam = key_name_lparam(scan_code, KeyCode::from_raw(raw).unwrap());
            assert_eq!(lparam, (scan_code << 16) as i32, "vk {:#x}", raw);
        }
    }

    #[test]
    fn test_new_always_suppresses_repeat() {
        let hotkey = Hotkey::new(Modifiers::ALT, KEY_A);
        assert!(hotkey.modifiers.contains(Modifiers::NO_REPEAT));
        assert_eq!(Hotkey::default().modifiers, Modifiers::NO_REPEAT);
    }

    #[test]
    fn test_register_none_skips_os() {
        let mut binding =
            HotkeyBinding::new(Hotkey::none(), FakeRegistrar::default(), BuiltinKeyNames);
        assert!(binding.register());
        assert!(!binding.is_registered());
        assert_eq!(binding.registrar().register_calls, 0);
    }

    #[test]
    fn test_register_replaces_previous_registration() {
        let mut binding =
            HotkeyBinding::new(Hotkey::default(), FakeRegistrar::default(), BuiltinKeyNames);
        assert!(binding.register());
        binding.set(Hotkey::new(Modifiers::CONTROL, KEY_A));
        assert!(binding.register());
        assert_eq!(binding.registrar().unregister_calls, 1);
        assert_eq!(
            binding.registrar().active,
            Some(((Modifiers::CONTROL | Modifiers::NO_REPEAT).bits(), 0x41))
        );
    }

    #[test]
    fn test_failed_register_keeps_attempted_binding() {
        let taken = Modifiers::CONTROL | Modifiers::ALT | Modifiers::NO_REPEAT;
        let registrar = FakeRegistrar::with_taken(taken, KEY_A);
        let mut binding = HotkeyBinding::new(Hotkey::default(), registrar, BuiltinKeyNames);
        assert!(binding.register());

        binding.set(Hotkey::new(Modifiers::CONTROL | Modifiers::ALT, KEY_A));
        assert!(!binding.register());
        assert!(!binding.is_registered());
        assert_eq!(binding.describe(), "Ctrl + Alt + A");
    }

    #[test]
    fn test_unregister_is_noop_when_idle() {
        let mut binding =
            HotkeyBinding::new(Hotkey::default(), FakeRegistrar::default(), BuiltinKeyNames);
        binding.unregister();
        assert_eq!(binding.registrar().unregister_calls, 0);
    }
}
