use crate::gamma::GammaSetting;
use crate::hotkey::{Hotkey, KeyCode, Modifiers};
use ini::Ini;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.ini";
pub const SECTION: &str = "Settings";
pub const KEY_GAMMA: &str = "GammaX100";
pub const KEY_MODIFIER: &str = "Modifier";
pub const KEY_KEY: &str = "Key";

pub const DEFAULT_GAMMA_X100: i64 = 280;
pub const DEFAULT_MODIFIER: u32 = Modifiers::NO_REPEAT.bits();
pub const DEFAULT_KEY: u32 = KeyCode::F10.raw();

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to locate the executable directory")]
    ExecutableDir(#[source] io::Error),
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The persisted state: target gamma and hotkey binding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Settings {
    pub gamma: GammaSetting,
    pub hotkey: Hotkey,
}

impl Settings {
    /// Reads the `[Settings]` section. Each missing or unparseable key falls
    /// back to its own default; out-of-range gamma falls back to 2.80.
    pub fn from_ini(ini: &Ini) -> Self {
        let section = ini.section(Some(SECTION));
        let read = |key: &str, default: i64| -> i64 {
            let Some(raw) = section.and_then(|props| props.get(key)) else {
                return default;
            };
            match leading_integer(raw) {
                Some(value) => value,
                None => {
                    tracing::warn!("Ignoring non-numeric {}={:?}; using {}", key, raw, default);
                    default
                }
            }
        };
        let read_u32 = |key: &str, default: u32| -> u32 {
            let value = read(key, default as i64);
            u32::try_from(value).unwrap_or_else(|_| {
                tracing::warn!("Ignoring out-of-range {}={}; using {}", key, value, default);
                default
            })
        };

        let gamma_x100 = read(KEY_GAMMA, DEFAULT_GAMMA_X100);
        let gamma = GammaSetting::from_hundredths(gamma_x100).unwrap_or_else(|e| {
            tracing::warn!("Stored {}={} rejected ({}); using default", KEY_GAMMA, gamma_x100, e);
            GammaSetting::default()
        });

        // Modifier and Key are independent; a stored mask survives Key=0.
        let hotkey = Hotkey {
            modifiers: Modifiers::from_bits(read_u32(KEY_MODIFIER, DEFAULT_MODIFIER)),
            key: KeyCode::from_raw(read_u32(KEY_KEY, DEFAULT_KEY)),
        };

        Self { gamma, hotkey }
    }

    pub fn write_to(&self, ini: &mut Ini) {
        ini.with_section(Some(SECTION))
            .set(KEY_GAMMA, self.gamma.to_hundredths().to_string())
            .set(KEY_MODIFIER, self.hotkey.modifiers.bits().to_string())
            .set(KEY_KEY, self.hotkey.key.map_or(0, KeyCode::raw).to_string());
    }
}

/// Reads an optionally signed run of leading digits, ignoring whatever follows,
/// so `280abc` reads as 280. `None` when there are no digits at all.
fn leading_integer(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `config.ini` on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn beside_executable() -> Result<Self, SettingsError> {
        let exe = std::env::current_exe().map_err(SettingsError::ExecutableDir)?;
        let dir = exe.parent().ok_or_else(|| {
            SettingsError::ExecutableDir(io::Error::new(
                io::ErrorKind::NotFound,
                "executable has no parent directory",
            ))
        })?;
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing or unreadable file yields the defaults.
    pub fn load(&self) -> Settings {
        match self.read_ini() {
            Some(ini) => Settings::from_ini(&ini),
            None => Settings::default(),
        }
    }

    /// Writes the three keys, keeping any other content of the file.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut ini = self.read_ini().unwrap_or_default();
        settings.write_to(&mut ini);
        ini.write_to_file(&self.path).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            "Saved settings to {} (gamma {:.2}, hotkey {})",
            self.path.display(),
            settings.gamma.value(),
            settings.hotkey
        );
        Ok(())
    }

    fn read_ini(&self) -> Option<Ini> {
        match Ini::load_from_file(&self.path) {
            Ok(ini) => Some(ini),
            Err(ini::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", self.path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}; using defaults", self.path.display(), e);
                None
            }
        }
    }
}
