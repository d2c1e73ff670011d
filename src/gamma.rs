use thiserror::Error;

pub const RAMP_SIZE: usize = 256;
pub const MIN_GAMMA: f32 = 0.1;
pub const MAX_GAMMA: f32 = 10.0;
pub const DEFAULT_GAMMA: f32 = 2.80;
pub const NEUTRAL_GAMMA: f32 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum GammaError {
    #[error("gamma {0} is outside the range {min}..={max}", min = MIN_GAMMA, max = MAX_GAMMA)]
    OutOfRange(f32),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// A user-chosen gamma factor, guaranteed to lie in `MIN_GAMMA..=MAX_GAMMA`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaSetting(f32);

impl GammaSetting {
    pub fn new(value: f32) -> Result<Self, GammaError> {
        if (MIN_GAMMA..=MAX_GAMMA).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GammaError::OutOfRange(value))
        }
    }

    /// Parses dialog input such as `"2.80"`.
    pub fn parse(input: &str) -> Result<Self, GammaError> {
        let trimmed = input.trim();
        let value: f32 = trimmed
            .parse()
            .map_err(|_| GammaError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }

    /// Builds a setting from the persisted integer-hundredths form.
    pub fn from_hundredths(hundredths: i64) -> Result<Self, GammaError> {
        Self::new(hundredths as f32 / 100.0)
    }

    /// Truncates to integer hundredths, so 2.805 persists as 280.
    pub fn to_hundredths(self) -> i64 {
        (self.0 * 100.0) as i64
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for GammaSetting {
    fn default() -> Self {
        Self(DEFAULT_GAMMA)
    }
}

/// One channel of a display gamma ramp. The same curve is used for red, green and blue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaRamp {
    channel: [u16; RAMP_SIZE],
}

impl GammaRamp {
    pub fn neutral() -> Self {
        Self::with_exponent(1.0)
    }

    fn with_exponent(exponent: f64) -> Self {
        let mut channel = [0u16; RAMP_SIZE];
        let last = (RAMP_SIZE - 1) as f64;

        for (i, slot) in channel.iter_mut().enumerate() {
            let level = (i as f64 / last).powf(exponent) * u16::MAX as f64;
            *slot = level.round().clamp(0.0, u16::MAX as f64) as u16;
        }

        Self { channel }
    }

    pub fn channel(&self) -> &[u16; RAMP_SIZE] {
        &self.channel
    }

    /// Red, green and blue tables back to back, as `SetDeviceGammaRamp` expects.
    pub fn to_device_layout(&self) -> [u16; RAMP_SIZE * 3] {
        let mut table = [0u16; RAMP_SIZE * 3];
        for chunk in table.chunks_exact_mut(RAMP_SIZE) {
            chunk.copy_from_slice(&self.channel);
        }
        table
    }
}

/// Computes the ramp for `gamma`. Returns `None` for non-positive or non-finite
/// factors, which have no meaningful curve.
pub fn compute_ramp(gamma: f32) -> Option<GammaRamp> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return None;
    }
    Some(GammaRamp::with_exponent(1.0 / gamma as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_gammas() -> Vec<f32> {
        let mut gammas: Vec<f32> = (1..=100).map(|i| i as f32 / 10.0).collect();
        gammas.extend([0.15, 0.33, 1.0, 2.2, 2.8, 9.99]);
        gammas
    }

    #[test]
    fn test_endpoints_fixed_for_valid_range() {
        for gamma in sample_gammas() {
            let ramp = compute_ramp(gamma).unwrap();
            assert_eq!(ramp.channel()[0], 0, "gamma {gamma}");
            assert_eq!(ramp.channel()[255], 65535, "gamma {gamma}");
        }
    }

    #[test]
    fn test_neutral_is_identity() {
        let ramp = compute_ramp(1.0).unwrap();
        for (i, value) in ramp.channel().iter().enumerate() {
            let expected = (i as f64 / 255.0 * 65535.0).round() as u16;
            assert_eq!(*value, expected);
            assert_eq!(*value as usize, i * 257);
        }
        assert_eq!(ramp, GammaRamp::neutral());
    }

    #[test]
    fn test_ramp_is_monotonic() {
        for gamma in sample_gammas() {
            let ramp = compute_ramp(gamma).unwrap();
            assert!(
                ramp.channel().windows(2).all(|pair| pair[0] <= pair[1]),
                "gamma {gamma} is not monotonic"
            );
        }
    }

    #[test]
    fn test_higher_gamma_brightens_midtones() {
        let neutral = compute_ramp(1.0).unwrap();
        let bright = compute_ramp(2.8).unwrap();
        let dark = compute_ramp(0.5).unwrap();
        assert!(bright.channel()[128] > neutral.channel()[128]);
        assert!(dark.channel()[128] < neutral.channel()[128]);
    }

    #[test]
    fn test_invalid_gamma_has_no_ramp() {
        assert!(compute_ramp(0.0).is_none());
        assert!(compute_ramp(-1.0).is_none());
        assert!(compute_ramp(f32::NAN).is_none());
        assert!(compute_ramp(f32::INFINITY).is_none());
    }

    #[test]
    fn test_device_layout_repeats_channel() {
        let ramp = compute_ramp(2.2).unwrap();
        let table = ramp.to_device_layout();
        assert_eq!(&table[..256], &ramp.channel()[..]);
        assert_eq!(&table[256..512], &ramp.channel()[..]);
        assert_eq!(&table[512..], &ramp.channel()[..]);
    }

    #[test]
    fn test_setting_range_is_inclusive() {
        assert!(GammaSetting::new(0.1).is_ok());
        assert!(GammaSetting::new(10.0).is_ok());
        assert_eq!(GammaSetting::new(0.09), Err(GammaError::OutOfRange(0.09)));
        assert_eq!(GammaSetting::new(10.01), Err(GammaError::OutOfRange(10.01)));
        assert!(GammaSetting::new(f32::NAN).is_err());
    }

    #[test]
    fn test_parse_dialog_input() {
        assert_eq!(GammaSetting::parse(" 2.50 ").unwrap().value(), 2.5);
        assert_eq!(
            GammaSetting::parse("abc"),
            Err(GammaError::NotANumber("abc".to_string()))
        );
        assert!(matches!(GammaSetting::parse("0"), Err(GammaError::OutOfRange(_))));
        assert!(matches!(GammaSetting::parse("11"), Err(GammaError::OutOfRange(_))));
    }

    #[test]
    fn test_hundredths_conversion() {
        assert_eq!(GammaSetting::from_hundredths(280).unwrap().value(), 2.8);
        assert_eq!(GammaSetting::from_hundredths(9999), Err(GammaError::OutOfRange(99.99)));
        assert!(GammaSetting::from_hundredths(5).is_err());
        assert!(GammaSetting::from_hundredths(-100).is_err());
        assert_eq!(GammaSetting::new(2.805).unwrap().to_hundredths(), 280);
    }
}
