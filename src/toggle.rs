use crate::gamma::{GammaSetting, NEUTRAL_GAMMA};

/// Which gamma is currently applied to the display. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Neutral,
    Custom,
}

impl ToggleState {
    pub fn flip(&mut self) -> Self {
        *self = match self {
            Self::Neutral => Self::Custom,
            Self::Custom => Self::Neutral,
        };
        *self
    }

    pub fn is_custom(self) -> bool {
        self == Self::Custom
    }

    pub fn applied_gamma(self, target: GammaSetting) -> f32 {
        match self {
            Self::Neutral => NEUTRAL_GAMMA,
            Self::Custom => target.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_neutral() {
        assert_eq!(ToggleState::default(), ToggleState::Neutral);
    }

    #[test]
    fn test_double_flip_returns_to_neutral() {
        let mut state = ToggleState::default();
        assert_eq!(state.flip(), ToggleState::Custom);
        assert_eq!(state.flip(), ToggleState::Neutral);
    }

    #[test]
    fn test_applied_gamma_follows_state() {
        let target = GammaSetting::new(2.2).unwrap();
        assert_eq!(ToggleState::Neutral.applied_gamma(target), 1.0);
        assert_eq!(ToggleState::Custom.applied_gamma(target), 2.2);
    }
}
