use crate::gamma::{compute_ramp, GammaRamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DisplayError {
    #[error("no display device context is available")]
    NoDeviceContext,
    #[error("the display device rejected the gamma ramp")]
    RampRejected,
    #[error("gamma {0} does not produce a ramp")]
    InvalidGamma(f32),
}

/// Something that can load a gamma ramp into display hardware.
pub trait GammaDevice {
    fn set_ramp(&mut self, ramp: &GammaRamp) -> Result<(), DisplayError>;
}

pub struct DisplayGammaApplier<D> {
    device: D,
}

impl<D: GammaDevice> DisplayGammaApplier<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn apply(&mut self, ramp: &GammaRamp) -> Result<(), DisplayError> {
        self.device.set_ramp(ramp)
    }

    pub fn apply_gamma(&mut self, gamma: f32) -> Result<(), DisplayError> {
        let ramp = compute_ramp(gamma).ok_or(DisplayError::InvalidGamma(gamma))?;
        self.apply(&ramp)
    }

    /// Best-effort reset to the identity ramp. Failures are logged, never returned.
    pub fn restore_neutral(&mut self) {
        match self.apply(&GammaRamp::neutral()) {
            Ok(()) => tracing::info!("Restored neutral gamma ramp"),
            Err(e) => tracing::warn!("Failed to restore neutral gamma ramp: {}", e),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}
