use crate::display::{DisplayError, GammaDevice};
use crate::gamma::GammaRamp;
use std::ffi::c_void;
use windows::Win32::Graphics::Gdi::{GetDC, ReleaseDC};
use windows::Win32::UI::ColorSystem::SetDeviceGammaRamp;

/// The screen device context of the primary display.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenGammaDevice;

impl GammaDevice for ScreenGammaDevice {
    fn set_ramp(&mut self, ramp: &GammaRamp) -> Result<(), DisplayError> {
        let table = ramp.to_device_layout();

        unsafe {
            let hdc = GetDC(None);
            if hdc.is_invalid() {
                return Err(DisplayError::NoDeviceContext);
            }

            let accepted = SetDeviceGammaRamp(hdc, table.as_ptr() as *const c_void).as_bool();
            let _ = ReleaseDC(None, hdc);

            if accepted {
                Ok(())
            } else {
                Err(DisplayError::RampRejected)
            }
        }
    }
}
