//! Input device lookup.
//!
//! Devices are addressed as "default", a numeric index from `micwave list-devices`,
//! or an exact device name.

use cpal::traits::{DeviceTrait, HostTrait};

use super::CaptureError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Keyword selecting the host's default input device.
pub const DEFAULT_DEVICE: &str = "default";

/// Input devices in the order `micwave list-devices` numbers them.
///
/// Devices that cannot report a name are skipped, so an index always refers to
/// the same entry in the listing and in device selection.
pub fn input_devices(host: &cpal::Host) -> Result<Vec<cpal::Device>, CaptureError> {
    Ok(host
        .input_devices()?
        .filter(|device| device.name().is_ok())
        .collect())
}

/// Resolves a device selector against the host's input devices.
///
/// # Errors
/// - If no default device exists
/// - If the index is out of range or the name is unknown
/// - If device enumeration fails
pub fn resolve_input_device(
    host: &cpal::Host,
    device_spec: &str,
) -> Result<cpal::Device, CaptureError> {
    if device_spec == DEFAULT_DEVICE {
        return host.default_input_device().ok_or(CaptureError::NoDevice);
    }

    if let Ok(index) = device_spec.parse::<usize>() {
        return select_by_index(input_devices(host)?, index);
    }

    input_devices(host)?
        .into_iter()
        .find(|device| device.name().is_ok_and(|name| name == device_spec))
        .ok_or_else(|| CaptureError::DeviceNotFound(device_spec.to_string()))
}

/// Picks the entry at `index` from a device listing.
fn select_by_index<T>(mut devices: Vec<T>, index: usize) -> Result<T, CaptureError> {
    let count = devices.len();
    if index < count {
        return Ok(devices.swap_remove(index));
    }
    if count == 0 {
        return Err(CaptureError::NoDevice);
    }
    Err(CaptureError::IndexOutOfRange {
        index,
        max: count - 1,
    })
}

/// Temporarily redirects stderr to /dev/null to keep ALSA probing noise off the terminal.
#[cfg(target_os = "linux")]
pub fn suppress_backend_noise<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    let dev_null = OpenOptions::new().write(true).open("/dev/null")?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(std::io::Error::last_os_error().into());
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(old_stderr) };
        return Err(err.into());
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// No ALSA outside Linux; runs `f` directly.
#[cfg(not(target_os = "linux"))]
pub fn suppress_backend_noise<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_selects_listed_entry() {
        let listed = vec!["Built-in Mic", "USB Mic", "Loopback"];
        assert_eq!(select_by_index(listed.clone(), 0).unwrap(), "Built-in Mic");
        assert_eq!(select_by_index(listed.clone(), 2).unwrap(), "Loopback");
        assert_eq!(select_by_index(listed, 1).unwrap(), "USB Mic");
    }

    #[test]
    fn test_index_counts_only_named_devices() {
        let enumerated = vec![Some("Built-in Mic"), None, Some("USB Mic"), Some("Loopback")];
        let listed: Vec<_> = enumerated.into_iter().flatten().collect();
        assert_eq!(select_by_index(listed, 2).unwrap(), "Loopback");
    }

    #[test]
    fn test_index_past_end_reports_range() {
        let err = select_by_index(vec!["Built-in Mic", "USB Mic"], 5).unwrap_err();
        assert!(matches!(err, CaptureError::IndexOutOfRange { index: 5, max: 1 }));
    }

    #[test]
    fn test_index_into_empty_listing_is_no_device() {
        let err = select_by_index(Vec::<&str>::new(), 0).unwrap_err();
        assert!(matches!(err, CaptureError::NoDevice));
    }
}
