//! Serial device contract and device-type matching.
//!
//! [`SerialDevice`] is the capability every USB-serial variant implements:
//! open/close lifecycle, locked read/write, live line-parameter updates and
//! listener registration. The CDC-ACM driver in [`crate::acm`] is the one
//! concrete variant today; further chipsets would slot in behind the same
//! trait, selected by [`DeviceType`].

use crate::error::Result;
use crate::usb::{DeviceInfo, USB_CLASS_CDC_DATA, USB_CLASS_COMM, UsbDeviceConnection};
use std::sync::Arc;
use std::time::Duration;

/// Default size of the reusable read scratch buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 16 * 1024;

/// Default size of the reusable write scratch buffer.
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 16 * 1024;

/// Callback contract for data delivered by the polling loop.
///
/// Invoked from the polling loop's thread, once per non-empty aggregated
/// read. Implementations must not block for long; a stalled listener stalls
/// polling.
pub trait SerialDeviceListener: Send + Sync {
    /// Called with a freshly read, exactly-sized chunk of device data.
    fn on_data_read(&self, data: &[u8]);
}

/// Kinds of USB-serial devices this crate can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// USB CDC-ACM (abstract control model) virtual serial port.
    CdcAcm,
    /// Unrecognized device.
    Unknown,
}

/// Known VID/PID pairs of CDC-ACM devices.
const KNOWN_SERIAL_DEVICES: &[(u16, u16, DeviceType)] = &[
    // Shupito v2.0
    (0x4a61, 0x679a, DeviceType::CdcAcm),
];

impl DeviceType {
    /// Look up a device type by its VID/PID pair.
    #[must_use]
    pub fn from_vid_pid(vid: u16, pid: u16) -> Self {
        for (known_vid, known_pid, device) in KNOWN_SERIAL_DEVICES {
            if vid == *known_vid && pid == *known_pid {
                return *device;
            }
        }
        Self::Unknown
    }

    /// Classify a device from its full descriptor view.
    ///
    /// The VID/PID table wins; otherwise a device whose first two interfaces
    /// carry the communications and CDC-data classes is treated as CDC-ACM.
    #[must_use]
    pub fn match_device(info: &DeviceInfo) -> Self {
        let matched = Self::from_vid_pid(info.vendor_id, info.product_id);
        if matched.is_known() {
            return matched;
        }

        let classes = (
            info.interface(0).map(|i| i.class),
            info.interface(1).map(|i| i.class),
        );
        if classes == (Some(USB_CLASS_COMM), Some(USB_CLASS_CDC_DATA)) {
            return Self::CdcAcm;
        }

        Self::Unknown
    }

    /// Human-readable name for the device type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CdcAcm => "CDC-ACM",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether this is a recognized, drivable device type.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Contract for a USB-serial device driver.
///
/// A single in-flight read and a single in-flight write may proceed
/// concurrently; same-direction calls are serialized by the implementation's
/// per-direction locks.
pub trait SerialDevice: Send + Sync {
    /// The variant implementing this device.
    fn device_type(&self) -> DeviceType;

    /// Whether the device has been opened successfully.
    fn is_open(&self) -> bool;

    /// Claim interfaces, resolve endpoints and apply default line
    /// parameters. Idempotent when already open; all-or-nothing on failure.
    fn open(&mut self) -> Result<()>;

    /// Stop polling, release claimed interfaces and mark the device closed.
    /// Idempotent; never fails.
    fn close(&mut self);

    /// Read up to `dest.len()` bytes, returning 0 on timeout.
    fn read(&self, dest: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Write all of `src`, chunked at the internal buffer size, blocking
    /// until everything is transmitted or a chunk fails.
    fn write(&self, src: &[u8], timeout: Duration) -> Result<usize>;

    /// Set the baud rate and push the new line coding to the device.
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()>;

    /// Set the stop-bits code and push the new line coding to the device.
    fn set_stop_bits(&mut self, stop_bits: u8) -> Result<()>;

    /// Set the parity code and push the new line coding to the device.
    fn set_parity(&mut self, parity: u8) -> Result<()>;

    /// Set the data-bits count and push the new line coding to the device.
    fn set_data_bits(&mut self, data_bits: u8) -> Result<()>;

    /// Register a listener and ensure the background polling loop runs.
    /// Calling this on an already-polling device only swaps the listener.
    fn start_polling(&mut self, listener: &Arc<dyn SerialDeviceListener>) -> Result<()>;

    /// Stop the polling loop, blocking until its thread has exited.
    /// No delivery happens after this returns.
    fn stop_polling(&mut self);

    /// Register or clear the listener. Clearing stops the polling loop;
    /// setting one starts it if needed.
    fn set_listener(&mut self, listener: Option<&Arc<dyn SerialDeviceListener>>) -> Result<()>;
}

/// Resolve a matched device to a ready-to-open driver instance.
///
/// Returns `None` when the descriptor does not match any supported type.
pub fn create_device<C>(info: DeviceInfo, conn: C) -> Option<Box<dyn SerialDevice>>
where
    C: UsbDeviceConnection + 'static,
{
    match DeviceType::match_device(&info) {
        DeviceType::CdcAcm => Some(Box::new(crate::acm::CdcAcmDevice::new(info, conn))),
        DeviceType::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usb::InterfaceInfo;
    use crate::usb::fake::{FakeConnection, acm_device_info};

    #[test]
    fn test_device_type_from_vid_pid() {
        assert_eq!(DeviceType::from_vid_pid(0x4a61, 0x679a), DeviceType::CdcAcm);
        assert_eq!(DeviceType::from_vid_pid(0x1234, 0x5678), DeviceType::Unknown);
    }

    #[test]
    fn test_match_device_by_interface_classes() {
        let mut info = acm_device_info();
        info.vendor_id = 0x1234;
        info.product_id = 0x5678;
        assert_eq!(DeviceType::match_device(&info), DeviceType::CdcAcm);
    }

    #[test]
    fn test_match_device_rejects_wrong_classes() {
        let info = DeviceInfo {
            vendor_id: 0x1234,
            product_id: 0x5678,
            interfaces: vec![InterfaceInfo {
                number: 0,
                class: 0x03,
                endpoints: vec![0x81],
            }],
        };
        assert_eq!(DeviceType::match_device(&info), DeviceType::Unknown);
    }

    #[test]
    fn test_create_device_for_acm_descriptor() {
        let dev = create_device(acm_device_info(), FakeConnection::new());
        assert_eq!(dev.unwrap().device_type(), DeviceType::CdcAcm);
    }

    #[test]
    fn test_create_device_rejects_unknown() {
        let info = DeviceInfo {
            vendor_id: 0x1234,
            product_id: 0x5678,
            interfaces: Vec::new(),
        };
        assert!(create_device(info, FakeConnection::new()).is_none());
    }
}
