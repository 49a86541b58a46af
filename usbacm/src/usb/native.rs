//! Native USB backend using the `rusb` crate (libusb bindings).
//!
//! Provides device enumeration plus a [`UsbDeviceConnection`] implementation
//! backed by a libusb device handle. The handle lives in an `RwLock`:
//! claim/release take the write lock, transfers take the read lock, so a
//! bulk read and a bulk write can proceed concurrently as the driver's
//! concurrency contract requires.

use {
    crate::{
        error::{Error, Result},
        usb::{DeviceInfo, InterfaceInfo, UsbDeviceConnection},
    },
    log::{trace, warn},
    rusb::{Device, DeviceHandle, GlobalContext},
    std::{sync::RwLock, time::Duration},
};

/// Native USB connection wrapping a libusb device handle.
pub struct NativeConnection {
    handle: RwLock<DeviceHandle<GlobalContext>>,
}

impl NativeConnection {
    /// Wrap an already-open libusb device handle.
    pub fn new(handle: DeviceHandle<GlobalContext>) -> Self {
        Self {
            handle: RwLock::new(handle),
        }
    }
}

/// Map a libusb error to its raw negative return code.
fn transfer_error_code(err: rusb::Error) -> i32 {
    match err {
        rusb::Error::Io => -1,
        rusb::Error::InvalidParam => -2,
        rusb::Error::Access => -3,
        rusb::Error::NoDevice => -4,
        rusb::Error::NotFound => -5,
        rusb::Error::Busy => -6,
        rusb::Error::Timeout => -7,
        rusb::Error::Overflow => -8,
        rusb::Error::Pipe => -9,
        rusb::Error::Interrupted => -10,
        rusb::Error::NoMem => -11,
        rusb::Error::NotSupported => -12,
        _ => -99,
    }
}

impl UsbDeviceConnection for NativeConnection {
    fn claim_interface(&self, number: u8, force: bool) -> bool {
        let Ok(mut handle) = self.handle.write() else {
            return false;
        };

        if force {
            match handle.kernel_driver_active(number) {
                Ok(true) => {
                    if let Err(e) = handle.detach_kernel_driver(number) {
                        warn!("Failed to detach kernel driver from interface {number}: {e}");
                        return false;
                    }
                },
                Ok(false) => {},
                // Kernel driver queries are unsupported on some platforms;
                // the claim itself may still succeed.
                Err(e) => trace!("kernel_driver_active({number}): {e}"),
            }
        }

        match handle.claim_interface(number) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to claim interface {number}: {e}");
                false
            },
        }
    }

    fn release_interface(&self, number: u8) -> bool {
        let Ok(mut handle) = self.handle.write() else {
            return false;
        };
        match handle.release_interface(number) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to release interface {number}: {e}");
                false
            },
        }
    }

    fn control_transfer(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> i32 {
        let Ok(handle) = self.handle.read() else {
            return -1;
        };
        match handle.write_control(request_type, request, value, index, data, timeout) {
            Ok(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Err(e) => {
                trace!("Control transfer {request:#04x} failed: {e}");
                transfer_error_code(e)
            },
        }
    }

    fn bulk_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> i32 {
        let Ok(handle) = self.handle.read() else {
            return -1;
        };
        match handle.read_bulk(endpoint, buf, timeout) {
            Ok(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Err(e) => transfer_error_code(e),
        }
    }

    fn bulk_write(&self, endpoint: u8, data: &[u8], timeout: Duration) -> i32 {
        let Ok(handle) = self.handle.read() else {
            return -1;
        };
        match handle.write_bulk(endpoint, data, timeout) {
            Ok(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Err(e) => {
                trace!("Bulk write to {endpoint:#04x} failed: {e}");
                transfer_error_code(e)
            },
        }
    }
}

/// A USB device found during enumeration.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Descriptor view of the device.
    pub info: DeviceInfo,
    /// Bus the device is attached to.
    pub bus_number: u8,
    /// Address on that bus.
    pub address: u8,
}

/// Build the descriptor view the driver core consumes.
fn describe(device: &Device<GlobalContext>) -> Result<DeviceInfo> {
    let descriptor = device.device_descriptor()?;
    let config = device
        .active_config_descriptor()
        .or_else(|_| device.config_descriptor(0))?;

    let mut interfaces = Vec::new();
    for interface in config.interfaces() {
        if let Some(desc) = interface.descriptors().next() {
            interfaces.push(InterfaceInfo {
                number: interface.number(),
                class: desc.class_code(),
                endpoints: desc.endpoint_descriptors().map(|e| e.address()).collect(),
            });
        }
    }

    Ok(DeviceInfo {
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        interfaces,
    })
}

/// List all USB devices whose descriptors could be read.
pub fn list_devices() -> Result<Vec<DiscoveredDevice>> {
    let mut result = Vec::new();

    for device in rusb::devices()?.iter() {
        match describe(&device) {
            Ok(info) => result.push(DiscoveredDevice {
                info,
                bus_number: device.bus_number(),
                address: device.address(),
            }),
            Err(e) => trace!(
                "Skipping device {}.{}: {e}",
                device.bus_number(),
                device.address()
            ),
        }
    }

    Ok(result)
}

/// Open the first device matching the given VID/PID.
pub fn open_device(vendor_id: u16, product_id: u16) -> Result<(DeviceInfo, NativeConnection)> {
    for device in rusb::devices()?.iter() {
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };
        if descriptor.vendor_id() != vendor_id || descriptor.product_id() != product_id {
            continue;
        }

        let info = describe(&device)?;
        let handle = device.open()?;
        trace!(
            "Opened {vendor_id:04x}:{product_id:04x} at {}.{}",
            device.bus_number(),
            device.address()
        );
        return Ok((info, NativeConnection::new(handle)));
    }

    Err(Error::DeviceNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_code_timeout_is_negative() {
        assert_eq!(transfer_error_code(rusb::Error::Timeout), -7);
        assert!(transfer_error_code(rusb::Error::Pipe) < 0);
    }

    #[test]
    fn test_list_devices() {
        // Enumeration must not panic even without any devices attached.
        let _ = list_devices();
    }
}
