//! USB device-handle boundary.
//!
//! The driver core never talks to the operating system directly. It is
//! handed an already-open, already-permitted connection implementing
//! [`UsbDeviceConnection`] together with a [`DeviceInfo`] descriptor view,
//! and performs all I/O through that boundary:
//!
//! ```text
//! +------------------+
//! |  CdcAcmDevice    |  interface discovery, line coding,
//! |  (driver core)   |  locked bulk read/write
//! +--------+---------+
//!          |
//!          v
//! +--------+-------------+
//! | UsbDeviceConnection  |  claim/release, control + bulk transfers
//! +--------+-------------+
//!          |
//!          v
//! +--------+---------+
//! |  rusb / libusb   |  native backend (feature "native")
//! +------------------+
//! ```
//!
//! Tests substitute a recording fake for the native backend.

#[cfg(feature = "native")]
pub mod native;

use std::time::Duration;

/// USB communications interface class (CDC control).
pub const USB_CLASS_COMM: u8 = 0x02;

/// USB CDC-data interface class.
pub const USB_CLASS_CDC_DATA: u8 = 0x0A;

/// Class-specific request type bit.
pub const USB_TYPE_CLASS: u8 = 0x20;

/// Interface-recipient request bit.
pub const USB_RECIP_INTERFACE: u8 = 0x01;

/// Descriptor view of a single USB interface.
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface number used for claim/release.
    pub number: u8,
    /// Interface class code.
    pub class: u8,
    /// Endpoint addresses in descriptor order.
    pub endpoints: Vec<u8>,
}

/// Descriptor view of a USB device, as supplied by the device manager.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// USB vendor ID.
    pub vendor_id: u16,
    /// USB product ID.
    pub product_id: u16,
    /// Interfaces of the active configuration, in descriptor order.
    pub interfaces: Vec<InterfaceInfo>,
}

impl DeviceInfo {
    /// Number of interfaces in the active configuration.
    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Descriptor view of the interface at `index`, if present.
    pub fn interface(&self, index: usize) -> Option<&InterfaceInfo> {
        self.interfaces.get(index)
    }
}

/// An already-open, already-permitted USB device connection.
///
/// Transfer results follow the libusb convention: non-negative values are
/// bytes transferred, negative values signal errors (including timeout on
/// bulk reads). Implementations must allow a bulk read and a bulk write to
/// proceed concurrently; the driver serializes same-direction calls itself.
pub trait UsbDeviceConnection: Send + Sync {
    /// Claim an interface, detaching a conflicting kernel driver first when
    /// `force` is set. Returns `false` on failure.
    fn claim_interface(&self, number: u8, force: bool) -> bool;

    /// Release a previously claimed interface. Returns `false` on failure.
    fn release_interface(&self, number: u8) -> bool;

    /// Issue a control transfer with an outgoing payload.
    fn control_transfer(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> i32;

    /// Issue a bulk IN transfer into `buf`.
    fn bulk_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> i32;

    /// Issue a bulk OUT transfer of `data`.
    fn bulk_write(&self, endpoint: u8, data: &[u8], timeout: Duration) -> i32;
}
