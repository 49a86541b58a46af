//! # usbacm
//!
//! A USB CDC-ACM (virtual serial port) client driver.
//!
//! This crate drives the host side of a CDC-ACM device: it claims the
//! communications and data interfaces, configures line parameters (baud
//! rate, stop bits, parity, data bits) through the SET_LINE_CODING control
//! request, and performs buffered bulk read/write, with an optional
//! background polling loop that delivers newly arrived bytes to a
//! registered listener.
//!
//! ## Architecture
//!
//! - [`usb`]: the device-handle boundary ([`UsbDeviceConnection`],
//!   [`DeviceInfo`]) plus the rusb-backed native implementation
//! - [`device`]: the [`SerialDevice`] contract, listener callback and
//!   device-type matching
//! - [`acm`]: the CDC-ACM driver implementing the contract
//! - [`poll`]: the background polling loop
//!
//! ## Features
//!
//! - `native` (default): USB access via `rusb`/libusb on Linux, macOS and
//!   Windows. Without it the crate still builds for use with a custom
//!   [`UsbDeviceConnection`] implementation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use usbacm::{CdcAcmDevice, SerialDevice};
//!
//! fn main() -> usbacm::Result<()> {
//!     let (info, conn) = usbacm::usb::native::open_device(0x4a61, 0x679a)?;
//!     let mut dev = CdcAcmDevice::new(info, conn);
//!
//!     dev.open()?;
//!     dev.set_baud_rate(9600)?;
//!     dev.write(b"hello", Duration::from_millis(500))?;
//!
//!     let mut buf = [0u8; 64];
//!     let n = dev.read(&mut buf, Duration::from_millis(500))?;
//!     println!("read {n} bytes");
//!
//!     dev.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acm;
pub mod device;
pub mod error;
pub mod poll;
pub mod usb;

// Native-specific re-exports
#[cfg(feature = "native")]
pub use usb::native::{DiscoveredDevice, NativeConnection, list_devices, open_device};
// Re-exports for convenience
pub use {
    acm::{CdcAcmDevice, LineCoding},
    device::{
        DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE, DeviceType, SerialDevice,
        SerialDeviceListener, create_device,
    },
    error::{Error, Result},
    poll::{POLL_BUFFER_WINDOW, POLL_INTERVAL, PollSource, PollingLoop},
    usb::{DeviceInfo, InterfaceInfo, UsbDeviceConnection},
};
