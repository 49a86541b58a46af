//! Error types for usbacm.

use thiserror::Error;

/// Result type for usbacm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for usbacm operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Device descriptor does not describe a usable CDC-ACM device.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Claiming a USB interface failed.
    #[error("Failed to claim interface {interface}")]
    Claim {
        /// Interface number that could not be claimed.
        interface: u8,
    },

    /// A control transfer failed or transferred fewer bytes than requested.
    #[error("Control transfer {request:#04x} failed: result {result}")]
    ControlTransfer {
        /// Class request code.
        request: u8,
        /// Raw transfer result (bytes transferred, or negative).
        result: i32,
    },

    /// A bulk write chunk made no progress.
    #[error("Error writing {chunk} bytes at offset {offset}, length={total}")]
    Write {
        /// Size of the failed chunk.
        chunk: usize,
        /// Offset into the caller's buffer at which the chunk started.
        offset: usize,
        /// Total length of the caller's buffer.
        total: usize,
    },

    /// Operation requires an open device.
    #[error("Device is not open")]
    NotOpen,

    /// No matching USB device was found.
    #[error("Device not found")]
    DeviceNotFound,

    /// Underlying libusb error.
    #[cfg(feature = "native")]
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
}
