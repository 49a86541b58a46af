//! Command implementations.
//!
//! Each subcommand is implemented in its own module for clean separation.

pub(crate) mod list;
pub(crate) mod monitor;
pub(crate) mod send;

use anyhow::{Context, Result, bail};
use log::info;
use usbacm::{DeviceType, SerialDevice};

use crate::Cli;

/// Resolve the CLI's device selector to a ready-to-open driver.
pub(crate) fn open_target(cli: &Cli) -> Result<Box<dyn SerialDevice>> {
    let (vid, pid) = match cli.device {
        Some(pair) => pair,
        None => auto_detect()?,
    };

    let (info, conn) = usbacm::open_device(vid, pid)
        .with_context(|| format!("Failed to open device {vid:04x}:{pid:04x}"))?;
    usbacm::create_device(info, conn)
        .with_context(|| format!("Device {vid:04x}:{pid:04x} is not a supported serial device"))
}

/// Pick the first connected device that matches a supported type.
fn auto_detect() -> Result<(u16, u16)> {
    for dev in usbacm::list_devices().context("Failed to enumerate USB devices")? {
        let matched = DeviceType::match_device(&dev.info);
        if matched.is_known() {
            info!(
                "Auto-detected {} device {:04x}:{:04x}",
                matched.name(),
                dev.info.vendor_id,
                dev.info.product_id
            );
            return Ok((dev.info.vendor_id, dev.info.product_id));
        }
    }
    bail!("No CDC-ACM device found; specify one with --device VID:PID")
}
