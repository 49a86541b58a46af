//! Device enumeration and inspection commands.

use anyhow::{Context, Result, bail};
use usbacm::{DeviceType, DiscoveredDevice};

use crate::Cli;

/// List connected devices, restricted to CDC-ACM candidates unless `all`.
pub(crate) fn cmd_list(all: bool) -> Result<()> {
    let devices = usbacm::list_devices().context("Failed to enumerate USB devices")?;

    let mut shown = 0;
    for dev in &devices {
        let matched = DeviceType::match_device(&dev.info);
        if !all && !matched.is_known() {
            continue;
        }
        println!(
            "bus {:03} addr {:03}  {:04x}:{:04x}  {:<8} {} interface(s)",
            dev.bus_number,
            dev.address,
            dev.info.vendor_id,
            dev.info.product_id,
            matched.name(),
            dev.info.interface_count()
        );
        shown += 1;
    }

    if shown == 0 {
        eprintln!("No CDC-ACM candidates found (use --all to list every device).");
    }
    Ok(())
}

/// Print the interface/endpoint layout of the selected device.
pub(crate) fn cmd_info(cli: &Cli) -> Result<()> {
    let devices = usbacm::list_devices().context("Failed to enumerate USB devices")?;

    let dev: &DiscoveredDevice = match cli.device {
        Some((vid, pid)) => devices
            .iter()
            .find(|d| d.info.vendor_id == vid && d.info.product_id == pid)
            .with_context(|| format!("Device {vid:04x}:{pid:04x} not found"))?,
        None => match devices
            .iter()
            .find(|d| DeviceType::match_device(&d.info).is_known())
        {
            Some(d) => d,
            None => bail!("No CDC-ACM device found; specify one with --device VID:PID"),
        },
    };

    println!(
        "Device {:04x}:{:04x} (bus {:03}, addr {:03})",
        dev.info.vendor_id, dev.info.product_id, dev.bus_number, dev.address
    );
    println!("Type: {}", DeviceType::match_device(&dev.info).name());
    for iface in &dev.info.interfaces {
        println!("  interface {} (class {:#04x})", iface.number, iface.class);
        for endpoint in &iface.endpoints {
            let direction = if endpoint & 0x80 != 0 { "IN" } else { "OUT" };
            println!("    endpoint {endpoint:#04x} ({direction})");
        }
    }
    Ok(())
}
