//! One-shot payload write command.

use anyhow::{Context, Result, bail};
use std::time::Duration;

use crate::Cli;

/// Timeout for the payload write.
const WRITE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Write a single payload to the device.
pub(crate) fn cmd_send(cli: &Cli, data: &str, hex: bool) -> Result<()> {
    let payload = if hex {
        parse_hex_payload(data)?
    } else {
        data.as_bytes().to_vec()
    };
    if payload.is_empty() {
        bail!("Nothing to send");
    }

    let mut dev = super::open_target(cli)?;
    dev.open().context("Failed to open device")?;
    dev.set_baud_rate(cli.baud)?;

    let written = dev
        .write(&payload, WRITE_TIMEOUT)
        .context("Write to device failed")?;
    println!("Sent {written} byte(s).");

    dev.close();
    Ok(())
}

/// Parse a hex payload, ignoring whitespace and underscore separators.
fn parse_hex_payload(data: &str) -> Result<Vec<u8>> {
    let digits: String = data
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if digits.len() % 2 != 0 {
        bail!("Hex payload has an odd number of digits");
    }

    let mut payload = Vec::with_capacity(digits.len() / 2);
    for i in (0..digits.len()).step_by(2) {
        let byte = u8::from_str_radix(&digits[i..i + 2], 16)
            .with_context(|| format!("Invalid hex byte '{}'", &digits[i..i + 2]))?;
        payload.push(byte);
    }
    Ok(payload)
}
