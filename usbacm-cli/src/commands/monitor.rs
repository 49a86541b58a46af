//! Interactive terminal command.
//!
//! The library's polling loop carries device output to stdout; the main
//! thread forwards stdin lines to the device. Ctrl+C or EOF exits after
//! stopping the poller and closing the device.

use anyhow::{Context, Result};
use std::io::{self, BufRead as _, Write as _};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use usbacm::SerialDeviceListener;

use crate::Cli;

/// Timeout for each stdin-line write to the device.
const WRITE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Listener passing device bytes straight to stdout.
struct StdoutListener;

impl SerialDeviceListener for StdoutListener {
    fn on_data_read(&self, data: &[u8]) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(data);
        let _ = stdout.flush();
    }
}

/// Run the interactive terminal.
pub(crate) fn cmd_monitor(cli: &Cli, stop_bits: u8, parity: u8, data_bits: u8) -> Result<()> {
    let mut dev = super::open_target(cli)?;
    dev.open().context("Failed to open device")?;

    dev.set_baud_rate(cli.baud)?;
    if stop_bits != 0 {
        dev.set_stop_bits(stop_bits)?;
    }
    if parity != 0 {
        dev.set_parity(parity)?;
    }
    if data_bits != 8 {
        dev.set_data_bits(data_bits)?;
    }

    let listener: Arc<dyn SerialDeviceListener> = Arc::new(StdoutListener);
    dev.start_polling(&listener)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl+C handler")?;
    }

    eprintln!("Connected at {} baud. Ctrl+C or Ctrl+D to exit.", cli.baud);

    let stdin = io::stdin();
    let mut line = String::new();
    while running.load(Ordering::SeqCst) {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                dev.write(line.as_bytes(), WRITE_TIMEOUT)
                    .context("Write to device failed")?;
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e).context("Failed to read stdin"),
        }
    }

    dev.stop_polling();
    dev.close();
    eprintln!("Disconnected.");
    Ok(())
}
