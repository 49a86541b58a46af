//! usbacm CLI - a serial terminal for USB CDC-ACM devices.
//!
//! ## Features
//!
//! - List connected CDC-ACM candidates
//! - Inspect interface/endpoint layout of a device
//! - Interactive terminal (background polling to stdout, stdin to device)
//! - One-shot payload writes
//! - Environment variable support

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;

mod commands;

/// usbacm - a serial terminal for USB CDC-ACM virtual serial ports.
///
/// Environment variables:
///   USBACM_DEVICE  - Default device selector (hex VID:PID)
///   USBACM_BAUD    - Default baud rate (default: 115200)
#[derive(Parser)]
#[command(name = "usbacm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "For more information, visit: https://github.com/usbacm/usbacm")]
struct Cli {
    /// Device to use, as a hex VID:PID pair (first CDC-ACM candidate if omitted).
    #[arg(
        short,
        long,
        global = true,
        env = "USBACM_DEVICE",
        value_name = "VID:PID",
        value_parser = parse_device_arg
    )]
    device: Option<(u16, u16)>,

    /// Baud rate.
    #[arg(
        short,
        long,
        global = true,
        default_value = "115200",
        env = "USBACM_BAUD"
    )]
    baud: u32,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List connected USB devices that look like CDC-ACM serial ports.
    List {
        /// List every USB device, not just CDC-ACM candidates.
        #[arg(long)]
        all: bool,
    },

    /// Show interface and endpoint details of the selected device.
    Info,

    /// Open an interactive terminal (device -> stdout, stdin -> device).
    Monitor {
        /// Stop-bits code (0 = 1 bit, 1 = 1.5 bits, 2 = 2 bits).
        #[arg(long, default_value = "0")]
        stop_bits: u8,

        /// Parity code (0 = none, 1 = odd, 2 = even).
        #[arg(long, default_value = "0")]
        parity: u8,

        /// Data bits per character.
        #[arg(long, default_value = "8")]
        data_bits: u8,
    },

    /// Write a single payload to the device and exit.
    Send {
        /// Payload to send (text, or hex bytes with --hex).
        data: String,

        /// Interpret the payload as hex bytes (e.g. "dead_beef" or "de ad").
        #[arg(long)]
        hex: bool,
    },
}

/// Parse a device selector in "VID:PID" hex format (0x prefixes allowed).
fn parse_device_arg(s: &str) -> Result<(u16, u16), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid format: '{s}'. Expected 'VID:PID' (e.g., '4a61:679a')"
        ));
    }
    Ok((parse_hex_u16(parts[0])?, parse_hex_u16(parts[1])?))
}

/// Parse a hexadecimal ID (supports 0x prefix).
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("Invalid hex ID: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "usbacm v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    match &cli.command {
        Commands::List { all } => commands::list::cmd_list(*all),
        Commands::Info => commands::list::cmd_info(&cli),
        Commands::Monitor {
            stop_bits,
            parity,
            data_bits,
        } => commands::monitor::cmd_monitor(&cli, *stop_bits, *parity, *data_bits),
        Commands::Send { data, hex } => commands::send::cmd_send(&cli, data, *hex),
    }
}
