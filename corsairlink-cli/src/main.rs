use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use corsairlink_lib::device::{CorsairLink, Reading};
use corsairlink_lib::transport::{DEFAULT_READ_WAIT_MS, HidBackend};
use tracing::info;

/// Print a telemetry report for a connected Corsair Link cooler.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Maximum time to wait for each command reply, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_READ_WAIT_MS)]
    timeout_ms: u32,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn stale_marker<T>(reading: &Reading<T>) -> &'static str {
    if reading.fresh { "" } else { " (stale)" }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .init();

    let backend = HidBackend::new()?;
    let mut link = CorsairLink::with_read_wait(backend, cli.timeout_ms);
    let entry = link.initialize()?;
    info!("connected with a {} ms reply wait", cli.timeout_ms);

    println!("Device found: {}", entry.name);
    if let Some(manufacturer) = link.manufacturer()? {
        println!("  Manufacturer: {manufacturer}");
    }
    if let Some(product) = link.product()? {
        println!("  Product:      {product}");
    }

    let id = link.device_id()?;
    println!("  Device id:    {:#04x}{}", id.value, stale_marker(&id));

    let firmware = link.firmware_version()?;
    println!(
        "  Firmware:     {:#06x}{}",
        firmware.value,
        stale_marker(&firmware)
    );

    let name = link.product_name()?;
    let printable = String::from_utf8_lossy(&name.value);
    println!(
        "  Product name: {}{}",
        printable.trim_end_matches('\0'),
        stale_marker(&name)
    );

    let status = link.status()?;
    println!(
        "  Status:       {:#04x}{}",
        status.value,
        stale_marker(&status)
    );

    link.close();
    Ok(())
}
