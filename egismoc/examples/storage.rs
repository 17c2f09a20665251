//! List prints stored on the sensor
//!
//! Pass `--clear` to wipe the storage afterwards.

use egismoc::{EgisMoc, Error, FingerprintDriver};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clear = std::env::args().any(|arg| arg == "--clear");

    let mut device = EgisMoc::usb();
    device.open().await?;

    let prints = device.list().await?;
    println!("{} prints stored", prints.len());
    for print in &prints {
        println!(
            "  {:<10} {:<12} {}",
            print.finger.name(),
            print.username.as_deref().unwrap_or("-"),
            print.description.as_deref().unwrap_or_default()
        );
    }

    if clear {
        match device.clear_storage().await {
            Ok(()) => println!("Storage cleared"),
            Err(Error::DataNotFound) => println!("Nothing to clear"),
            Err(e) => return Err(e.into()),
        }
    }

    device.close().await?;
    Ok(())
}
