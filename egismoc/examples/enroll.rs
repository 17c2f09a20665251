//! Enroll a finger, then identify it
//!
//! `FINGER` selects the finger (1-10, default right index) and `USER` the
//! name stored in the print identifier.

use anyhow::Context;
use egismoc::types::Finger;
use egismoc::{EgisMoc, EnrollProgress, FingerprintDriver, Print};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let finger = match std::env::var("FINGER") {
        Ok(value) => Finger::try_from(value.parse::<u8>().context("FINGER must be a number")?)?,
        Err(_) => Finger::RightIndex,
    };
    let user = std::env::var("USER").unwrap_or_else(|_| "nobody".to_string());

    let mut device = EgisMoc::usb();
    device.open().await.context("open sensor")?;

    if let Some(info) = device.device_info() {
        println!("{}", info);
    }

    let template = Print::default().with_finger(finger).with_username(user);
    println!("Touch the sensor to enroll your {}", finger);

    let print = device
        .enroll(template, &mut |progress| match progress {
            EnrollProgress::Stage { stage, total } => println!("  capture {}/{}", stage, total),
            EnrollProgress::Retry { reason, .. } => println!("  retry: {}", reason),
        })
        .await?;
    println!("Enrolled {}", print);

    println!("Touch the sensor again to identify");
    let result = device.identify(std::slice::from_ref(&print)).await?;
    match result.matched {
        Some(matched) => println!("Identified {}", matched),
        None => println!("Not identified"),
    }

    device.close().await?;
    Ok(())
}
