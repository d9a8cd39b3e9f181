//! Example: query delay and control status
//!
//! Run with: cargo run --example query_status -- 78:A5:04:77:D0:43

use yeelight_blue_ble::{Light, Result, DEFAULT_DELAY_MINUTES};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yeelight_blue_ble=debug".parse().unwrap()),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "78:A5:04:77:D0:43".to_string());

    let light = Light::connect(&address).await?;

    // Print everything the lamp pushes while we run
    let mut notifications = light.subscribe_notifications();
    tokio::spawn(async move {
        while let Ok(event) = notifications.recv().await {
            println!(
                "[{}] {} -> {:?}",
                event.received_at.format("%H:%M:%S%.3f"),
                event.characteristic_uuid,
                event.data_lossy()
            );
        }
    });

    light.delay_off(DEFAULT_DELAY_MINUTES).await?;

    match light.delay_status().await? {
        Some(event) => println!("Delay status (raw): {:?}", event.data_lossy()),
        None => println!("Delay status: no answer"),
    }

    match light.control_status_parsed().await? {
        Some(status) => println!(
            "Control status: {} at {}% (on: {})",
            status.color,
            status.brightness,
            status.is_on()
        ),
        None => println!("Control status: no answer"),
    }

    light.disconnect().await?;

    Ok(())
}
