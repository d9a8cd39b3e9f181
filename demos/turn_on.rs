//! Basic example: turn a lamp on, change its color, and turn it off
//!
//! Run with: cargo run --example turn_on -- 78:A5:04:77:D0:43

use std::time::Duration;
use yeelight_blue_ble::{Color, Light, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yeelight_blue_ble=info".parse().unwrap()),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "78:A5:04:77:D0:43".to_string());

    println!("Connecting to {}...", address);
    let light = Light::connect(&address).await?;

    light.turn_on(100).await?;
    tokio::time::sleep(Duration::from_secs(3)).await;

    for (color, brightness) in [
        (Color::new(100, 25, 25), 30),
        (Color::new(25, 100, 25), 50),
        (Color::new(25, 25, 100), 70),
    ] {
        println!("Setting {} at {}%", color, brightness);
        light.set_color(color, brightness).await?;
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    light.turn_off().await?;
    light.disconnect().await?;

    Ok(())
}
