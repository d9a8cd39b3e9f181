//! Example: program a three-step color flow, then stop it
//!
//! Run with: cargo run --example color_flow -- 78:A5:04:77:D0:43

use std::time::Duration;
use yeelight_blue_ble::{Color, FlowStep, Light, Result};

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

    light.effect_smooth().await?;
    light
        .start_color_flow(&[
            FlowStep::new(Color::new(250, 0, 0), 50, 3),
            FlowStep::new(Color::new(0, 250, 0), 50, 3),
            FlowStep::new(Color::new(0, 0, 250), 50, 3),
        ])
        .await?;

    println!("Color flow running for 30 seconds...");
    tokio::time::sleep(Duration::from_secs(30)).await;

    light.stop_color_flow().await?;
    light.disconnect().await?;

    Ok(())
}
