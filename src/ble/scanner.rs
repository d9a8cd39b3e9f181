//! Peripheral lookup.
//!
//! Most platforms only hand out a `Peripheral` after it has been seen in a
//! scan, so connecting to a known address means scanning until that address
//! shows up. The scan is unfiltered: the lamp does not necessarily
//! advertise its light service, so only the address is matched.

use btleplug::api::{BDAddr, Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};

/// How often the adapter's peripheral list is polled while locating.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Filter used while locating; advertised services are not required.
fn scan_filter() -> ScanFilter {
    ScanFilter::default()
}

/// Parse a device address such as `78:A5:04:77:D0:43`.
pub fn parse_address(address: &str) -> Result<BDAddr> {
    BDAddr::from_str(address.trim()).map_err(|_| Error::InvalidAddress {
        address: address.to_string(),
    })
}

/// Finds a lamp by its device address.
pub struct BleScanner {
    /// The BLE adapter to use for scanning.
    adapter: Adapter,
}

impl BleScanner {
    /// Create a new scanner on the first available adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self { adapter })
    }

    /// Look for the peripheral with `address`, scanning for up to `timeout`.
    pub async fn locate(&self, address: BDAddr, timeout: Duration) -> Result<Peripheral> {
        if let Some(peripheral) = self.find_known(address).await? {
            debug!("Peripheral {} already known to the adapter", address);
            return Ok(peripheral);
        }

        debug!("Scanning for {}", address);

        self.adapter
            .start_scan(scan_filter())
            .await
            .map_err(Error::Bluetooth)?;

        let found = tokio::time::timeout(timeout, async {
            loop {
                match self.find_known(address).await {
                    Ok(Some(peripheral)) => return Ok(peripheral),
                    Ok(None) => tokio::time::sleep(POLL_INTERVAL).await,
                    Err(e) => return Err(e),
                }
            }
        })
        .await;

        if let Err(e) = self.adapter.stop_scan().await {
            debug!("Failed to stop scan: {}", e);
        }

        match found {
            Ok(result) => result,
            Err(_) => Err(Error::DeviceNotFound {
                address: address.to_string(),
            }),
        }
    }

    async fn find_known(&self, address: BDAddr) -> Result<Option<Peripheral>> {
        let peripherals = self.adapter.peripherals().await.map_err(Error::Bluetooth)?;
        trace!("Adapter knows {} peripherals", peripherals.len());

        Ok(peripherals.into_iter().find(|p| p.address() == address))
    }
}
