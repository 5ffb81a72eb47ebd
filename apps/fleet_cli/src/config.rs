use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::domain::{Car, CarStatus, Role, WalletAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wallet_address: String,
    pub role: Role,
    pub admin_address: String,
    pub fleet_file: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wallet_address: String::new(),
            role: Role::Anonymous,
            admin_address: "GADMIN".into(),
            fleet_file: "demos/fleet.cars.toml".into(),
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("fleet.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `fleet.toml` table, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("wallet_address") {
                settings.wallet_address = v.clone();
            }
            if let Some(role) = file_cfg.get("role").and_then(|v| v.parse().ok()) {
                settings.role = role;
            }
            if let Some(v) = file_cfg.get("admin_address") {
                settings.admin_address = v.clone();
            }
            if let Some(v) = file_cfg.get("fleet_file") {
                settings.fleet_file = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
    }

    if let Some(v) = env("FLEET_WALLET") {
        settings.wallet_address = v;
    }
    if let Some(v) = env("APP__WALLET_ADDRESS") {
        settings.wallet_address = v;
    }

    for key in ["FLEET_ROLE", "APP__ROLE"] {
        if let Some(role) = env(key).and_then(|v| v.parse().ok()) {
            settings.role = role;
        }
    }

    if let Some(v) = env("APP__ADMIN_ADDRESS") {
        settings.admin_address = v;
    }

    if let Some(v) = env("APP__FLEET_FILE") {
        settings.fleet_file = v;
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

#[derive(Debug, Deserialize)]
struct FleetFile {
    #[serde(default)]
    cars: Vec<FleetFileCar>,
}

#[derive(Debug, Deserialize)]
struct FleetFileCar {
    brand: String,
    model: String,
    color: String,
    passengers: u32,
    #[serde(default)]
    ac: bool,
    owner_address: String,
    price_per_day: i64,
    #[serde(default = "default_status")]
    status: CarStatus,
}

fn default_status() -> CarStatus {
    CarStatus::Available
}

/// Reads the `[[cars]]` seed list the sandbox fleet starts from.
pub fn load_fleet(path: &Path) -> Result<Vec<Car>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read fleet file '{}'", path.display()))?;
    parse_fleet(&raw).with_context(|| format!("invalid fleet file '{}'", path.display()))
}

pub fn parse_fleet(raw: &str) -> Result<Vec<Car>> {
    let file: FleetFile = toml::from_str(raw)?;
    file.cars
        .into_iter()
        .map(|car| {
            anyhow::ensure!(
                car.price_per_day >= 0,
                "price_per_day for {} must not be negative",
                car.owner_address
            );
            Ok(Car {
                brand: car.brand,
                model: car.model,
                color: car.color,
                passengers: car.passengers,
                ac: car.ac,
                owner_address: WalletAddress::new(car.owner_address),
                price_per_day: i128::from(car.price_per_day),
                status: car.status,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
