use std::collections::HashMap;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn missing_file_and_env_keep_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("fleet.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.role, Role::Anonymous);
    assert_eq!(settings.fleet_file, "demos/fleet.cars.toml");
}

#[test]
fn default_fleet_file_is_the_bundled_demo() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(Settings::default().fleet_file);
    let cars = load_fleet(&path).expect("bundled demo fleet");
    assert!(!cars.is_empty());
}

#[test]
fn file_values_apply_and_env_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fleet.toml");
    fs::write(
        &path,
        "wallet_address = \"GFILE\"\nrole = \"owner\"\nfleet_file = \"cars.toml\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, env_from(&[]));
    assert_eq!(settings.wallet_address, "GFILE");
    assert_eq!(settings.role, Role::Owner);
    assert_eq!(settings.fleet_file, "cars.toml");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("FLEET_WALLET", "GENV"),
            ("APP__ROLE", "ADMIN"),
            ("APP__LOG_FILTER", "debug"),
        ]),
    );
    assert_eq!(settings.wallet_address, "GENV");
    assert_eq!(settings.role, Role::Admin);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn unknown_role_values_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(
        &dir.path().join("fleet.toml"),
        env_from(&[("FLEET_ROLE", "pilot")]),
    );
    assert_eq!(settings.role, Role::Anonymous);
}

#[test]
fn fleet_file_parses_cars() {
    let cars = parse_fleet(
        r#"
[[cars]]
brand = "Toyota"
model = "Corolla"
color = "Red"
passengers = 5
ac = true
owner_address = "GOWNER"
price_per_day = 100

[[cars]]
brand = "Fiat"
model = "500"
color = "White"
passengers = 4
owner_address = "GOTHER"
price_per_day = 40
status = "MAINTENANCE"
"#,
    )
    .expect("parse fleet");

    assert_eq!(cars.len(), 2);
    assert_eq!(cars[0].owner_address, WalletAddress::new("GOWNER"));
    assert_eq!(cars[0].price_per_day, 100);
    assert_eq!(cars[0].status, CarStatus::Available);
    assert!(!cars[1].ac);
    assert_eq!(cars[1].status, CarStatus::Maintenance);
}

#[test]
fn negative_prices_are_rejected() {
    let err = parse_fleet(
        r#"
[[cars]]
brand = "Fiat"
model = "500"
color = "White"
passengers = 4
owner_address = "GOWNER"
price_per_day = -1
"#,
    )
    .expect_err("negative price");
    assert!(err.to_string().contains("must not be negative"));
}

#[test]
fn load_fleet_names_the_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_fleet(&dir.path().join("absent.toml")).expect_err("missing file");
    assert!(format!("{err:#}").contains("absent.toml"));
}
