use std::sync::Arc;

use super::*;
use crate::test_support::{car, FakeContract, FakeProvider};

fn fleet() -> FleetState {
    FleetState::new(vec![
        car("GALPHA", CarStatus::Available),
        car("GBRAVO", CarStatus::Rented),
        car("GCHARLIE", CarStatus::Available),
    ])
}

fn owner(address: &str) -> WalletAddress {
    WalletAddress::new(address)
}

#[tokio::test]
async fn non_owner_roles_clear_the_balance_map() {
    let contract = Arc::new(FakeContract::default().with_balance("GALPHA", 10));
    let provider = FakeProvider(contract.clone());
    let state = fleet();

    let owner_session = Session::new("GALPHA", Role::Owner);
    assert!(refresh_balances(&state, &provider, &owner_session).await);
    assert_eq!(state.balance_for(&owner("GALPHA")).await, 10);

    for role in [Role::Admin, Role::Renter, Role::Anonymous] {
        let session = Session::new("GALPHA", role);
        assert!(refresh_balances(&state, &provider, &session).await);
        assert!(state.snapshot().await.balances.is_empty());
    }
}

#[tokio::test]
async fn owner_refresh_has_an_entry_for_every_car() {
    let contract = Arc::new(
        FakeContract::default()
            .with_balance("GALPHA", 10)
            .with_balance("GCHARLIE", 30)
            .with_failing_owner("GBRAVO"),
    );
    let provider = FakeProvider(contract);
    let state = fleet();

    let session = Session::new("GALPHA", Role::Owner);
    assert!(refresh_balances(&state, &provider, &session).await);

    let balances = state.snapshot().await.balances;
    assert_eq!(balances.len(), 3);
    assert_eq!(balances[&owner("GALPHA")], 10);
    assert_eq!(balances[&owner("GBRAVO")], 0);
    assert_eq!(balances[&owner("GCHARLIE")], 30);
}

#[tokio::test]
async fn owner_refresh_defaults_everything_when_client_cannot_be_built() {
    let contract = Arc::new(FakeContract {
        fail_build: true,
        ..FakeContract::default().with_balance("GALPHA", 10)
    });
    let provider = FakeProvider(contract);
    let state = fleet();

    let session = Session::new("GALPHA", Role::Owner);
    assert!(refresh_balances(&state, &provider, &session).await);

    let balances = state.snapshot().await.balances;
    assert_eq!(balances.len(), 3);
    assert!(balances.values().all(|amount| *amount == 0));
}

#[tokio::test]
async fn admin_fee_refresh_scales_to_stroops() {
    let provider = FakeProvider(Arc::new(FakeContract::default().with_admin_fee(2)));
    let state = fleet();

    assert!(refresh_admin_fee(&state, &provider, &owner("GALPHA")).await);
    assert_eq!(state.admin_fee().await, 20_000_000);
}

#[tokio::test]
async fn admin_fee_refresh_failure_yields_zero() {
    let provider = FakeProvider(Arc::new(FakeContract::default()));
    let state = fleet();
    let ticket = state.begin_fee_refresh().await;
    assert!(state.commit_admin_fee(ticket, 500).await);

    assert!(refresh_admin_fee(&state, &provider, &owner("GALPHA")).await);
    assert_eq!(state.admin_fee().await, 0);
}

#[tokio::test]
async fn older_refresh_cannot_overwrite_newer_one() {
    let state = fleet();
    let stale = state.begin_balance_refresh().await;
    let fresh = state.begin_balance_refresh().await;

    let mut newer = HashMap::new();
    newer.insert(owner("GALPHA"), 99);
    assert!(state.commit_balances(fresh, newer).await);

    let mut older = HashMap::new();
    older.insert(owner("GALPHA"), 1);
    assert!(!state.commit_balances(stale, older).await);
    assert_eq!(state.balance_for(&owner("GALPHA")).await, 99);
}

#[tokio::test]
async fn optimistic_delete_supersedes_in_flight_refresh() {
    let state = fleet();
    let in_flight = state.begin_balance_refresh().await;

    state.remove_car(&owner("GALPHA")).await;

    let mut fetched = HashMap::new();
    fetched.insert(owner("GALPHA"), 70);
    assert!(!state.commit_balances(in_flight, fetched).await);
    assert_eq!(state.balance_for(&owner("GALPHA")).await, 0);
    assert_eq!(state.cars().await.len(), 2);
}

#[tokio::test]
async fn optimistic_fee_change_supersedes_in_flight_fee_refresh() {
    let state = fleet();
    let in_flight = state.begin_fee_refresh().await;

    state.apply_admin_fee(300).await;

    assert!(!state.commit_admin_fee(in_flight, 0).await);
    assert_eq!(state.admin_fee().await, 300);
}

#[tokio::test]
async fn fee_ticket_cannot_commit_balances() {
    let state = fleet();
    let fee_ticket = state.begin_fee_refresh().await;
    assert!(!state.commit_balances(fee_ticket, HashMap::new()).await);
}

#[tokio::test]
async fn mark_rented_touches_only_the_matching_car() {
    let state = fleet();
    state.mark_rented(&owner("GCHARLIE")).await;

    let cars = state.cars().await;
    assert_eq!(cars[0].status, CarStatus::Available);
    assert_eq!(cars[1].status, CarStatus::Rented);
    assert_eq!(cars[2].status, CarStatus::Rented);
}

#[tokio::test]
async fn replace_cars_swaps_the_collection() {
    let state = fleet();
    state
        .replace_cars(vec![car("GDELTA", CarStatus::Maintenance)])
        .await;
    let cars = state.cars().await;
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].owner_address, owner("GDELTA"));
}
