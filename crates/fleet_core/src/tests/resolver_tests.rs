use super::*;
use crate::test_support::car;
use shared::domain::WalletAddress;

#[test]
fn admin_always_gets_enabled_delete() {
    for status in [
        CarStatus::Available,
        CarStatus::Rented,
        CarStatus::Maintenance,
        CarStatus::Unknown,
    ] {
        for (balance, fee) in [(0, 0), (-5, 10), (1_000, i128::MAX)] {
            let action = resolve_row_action(Role::Admin, &car("GOWNER", status), balance, fee);
            assert_eq!(action.kind, ActionKind::Delete);
            assert!(action.enabled);
            assert_eq!(action.disabled_reason, None);
            assert_eq!(action.label, "Delete");
        }
    }
}

#[test]
fn set_fee_is_a_page_level_admin_control() {
    let action = resolve_page_action(Role::Admin);
    assert_eq!(action.kind, ActionKind::SetFee);
    assert!(action.enabled);

    for role in [Role::Owner, Role::Renter, Role::Anonymous] {
        assert_eq!(resolve_page_action(role).kind, ActionKind::None);
    }
}

#[test]
fn owner_without_funds_sees_disabled_withdraw() {
    let action = resolve_row_action(Role::Owner, &car("GOWNER", CarStatus::Available), 0, 50);
    assert_eq!(action.kind, ActionKind::Withdraw);
    assert!(action.is_rendered());
    assert!(!action.enabled);
    assert_eq!(action.disabled_reason, Some(DisabledReason::NoFundsAvailable));
    assert_eq!(action.disabled_reason.map(|r| r.as_str()), Some("no funds available"));
    assert_eq!(action.amount, Some(0));
}

#[test]
fn owner_with_rented_car_cannot_withdraw() {
    let action = resolve_row_action(Role::Owner, &car("GOWNER", CarStatus::Rented), 10, 0);
    assert_eq!(action.kind, ActionKind::Withdraw);
    assert!(!action.enabled);
    assert_eq!(action.disabled_reason.map(|r| r.as_str()), Some("car not returned"));
    assert_eq!(action.amount, Some(10));
}

#[test]
fn unreturned_car_reason_wins_over_missing_funds() {
    let action = resolve_row_action(Role::Owner, &car("GOWNER", CarStatus::Maintenance), 0, 0);
    assert_eq!(action.disabled_reason, Some(DisabledReason::CarNotReturned));
}

#[test]
fn owner_with_funds_and_returned_car_can_withdraw() {
    let action = resolve_row_action(Role::Owner, &car("GOWNER", CarStatus::Available), 25, 0);
    assert!(action.enabled);
    assert_eq!(action.disabled_reason, None);
    assert_eq!(action.amount, Some(25));
    assert_eq!(action.label, "Withdraw");
}

#[test]
fn renter_quote_covers_three_days_plus_fee() {
    let action = resolve_row_action(Role::Renter, &car("GOWNER", CarStatus::Available), 0, 50);
    assert_eq!(action.kind, ActionKind::Rent);
    assert!(action.enabled);

    let quote = action.quote.expect("quote");
    assert_eq!(quote.deposit, 3_000_000_000);
    assert_eq!(quote.admin_fee, 50);
    assert_eq!(quote.total, 3_000_000_050);
    assert_eq!(action.amount, Some(3_000_000_050));
    assert_eq!(action.label, "Rent (3000000050)");
}

#[test]
fn renter_sees_nothing_for_unavailable_cars() {
    for status in [CarStatus::Rented, CarStatus::Maintenance, CarStatus::Unknown] {
        let action = resolve_row_action(Role::Renter, &car("GOWNER", status), 0, 50);
        assert_eq!(action, ActionDescriptor::none());
        assert!(!action.is_rendered());
    }
}

#[test]
fn anonymous_role_gets_no_action() {
    let action = resolve_row_action(Role::Anonymous, &car("GOWNER", CarStatus::Available), 99, 1);
    assert_eq!(action.kind, ActionKind::None);
}

#[test]
fn resolving_twice_yields_identical_descriptors() {
    let available = car("GOWNER", CarStatus::Available);
    for role in [Role::Admin, Role::Owner, Role::Renter, Role::Anonymous] {
        let first = resolve_row_action(role, &available, 7, 3);
        let second = resolve_row_action(role, &available, 7, 3);
        assert_eq!(first, second);
    }
}

#[test]
fn huge_prices_saturate_instead_of_panicking() {
    let mut pricey = car("GOWNER", CarStatus::Available);
    pricey.price_per_day = i128::MAX / 2;
    let action = resolve_row_action(Role::Renter, &pricey, 0, 1);
    assert_eq!(action.quote.expect("quote").total, i128::MAX);
}

#[test]
fn listing_uses_each_owners_balance() {
    let mut snapshot = FleetSnapshot {
        cars: vec![
            car("GFUNDED", CarStatus::Available),
            car("GEMPTY", CarStatus::Available),
        ],
        ..FleetSnapshot::default()
    };
    snapshot.balances.insert(WalletAddress::new("GFUNDED"), 40);

    let rows = resolve_listing(&snapshot, Role::Owner);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].action.enabled);
    assert_eq!(rows[0].action.amount, Some(40));
    assert!(!rows[1].action.enabled);
    assert_eq!(rows[1].action.amount, Some(0));
}
