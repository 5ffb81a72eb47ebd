//! In-memory fleet view: cars, owner balances, admin fee and the last
//! confirmed transaction.
//!
//! Balances and the admin fee each carry a version. Every refresh start and
//! every optimistic write bumps the version of its area; a refresh only
//! commits if no newer write happened while it was in flight.

use std::collections::HashMap;

use futures::future::join_all;
use shared::{
    domain::{Car, CarStatus, Role, Session, WalletAddress, STROOP_SCALE},
    protocol::TxHash,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{fee_editor::FeeEditor, ContractClientProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshArea {
    Balances,
    AdminFee,
}

/// Proof that a refresh started at a given version of its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    area: RefreshArea,
    version: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetSnapshot {
    pub cars: Vec<Car>,
    pub balances: HashMap<WalletAddress, i128>,
    pub admin_fee: i128,
    pub last_tx_hash: Option<TxHash>,
    pub fee_editor: FeeEditor,
}

impl FleetSnapshot {
    pub fn balance_for(&self, owner: &WalletAddress) -> i128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}

#[derive(Default)]
struct FleetInner {
    view: FleetSnapshot,
    balances_version: u64,
    fee_version: u64,
}

impl FleetInner {
    fn bump(&mut self, area: RefreshArea) -> u64 {
        let version = match area {
            RefreshArea::Balances => &mut self.balances_version,
            RefreshArea::AdminFee => &mut self.fee_version,
        };
        *version += 1;
        *version
    }

    fn current(&self, area: RefreshArea) -> u64 {
        match area {
            RefreshArea::Balances => self.balances_version,
            RefreshArea::AdminFee => self.fee_version,
        }
    }
}

#[derive(Default)]
pub struct FleetState {
    inner: RwLock<FleetInner>,
}

impl FleetState {
    pub fn new(cars: Vec<Car>) -> Self {
        Self {
            inner: RwLock::new(FleetInner {
                view: FleetSnapshot {
                    cars,
                    ..FleetSnapshot::default()
                },
                ..FleetInner::default()
            }),
        }
    }

    pub async fn snapshot(&self) -> FleetSnapshot {
        self.inner.read().await.view.clone()
    }

    pub async fn cars(&self) -> Vec<Car> {
        self.inner.read().await.view.cars.clone()
    }

    pub async fn balance_for(&self, owner: &WalletAddress) -> i128 {
        self.inner.read().await.view.balance_for(owner)
    }

    pub async fn admin_fee(&self) -> i128 {
        self.inner.read().await.view.admin_fee
    }

    pub async fn last_tx_hash(&self) -> Option<TxHash> {
        self.inner.read().await.view.last_tx_hash.clone()
    }

    /// Replaces the car collection with a freshly fetched one.
    pub async fn replace_cars(&self, cars: Vec<Car>) {
        self.inner.write().await.view.cars = cars;
    }

    pub async fn begin_balance_refresh(&self) -> RefreshTicket {
        self.begin(RefreshArea::Balances).await
    }

    pub async fn begin_fee_refresh(&self) -> RefreshTicket {
        self.begin(RefreshArea::AdminFee).await
    }

    async fn begin(&self, area: RefreshArea) -> RefreshTicket {
        let version = self.inner.write().await.bump(area);
        RefreshTicket { area, version }
    }

    /// Replaces the whole balance map unless a newer write superseded the
    /// ticket. Returns whether the map was committed.
    pub async fn commit_balances(
        &self,
        ticket: RefreshTicket,
        balances: HashMap<WalletAddress, i128>,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if !Self::is_current(&inner, ticket, RefreshArea::Balances) {
            return false;
        }
        inner.view.balances = balances;
        true
    }

    pub async fn commit_admin_fee(&self, ticket: RefreshTicket, fee: i128) -> bool {
        let mut inner = self.inner.write().await;
        if !Self::is_current(&inner, ticket, RefreshArea::AdminFee) {
            return false;
        }
        inner.view.admin_fee = fee;
        true
    }

    fn is_current(inner: &FleetInner, ticket: RefreshTicket, area: RefreshArea) -> bool {
        let current = inner.current(area);
        if ticket.area != area || ticket.version != current {
            debug!(
                ?area,
                ticket_version = ticket.version,
                current_version = current,
                "fleet: discarding stale refresh"
            );
            return false;
        }
        true
    }

    pub(crate) async fn remove_car(&self, owner: &WalletAddress) {
        let mut inner = self.inner.write().await;
        inner.view.cars.retain(|car| &car.owner_address != owner);
        inner.view.balances.insert(owner.clone(), 0);
        inner.bump(RefreshArea::Balances);
    }

    /// Marks the car owned by `owner` as rented. Other cars are untouched.
    pub(crate) async fn mark_rented(&self, owner: &WalletAddress) {
        let mut inner = self.inner.write().await;
        for car in inner
            .view
            .cars
            .iter_mut()
            .filter(|car| &car.owner_address == owner)
        {
            car.status = CarStatus::Rented;
        }
    }

    pub(crate) async fn apply_admin_fee(&self, fee: i128) {
        let mut inner = self.inner.write().await;
        inner.view.admin_fee = fee;
        inner.view.fee_editor.finish();
        inner.bump(RefreshArea::AdminFee);
    }

    pub(crate) async fn record_tx_hash(&self, hash: TxHash) {
        self.inner.write().await.view.last_tx_hash = Some(hash);
    }

    /// Supersedes any balance refresh still in flight without touching the map.
    pub(crate) async fn invalidate_balances(&self) {
        self.inner.write().await.bump(RefreshArea::Balances);
    }

    pub async fn open_fee_editor(&self) {
        self.inner.write().await.view.fee_editor.open();
    }

    pub async fn close_fee_editor(&self) {
        self.inner.write().await.view.fee_editor.close();
    }

    pub async fn set_fee_input(&self, value: impl Into<String>) {
        self.inner.write().await.view.fee_editor.set_input(value);
    }

    pub async fn fee_editor(&self) -> FeeEditor {
        self.inner.read().await.view.fee_editor.clone()
    }
}

/// Reloads owner balances for the session's role.
///
/// Only owners see balances; every other role gets an empty map. Each car is
/// fetched concurrently and a failed fetch counts as a zero balance for that
/// owner alone. Returns whether the result was committed.
pub async fn refresh_balances(
    state: &FleetState,
    clients: &dyn ContractClientProvider,
    session: &Session,
) -> bool {
    let ticket = state.begin_balance_refresh().await;

    if session.role != Role::Owner {
        return state.commit_balances(ticket, HashMap::new()).await;
    }

    let owners: Vec<WalletAddress> = state
        .cars()
        .await
        .into_iter()
        .map(|car| car.owner_address)
        .collect();

    let client = match clients.build_client(&session.wallet).await {
        Ok(client) => Some(client),
        Err(err) => {
            warn!(wallet = %session.wallet, "fleet: balance refresh could not build client: {err:#}");
            None
        }
    };

    let fetches = owners.into_iter().map(|owner| {
        let client = client.clone();
        async move {
            let Some(client) = client else {
                return (owner, 0);
            };
            match client.get_owner_balance(&owner).await {
                Ok(amount) => (owner, amount),
                Err(err) => {
                    warn!(owner = %owner, "fleet: owner balance fetch failed: {err:#}");
                    (owner, 0)
                }
            }
        }
    });
    let balances: HashMap<WalletAddress, i128> = join_all(fetches).await.into_iter().collect();
    let entries = balances.len();

    let committed = state.commit_balances(ticket, balances).await;
    if committed {
        info!(wallet = %session.wallet, entries, "fleet: owner balances refreshed");
    }
    committed
}

/// Reloads the admin fee, scaled to stroops. Any failure yields a zero fee.
pub async fn refresh_admin_fee(
    state: &FleetState,
    clients: &dyn ContractClientProvider,
    wallet: &WalletAddress,
) -> bool {
    let ticket = state.begin_fee_refresh().await;

    let fee = match fetch_scaled_fee(clients, wallet).await {
        Ok(fee) => fee,
        Err(err) => {
            warn!(wallet = %wallet, "fleet: admin fee fetch failed: {err:#}");
            0
        }
    };

    let committed = state.commit_admin_fee(ticket, fee).await;
    if committed {
        info!(wallet = %wallet, fee, "fleet: admin fee refreshed");
    }
    committed
}

async fn fetch_scaled_fee(
    clients: &dyn ContractClientProvider,
    wallet: &WalletAddress,
) -> anyhow::Result<i128> {
    let client = clients.build_client(wallet).await?;
    let fee = client.get_admin_fee().await?;
    fee.checked_mul(STROOP_SCALE)
        .ok_or_else(|| anyhow::anyhow!("admin fee {fee} overflows when scaled"))
}

#[cfg(test)]
#[path = "tests/fleet_state_tests.rs"]
mod tests;
