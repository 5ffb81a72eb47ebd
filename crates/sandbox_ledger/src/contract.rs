//! In-memory rent-a-car contract.

use std::collections::HashMap;

use shared::{
    domain::{CarStatus, WalletAddress},
    error::{ContractErrorCode, ContractException},
    protocol::ContractCall,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub price_per_day: i128,
    pub car_status: CarStatus,
    pub available_to_withdraw: i128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalRecord {
    pub total_days_to_rent: u32,
    pub amount: i128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    CarAdded {
        owner: WalletAddress,
        price_per_day: i128,
    },
    CarRemoved {
        owner: WalletAddress,
    },
    Rented {
        renter: WalletAddress,
        owner: WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    },
    PayoutOwner {
        owner: WalletAddress,
        amount: i128,
    },
    AdminFeeSet {
        admin: WalletAddress,
        fee: i128,
    },
    CarReturned {
        renter: WalletAddress,
        owner: WalletAddress,
    },
}

type ContractResult<T> = Result<T, ContractException>;

#[derive(Debug)]
pub struct RentACar {
    admin: WalletAddress,
    admin_fee: i128,
    admin_balance: i128,
    contract_balance: i128,
    cars: HashMap<WalletAddress, CarRecord>,
    rentals: HashMap<(WalletAddress, WalletAddress), RentalRecord>,
    events: Vec<ContractEvent>,
}

impl RentACar {
    pub fn new(admin: WalletAddress) -> Self {
        Self {
            admin,
            admin_fee: 0,
            admin_balance: 0,
            contract_balance: 0,
            cars: HashMap::new(),
            rentals: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn admin_fee(&self) -> i128 {
        self.admin_fee
    }

    pub fn admin_balance(&self) -> i128 {
        self.admin_balance
    }

    pub fn contract_balance(&self) -> i128 {
        self.contract_balance
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn car(&self, owner: &WalletAddress) -> ContractResult<&CarRecord> {
        self.cars
            .get(owner)
            .ok_or_else(|| ContractErrorCode::CarNotFound.into())
    }

    pub fn owner_balance(&self, owner: &WalletAddress) -> ContractResult<i128> {
        Ok(self.car(owner)?.available_to_withdraw)
    }

    pub fn add_car(&mut self, owner: WalletAddress, price_per_day: i128) -> ContractResult<()> {
        if price_per_day < 0 {
            return Err(ContractErrorCode::AmountMustBePositive.into());
        }
        if self.cars.contains_key(&owner) {
            return Err(ContractErrorCode::CarAlreadyExists.into());
        }
        self.cars.insert(
            owner.clone(),
            CarRecord {
                price_per_day,
                car_status: CarStatus::Available,
                available_to_withdraw: 0,
            },
        );
        self.events.push(ContractEvent::CarAdded {
            owner,
            price_per_day,
        });
        Ok(())
    }

    /// Applies a signed call. `signer` is the address that authorized it.
    pub fn apply(&mut self, signer: &WalletAddress, call: &ContractCall) -> ContractResult<()> {
        match call {
            ContractCall::SetAdminFee { fee } => self.set_admin_fee(signer, *fee),
            ContractCall::RemoveCar { owner } => self.remove_car(signer, owner),
            ContractCall::PayoutOwner { owner, amount } => {
                self.payout_owner(signer, owner, *amount)
            }
            ContractCall::Rental {
                renter,
                owner,
                total_days_to_rent,
                amount,
            } => self.rental(signer, renter, owner, *total_days_to_rent, *amount),
        }
    }

    fn require_auth(signer: &WalletAddress, expected: &WalletAddress) -> ContractResult<()> {
        if signer != expected {
            return Err(ContractException::new(
                ContractErrorCode::Unauthorized,
                format!("{signer} cannot authorize on behalf of {expected}"),
            ));
        }
        Ok(())
    }

    fn set_admin_fee(&mut self, signer: &WalletAddress, fee: i128) -> ContractResult<()> {
        Self::require_auth(signer, &self.admin)?;
        if fee < 0 {
            return Err(ContractErrorCode::AmountMustBePositive.into());
        }
        self.admin_fee = fee;
        self.events.push(ContractEvent::AdminFeeSet {
            admin: self.admin.clone(),
            fee,
        });
        Ok(())
    }

    fn remove_car(&mut self, signer: &WalletAddress, owner: &WalletAddress) -> ContractResult<()> {
        Self::require_auth(signer, &self.admin)?;
        if self.cars.remove(owner).is_none() {
            return Err(ContractErrorCode::CarNotFound.into());
        }
        self.events.push(ContractEvent::CarRemoved {
            owner: owner.clone(),
        });
        Ok(())
    }

    fn rental(
        &mut self,
        signer: &WalletAddress,
        renter: &WalletAddress,
        owner: &WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    ) -> ContractResult<()> {
        Self::require_auth(signer, renter)?;
        if amount <= 0 {
            return Err(ContractErrorCode::AmountMustBePositive.into());
        }
        if total_days_to_rent == 0 {
            return Err(ContractErrorCode::RentalDurationCannotBeZero.into());
        }
        if renter == owner {
            return Err(ContractErrorCode::SelfRentalNotAllowed.into());
        }

        let admin_fee = self.admin_fee;
        let to_transfer = amount
            .checked_add(admin_fee)
            .ok_or(ContractErrorCode::Overflow)?;
        let contract_balance = self
            .contract_balance
            .checked_add(to_transfer)
            .ok_or(ContractErrorCode::Overflow)?;
        let admin_balance = self
            .admin_balance
            .checked_add(admin_fee)
            .ok_or(ContractErrorCode::Overflow)?;

        let car = self
            .cars
            .get_mut(owner)
            .ok_or(ContractErrorCode::CarNotFound)?;
        if car.car_status != CarStatus::Available {
            return Err(ContractErrorCode::RentalNotFound.into());
        }
        let available_to_withdraw = car
            .available_to_withdraw
            .checked_add(amount)
            .ok_or(ContractErrorCode::Overflow)?;

        car.car_status = CarStatus::Rented;
        car.available_to_withdraw = available_to_withdraw;
        self.contract_balance = contract_balance;
        self.admin_balance = admin_balance;
        self.rentals.insert(
            (renter.clone(), owner.clone()),
            RentalRecord {
                total_days_to_rent,
                amount,
            },
        );
        self.events.push(ContractEvent::Rented {
            renter: renter.clone(),
            owner: owner.clone(),
            total_days_to_rent,
            amount,
        });
        Ok(())
    }

    fn payout_owner(
        &mut self,
        signer: &WalletAddress,
        owner: &WalletAddress,
        amount: i128,
    ) -> ContractResult<()> {
        Self::require_auth(signer, owner)?;
        if amount <= 0 {
            return Err(ContractErrorCode::AmountMustBePositive.into());
        }
        let contract_balance = self.contract_balance;
        let car = self
            .cars
            .get_mut(owner)
            .ok_or(ContractErrorCode::CarNotFound)?;
        if car.car_status != CarStatus::Available {
            return Err(ContractErrorCode::RentalNotFound.into());
        }
        if car.available_to_withdraw < amount || amount > contract_balance {
            return Err(ContractErrorCode::BalanceNotAvailableForAmountRequested.into());
        }

        car.available_to_withdraw = car
            .available_to_withdraw
            .checked_sub(amount)
            .ok_or(ContractErrorCode::Underflow)?;
        self.contract_balance = contract_balance
            .checked_sub(amount)
            .ok_or(ContractErrorCode::Underflow)?;
        self.events.push(ContractEvent::PayoutOwner {
            owner: owner.clone(),
            amount,
        });
        Ok(())
    }

    /// Ends a rental and makes the car available again.
    pub fn return_car(
        &mut self,
        renter: &WalletAddress,
        owner: &WalletAddress,
    ) -> ContractResult<()> {
        let key = (renter.clone(), owner.clone());
        if !self.rentals.contains_key(&key) {
            return Err(ContractErrorCode::RentalNotFound.into());
        }
        let car = self
            .cars
            .get_mut(owner)
            .ok_or(ContractErrorCode::CarNotFound)?;
        car.car_status = CarStatus::Available;
        self.rentals.remove(&key);
        self.events.push(ContractEvent::CarReturned {
            renter: renter.clone(),
            owner: owner.clone(),
        });
        Ok(())
    }

    pub fn rental_for(
        &self,
        renter: &WalletAddress,
        owner: &WalletAddress,
    ) -> Option<&RentalRecord> {
        self.rentals.get(&(renter.clone(), owner.clone()))
    }
}

#[cfg(test)]
#[path = "tests/contract_tests.rs"]
mod tests;
