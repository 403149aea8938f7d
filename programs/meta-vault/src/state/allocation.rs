use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::VaultError,
    events::*,
    math::{mul_div, Rounding},
};

use super::{Env, MetaVault};

/// Capability deciding which targets the curator may allocate into
pub trait AllocationRegistry {
    fn is_approved(&self, target: &Pubkey) -> bool;
}

/// Outcome of an exit from a target: settled now (`withdraw_key` is `None`)
/// or queued in the target under `withdraw_key`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitReceipt {
    pub shares: u128,
    pub assets: u128,
    pub withdraw_key: Option<Pubkey>,
}

/// A sub-vault the meta vault can hold shares of
pub trait TargetVault {
    fn address(&self) -> Pubkey;

    /// Deposit `assets`, returning the shares minted to `receiver`
    fn deposit_for(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128>;

    fn redeem_for(
        &mut self,
        env: &Env,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<ExitReceipt>;

    fn withdraw_for(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<ExitReceipt>;

    /// Current asset value of `shares`
    fn shares_value(&self, shares: u128) -> Result<u128>;

    /// Shares burned to withdraw `assets`
    fn shares_for(&self, assets: u128) -> Result<u128>;

    fn is_withdraw_claimable(&self, key: &Pubkey) -> bool;

    /// Settle a queued exit, returning the assets paid out
    fn claim_for(&mut self, env: &Env, key: &Pubkey, events: &mut Vec<VaultEvent>)
        -> Result<u128>;
}

/// Deferred exit owed by a target
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct PendingWithdraw {
    pub key: Pubkey,
    pub assets: u128,
}

impl PendingWithdraw {
    pub const SPACE: usize = 32 + 16;
}

/// Position held in one target
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    pub target: Pubkey,

    /// Book value of the shares still held
    pub assets: u128,

    /// Target shares held
    pub shares: u128,

    /// Deferred exits in request order
    pub withdraw_keys: Vec<PendingWithdraw>,
}

impl Allocation {
    pub const SPACE: usize = 32 + 16 + 16 + 4 + MAX_PENDING_KEYS * PendingWithdraw::SPACE;

    /// Book value plus assets owed by deferred exits
    pub fn total_assets(&self) -> u128 {
        self.withdraw_keys
            .iter()
            .fold(self.assets, |acc, k| acc.saturating_add(k.assets))
    }

    fn is_empty(&self) -> bool {
        self.shares == 0 && self.withdraw_keys.is_empty()
    }
}

impl MetaVault {
    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    pub fn allocated_assets(&self) -> u128 {
        self.allocations
            .iter()
            .fold(0u128, |acc, a| acc.saturating_add(a.total_assets()))
    }

    pub fn allocated_vaults(&self) -> Vec<Pubkey> {
        self.allocations.iter().map(|a| a.target).collect()
    }

    pub fn allocation(&self, target: &Pubkey) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.target == *target)
    }

    pub fn allocation_withdraw_keys(&self, target: &Pubkey) -> Vec<Pubkey> {
        self.allocation(target)
            .map(|a| a.withdraw_keys.iter().map(|k| k.key).collect())
            .unwrap_or_default()
    }

    /// `(requested, claimable)` assets over every pending key. Keys of targets
    /// not supplied count as requested.
    pub fn allocation_claimable_assets(&self, targets: &[&dyn TargetVault]) -> (u128, u128) {
        let mut requested = 0u128;
        let mut claimable = 0u128;
        for allocation in &self.allocations {
            let target = targets.iter().find(|t| t.address() == allocation.target);
            for pending in &allocation.withdraw_keys {
                if target.is_some_and(|t| t.is_withdraw_claimable(&pending.key)) {
                    claimable = claimable.saturating_add(pending.assets);
                } else {
                    requested = requested.saturating_add(pending.assets);
                }
            }
        }
        (requested, claimable)
    }

    /// Supplied targets holding at least one claimable key
    pub fn claimable_vaults(&self, targets: &[&dyn TargetVault]) -> Vec<Pubkey> {
        targets
            .iter()
            .filter(|t| {
                self.allocation(&t.address()).is_some_and(|a| {
                    a.withdraw_keys
                        .iter()
                        .any(|k| t.is_withdraw_claimable(&k.key))
                })
            })
            .map(|t| t.address())
            .collect()
    }

    /// Revalue the shares held in each supplied target at its current rate
    pub fn mark_allocations(&mut self, targets: &[&dyn TargetVault]) -> Result<()> {
        for target in targets {
            let address = target.address();
            if let Some(allocation) = self.allocations.iter_mut().find(|a| a.target == address) {
                allocation.assets = target.shares_value(allocation.shares)?;
            }
        }
        Ok(())
    }

    fn allocation_index(&self, target: &Pubkey) -> Option<usize> {
        self.allocations.iter().position(|a| a.target == *target)
    }

    /// The vault acts in targets as both caller and share holder
    fn target_env(&self, env: &Env) -> Env {
        Env::new(self.address, env.now)
    }

    // ---------------------------------------------------------------------
    // Curator operations
    // ---------------------------------------------------------------------

    /// Move free idle assets into targets. Returns the target shares received.
    pub fn allocate(
        &mut self,
        env: &Env,
        registry: &dyn AllocationRegistry,
        targets: &mut [&mut dyn TargetVault],
        assets: &[u128],
        events: &mut Vec<VaultEvent>,
    ) -> Result<Vec<u128>> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;
        require!(targets.len() == assets.len(), VaultError::InvalidParamLength);

        let total = assets.iter().try_fold(0u128, |acc, a| {
            acc.checked_add(*a).ok_or(VaultError::MathOverflow)
        })?;
        require!(total <= self.free_idle_assets(), VaultError::OverAllocation);

        let mut new_positions = 0usize;
        for (i, target) in targets.iter().enumerate() {
            let address = target.address();
            require!(
                address != self.address && registry.is_approved(&address),
                VaultError::InvalidTargetAllocation
            );
            require!(assets[i] > 0, VaultError::ZeroAssets);
            let seen_earlier = targets[..i].iter().any(|t| t.address() == address);
            if self.allocation_index(&address).is_none() && !seen_earlier {
                new_positions += 1;
            }
        }
        require!(
            self.allocations.len() + new_positions <= MAX_ALLOCATIONS,
            VaultError::OverAllocation
        );

        let target_env = self.target_env(env);
        let mut received = Vec::with_capacity(targets.len());
        for (target, &amount) in targets.iter_mut().zip(assets) {
            let address = target.address();
            self.idle_assets = self
                .idle_assets
                .checked_sub(amount)
                .ok_or(VaultError::OverAllocation)?;

            let shares = target.deposit_for(&target_env, amount, self.address, events)?;

            let index = match self.allocation_index(&address) {
                Some(index) => index,
                None => {
                    self.allocations.push(Allocation {
                        target: address,
                        ..Default::default()
                    });
                    self.allocations.len() - 1
                }
            };
            let allocation = &mut self.allocations[index];
            allocation.assets = allocation
                .assets
                .checked_add(amount)
                .ok_or(VaultError::MathOverflow)?;
            allocation.shares = allocation
                .shares
                .checked_add(shares)
                .ok_or(VaultError::MathOverflow)?;

            events.push(VaultEvent::Allocated(Allocated {
                vault: self.address,
                target: address,
                assets: amount,
                shares,
            }));
            received.push(shares);
        }
        Ok(received)
    }

    /// Redeem target shares. Returns one receipt per target; receipts without
    /// a key were settled into idle.
    pub fn redeem_allocations(
        &mut self,
        env: &Env,
        targets: &mut [&mut dyn TargetVault],
        shares: &[u128],
        events: &mut Vec<VaultEvent>,
    ) -> Result<Vec<ExitReceipt>> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;
        require!(targets.len() == shares.len(), VaultError::InvalidParamLength);

        let target_env = self.target_env(env);
        let mut receipts = Vec::with_capacity(targets.len());
        for (target, &amount) in targets.iter_mut().zip(shares) {
            let address = target.address();
            require!(amount > 0, VaultError::ZeroShares);
            let index = self.exit_position(&address, amount)?;

            let receipt =
                target.redeem_for(&target_env, amount, self.address, self.address, events)?;
            self.settle_allocation_exit(index, &receipt)?;

            events.push(VaultEvent::AllocationRedeemed(AllocationRedeemed {
                vault: self.address,
                target: address,
                shares: receipt.shares,
                assets: receipt.assets,
                withdraw_key: receipt.withdraw_key,
            }));
            receipts.push(receipt);
        }
        self.allocations.retain(|a| !a.is_empty());
        Ok(receipts)
    }

    /// Withdraw exact asset amounts from targets
    pub fn withdraw_allocations(
        &mut self,
        env: &Env,
        targets: &mut [&mut dyn TargetVault],
        assets: &[u128],
        events: &mut Vec<VaultEvent>,
    ) -> Result<Vec<ExitReceipt>> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;
        require!(targets.len() == assets.len(), VaultError::InvalidParamLength);

        let target_env = self.target_env(env);
        let mut receipts = Vec::with_capacity(targets.len());
        for (target, &amount) in targets.iter_mut().zip(assets) {
            let address = target.address();
            require!(amount > 0, VaultError::ZeroAssets);
            let index = self.exit_position(&address, target.shares_for(amount)?)?;

            let receipt =
                target.withdraw_for(&target_env, amount, self.address, self.address, events)?;
            self.settle_allocation_exit(index, &receipt)?;

            events.push(VaultEvent::AllocationWithdrawn(AllocationWithdrawn {
                vault: self.address,
                target: address,
                shares: receipt.shares,
                assets: receipt.assets,
                withdraw_key: receipt.withdraw_key,
            }));
            receipts.push(receipt);
        }
        self.allocations.retain(|a| !a.is_empty());
        Ok(receipts)
    }

    /// Index of the allocation in `target`, checked to hold `shares` and to
    /// have room for another deferred key
    fn exit_position(&self, target: &Pubkey, shares: u128) -> Result<usize> {
        let index = self
            .allocation_index(target)
            .ok_or(VaultError::InsufficientAllocation)?;
        let allocation = &self.allocations[index];
        require!(
            shares <= allocation.shares,
            VaultError::InsufficientAllocation
        );
        require!(
            allocation.withdraw_keys.len() < MAX_PENDING_KEYS,
            VaultError::QueueFull
        );
        Ok(index)
    }

    /// Release book value pro rata to the shares exited and book what the
    /// target paid or owes
    fn settle_allocation_exit(&mut self, index: usize, receipt: &ExitReceipt) -> Result<()> {
        {
            let allocation = &mut self.allocations[index];
            require!(
                receipt.shares <= allocation.shares,
                VaultError::InsufficientAllocation
            );
            let released = if receipt.shares == allocation.shares {
                allocation.assets
            } else {
                mul_div(
                    allocation.assets,
                    receipt.shares,
                    allocation.shares,
                    Rounding::Down,
                )?
            };
            allocation.shares -= receipt.shares;
            allocation.assets = allocation.assets.saturating_sub(released);
        }

        match receipt.withdraw_key {
            Some(key) => self.allocations[index].withdraw_keys.push(PendingWithdraw {
                key,
                assets: receipt.assets,
            }),
            None => {
                self.idle_assets = self
                    .idle_assets
                    .checked_add(receipt.assets)
                    .ok_or(VaultError::MathOverflow)?;
            }
        }
        Ok(())
    }

    /// Pull every claimable deferred exit back into idle. Keys of a target are
    /// claimed in order, stopping at the first one that is not yet claimable.
    /// Returns the assets pulled from each target.
    pub fn claim_allocations(
        &mut self,
        env: &Env,
        targets: &mut [&mut dyn TargetVault],
        events: &mut Vec<VaultEvent>,
    ) -> Result<Vec<(Pubkey, u128)>> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;

        let target_env = self.target_env(env);
        let mut pulled = Vec::with_capacity(targets.len());
        for target in targets.iter_mut() {
            let address = target.address();
            let mut total = 0u128;

            while let Some(index) = self.allocation_index(&address) {
                let Some(pending) = self.allocations[index].withdraw_keys.first().cloned() else {
                    break;
                };
                if !target.is_withdraw_claimable(&pending.key) {
                    break;
                }

                self.allocations[index].withdraw_keys.remove(0);
                let assets = target.claim_for(&target_env, &pending.key, events)?;
                self.idle_assets = self
                    .idle_assets
                    .checked_add(assets)
                    .ok_or(VaultError::MathOverflow)?;
                total = total.checked_add(assets).ok_or(VaultError::MathOverflow)?;

                events.push(VaultEvent::AllocationClaimed(AllocationClaimed {
                    vault: self.address,
                    target: address,
                    withdraw_key: pending.key,
                    assets,
                }));
            }
            pulled.push((address, total));
        }
        self.allocations.retain(|a| !a.is_empty());
        Ok(pulled)
    }
}

impl TargetVault for MetaVault {
    fn address(&self) -> Pubkey {
        self.address
    }

    fn deposit_for(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.deposit(env, None, assets, receiver, events)
    }

    /// Settles from free idle when it covers the exit, queues otherwise
    fn redeem_for(
        &mut self,
        env: &Env,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<ExitReceipt> {
        self.accrue_management_fee_shares(env.now)?;
        if shares <= self.max_redeem(&owner)? {
            let assets = self.redeem(env, shares, receiver, owner, events)?;
            return Ok(ExitReceipt {
                shares,
                assets,
                withdraw_key: None,
            });
        }

        let key = self.request_redeem(env, shares, receiver, owner, events)?;
        let assets = self
            .withdraw_request(&key)
            .map_or(0, |r| r.requested_assets);
        Ok(ExitReceipt {
            shares,
            assets,
            withdraw_key: Some(key),
        })
    }

    fn withdraw_for(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<ExitReceipt> {
        self.accrue_management_fee_shares(env.now)?;
        if assets <= self.max_withdraw(&owner)? {
            let shares = self.withdraw(env, assets, receiver, owner, events)?;
            return Ok(ExitReceipt {
                shares,
                assets,
                withdraw_key: None,
            });
        }

        let balance = self.ledger.balance_of(&owner);
        let key = self.request_withdraw(env, assets, receiver, owner, events)?;
        Ok(ExitReceipt {
            shares: balance.saturating_sub(self.ledger.balance_of(&owner)),
            assets,
            withdraw_key: Some(key),
        })
    }

    fn shares_value(&self, shares: u128) -> Result<u128> {
        self.convert_to_assets(shares)
    }

    fn shares_for(&self, assets: u128) -> Result<u128> {
        self.preview_withdraw(assets)
    }

    fn is_withdraw_claimable(&self, key: &Pubkey) -> bool {
        self.is_claimable(key)
    }

    fn claim_for(
        &mut self,
        env: &Env,
        key: &Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.claim(env, key, events).map(|(_, assets)| assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    struct Approved(Vec<Pubkey>);

    impl AllocationRegistry for Approved {
        fn is_approved(&self, target: &Pubkey) -> bool {
            self.0.contains(target)
        }
    }

    fn funded_vault(owner: Pubkey, idle: u128) -> MetaVault {
        let mut vault = MetaVault {
            address: Pubkey::new_unique(),
            idle_assets: idle,
            ..Default::default()
        };
        vault.config.owner = owner;
        vault.config.user_deposit_limit = u128::MAX;
        vault.config.vault_deposit_limit = u128::MAX;
        vault.ledger.mint(&Pubkey::new_unique(), idle).unwrap();
        vault
    }

    #[test]
    fn test_allocate_param_length_mismatch() {
        let owner = Pubkey::new_unique();
        let mut vault = funded_vault(owner, 1_000);
        let mut target = funded_vault(Pubkey::new_unique(), 0);
        let registry = Approved(vec![target.address]);

        let err = vault
            .allocate(
                &Env::new(owner, 0),
                &registry,
                &mut [&mut target],
                &[100, 200],
                &mut Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::InvalidParamLength));
    }

    #[test]
    fn test_allocate_unapproved_target() {
        let owner = Pubkey::new_unique();
        let mut vault = funded_vault(owner, 1_000);
        let mut target = funded_vault(Pubkey::new_unique(), 0);
        let registry = Approved(vec![]);

        let err = vault
            .allocate(
                &Env::new(owner, 0),
                &registry,
                &mut [&mut target],
                &[100],
                &mut Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::InvalidTargetAllocation));
        assert_eq!(vault.idle_assets, 1_000);
    }

    #[test]
    fn test_allocate_requires_owner() {
        let mut vault = funded_vault(Pubkey::new_unique(), 1_000);
        let mut target = funded_vault(Pubkey::new_unique(), 0);
        let registry = Approved(vec![target.address]);

        let err = vault
            .allocate(
                &Env::new(Pubkey::new_unique(), 0),
                &registry,
                &mut [&mut target],
                &[100],
                &mut Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));
    }

    #[test]
    fn test_partial_exit_releases_book_value_pro_rata() {
        let owner = Pubkey::new_unique();
        let mut vault = funded_vault(owner, 1_000);
        let mut target = funded_vault(Pubkey::new_unique(), 0);
        let registry = Approved(vec![target.address]);
        let mut events = Vec::new();

        vault
            .allocate(
                &Env::new(owner, 0),
                &registry,
                &mut [&mut target],
                &[400],
                &mut events,
            )
            .unwrap();
        assert_eq!(vault.idle_assets, 600);
        assert_eq!(vault.total_assets(), 1_000);

        let receipts = vault
            .redeem_allocations(&Env::new(owner, 0), &mut [&mut target], &[100], &mut events)
            .unwrap();
        assert_eq!(receipts[0].withdraw_key, None);
        assert_eq!(receipts[0].assets, 100);

        let allocation = vault.allocation(&target.address).unwrap();
        assert_eq!(allocation.shares, 300);
        assert_eq!(allocation.assets, 300);
        assert_eq!(vault.idle_assets, 700);
        assert_eq!(vault.total_assets(), 1_000);
    }

    #[test]
    fn test_redeem_more_than_held_fails() {
        let owner = Pubkey::new_unique();
        let mut vault = funded_vault(owner, 1_000);
        let mut target = funded_vault(Pubkey::new_unique(), 0);
        let registry = Approved(vec![target.address]);
        let mut events = Vec::new();

        vault
            .allocate(&Env::new(owner, 0), &registry, &mut [&mut target], &[400], &mut events)
            .unwrap();
        let err = vault
            .redeem_allocations(&Env::new(owner, 0), &mut [&mut target], &[401], &mut events)
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::InsufficientAllocation));
    }
}
