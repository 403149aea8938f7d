use anchor_lang::prelude::*;

use crate::{
    errors::VaultError,
    events::*,
    math::{mul_div, Rounding},
};

use super::{Env, MetaVault, WhitelistProvider};

impl MetaVault {
    // ---------------------------------------------------------------------
    // Token metadata
    // ---------------------------------------------------------------------

    pub fn asset(&self) -> Pubkey {
        self.asset_mint
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.ledger.balance_of(owner)
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    pub fn nonces(&self, owner: &Pubkey) -> u64 {
        self.ledger.nonce(owner)
    }

    // ---------------------------------------------------------------------
    // Totals
    // ---------------------------------------------------------------------

    /// Assets owed to requests that have been queued but not yet claimed
    pub fn total_pending_withdraw(&self) -> u128 {
        self.cumulative_requested_withdrawal_assets
            .saturating_sub(self.cumulative_withdrawn_assets)
    }

    /// Custody balance not promised to the withdrawal queue
    pub fn free_idle_assets(&self) -> u128 {
        self.idle_assets.saturating_sub(self.total_pending_withdraw())
    }

    /// Idle plus allocated assets, net of what queued requests are owed
    pub fn total_assets(&self) -> u128 {
        self.idle_assets
            .saturating_add(self.allocated_assets())
            .saturating_sub(self.total_pending_withdraw())
    }

    /// Share supply including fee shares accrued but not yet minted
    pub fn effective_supply(&self) -> u128 {
        self.ledger
            .total_supply
            .saturating_add(self.fees.next_management_fee_shares)
            .saturating_add(self.fees.next_performance_fee_shares)
    }

    /// Assets per `10^decimals` shares, zero for an empty vault
    pub fn share_price(&self) -> Result<u128> {
        let supply = self.effective_supply();
        if supply == 0 {
            return Ok(0);
        }
        let unit = 10u128
            .checked_pow(self.decimals as u32)
            .ok_or(VaultError::MathOverflow)?;
        mul_div(self.total_assets(), unit, supply, Rounding::Down)
    }

    // ---------------------------------------------------------------------
    // Conversions
    // ---------------------------------------------------------------------

    pub(crate) fn to_shares(&self, assets: u128, rounding: Rounding) -> Result<u128> {
        let supply = self.effective_supply();
        let total_assets = self.total_assets();
        // Empty vault: 1:1
        if supply == 0 || total_assets == 0 {
            return Ok(assets);
        }
        mul_div(assets, supply, total_assets, rounding)
    }

    pub(crate) fn to_assets(&self, shares: u128, rounding: Rounding) -> Result<u128> {
        let supply = self.effective_supply();
        let total_assets = self.total_assets();
        if supply == 0 || total_assets == 0 {
            return Ok(shares);
        }
        mul_div(shares, total_assets, supply, rounding)
    }

    pub fn convert_to_shares(&self, assets: u128) -> Result<u128> {
        self.to_shares(assets, Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: u128) -> Result<u128> {
        self.to_assets(shares, Rounding::Down)
    }

    pub fn preview_deposit(&self, assets: u128) -> Result<u128> {
        self.to_shares(assets, Rounding::Down)
    }

    pub fn preview_mint(&self, shares: u128) -> Result<u128> {
        self.to_assets(shares, Rounding::Up)
    }

    pub fn preview_withdraw(&self, assets: u128) -> Result<u128> {
        self.to_shares(assets, Rounding::Up)
    }

    pub fn preview_redeem(&self, shares: u128) -> Result<u128> {
        self.to_assets(shares, Rounding::Down)
    }

    // ---------------------------------------------------------------------
    // Limits
    // ---------------------------------------------------------------------

    /// Remaining deposit headroom of `user` under both ceilings, ignoring
    /// shutdown and whitelist
    fn deposit_headroom(&self, user: &Pubkey) -> Result<u128> {
        let vault_room = self
            .config
            .vault_deposit_limit
            .saturating_sub(self.total_assets());
        if self.config.user_deposit_limit == u128::MAX {
            return Ok(vault_room);
        }
        let position = self.to_assets(self.ledger.balance_of(user), Rounding::Down)?;
        let user_room = self.config.user_deposit_limit.saturating_sub(position);
        Ok(vault_room.min(user_room))
    }

    pub fn max_deposit(
        &self,
        whitelist: Option<&dyn WhitelistProvider>,
        user: &Pubkey,
    ) -> Result<u128> {
        if self.is_shutdown || !self.is_whitelisted(whitelist, user) {
            return Ok(0);
        }
        self.deposit_headroom(user)
    }

    pub fn max_mint(&self, whitelist: Option<&dyn WhitelistProvider>, user: &Pubkey) -> Result<u128> {
        let max_assets = self.max_deposit(whitelist, user)?;
        if max_assets == u128::MAX {
            return Ok(u128::MAX);
        }
        self.to_shares(max_assets, Rounding::Down)
    }

    /// Bounded by the owner's position and by free idle assets; anything
    /// larger has to go through the withdrawal queue
    pub fn max_withdraw(&self, owner: &Pubkey) -> Result<u128> {
        let position = self.to_assets(self.ledger.balance_of(owner), Rounding::Down)?;
        Ok(position.min(self.free_idle_assets()))
    }

    pub fn max_redeem(&self, owner: &Pubkey) -> Result<u128> {
        let liquid_shares = self.to_shares(self.free_idle_assets(), Rounding::Down)?;
        Ok(self.ledger.balance_of(owner).min(liquid_shares))
    }

    // ---------------------------------------------------------------------
    // Deposits
    // ---------------------------------------------------------------------

    fn check_deposit_allowed(
        &self,
        env: &Env,
        whitelist: Option<&dyn WhitelistProvider>,
        receiver: &Pubkey,
    ) -> Result<()> {
        require!(!self.is_shutdown, VaultError::Shutdown);
        require!(
            self.is_whitelisted(whitelist, &env.caller) && self.is_whitelisted(whitelist, receiver),
            VaultError::NotWhitelisted
        );
        Ok(())
    }

    /// Deposit `assets` and mint the corresponding shares to `receiver`
    pub fn deposit(
        &mut self,
        env: &Env,
        whitelist: Option<&dyn WhitelistProvider>,
        assets: u128,
        receiver: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.accrue_management_fee_shares(env.now)?;
        self.check_deposit_allowed(env, whitelist, &receiver)?;

        require!(assets > 0, VaultError::ZeroAssets);
        require!(
            assets <= self.deposit_headroom(&receiver)?,
            VaultError::ExceededMaxDeposit
        );

        let shares = self.preview_deposit(assets)?;
        require!(shares > 0, VaultError::ZeroShares);

        self.settle_deposit(env, receiver, assets, shares, events)?;
        Ok(shares)
    }

    /// Mint exactly `shares` to `receiver`, pulling the assets they cost
    pub fn mint(
        &mut self,
        env: &Env,
        whitelist: Option<&dyn WhitelistProvider>,
        shares: u128,
        receiver: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.accrue_management_fee_shares(env.now)?;
        self.check_deposit_allowed(env, whitelist, &receiver)?;

        require!(shares > 0, VaultError::ZeroShares);
        let headroom = self.deposit_headroom(&receiver)?;
        if headroom != u128::MAX {
            require!(
                shares <= self.to_shares(headroom, Rounding::Down)?,
                VaultError::ExceededMaxMint
            );
        }

        let assets = self.preview_mint(shares)?;
        require!(assets > 0, VaultError::ZeroAssets);

        self.settle_deposit(env, receiver, assets, shares, events)?;
        Ok(assets)
    }

    fn settle_deposit(
        &mut self,
        env: &Env,
        receiver: Pubkey,
        assets: u128,
        shares: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        let idle_assets = self
            .idle_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;

        self.mint_shares(&receiver, shares, events)?;
        self.idle_assets = idle_assets;

        events.push(VaultEvent::Deposited(Deposited {
            vault: self.address,
            caller: env.caller,
            receiver,
            assets,
            shares,
        }));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Immediate exits
    // ---------------------------------------------------------------------

    /// Withdraw `assets` from free idle, burning the shares of `owner`
    pub fn withdraw(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.accrue_management_fee_shares(env.now)?;

        require!(assets > 0, VaultError::ZeroAssets);
        require!(
            assets <= self.max_withdraw(&owner)?,
            VaultError::ExceededMaxWithdraw
        );

        let shares = self.preview_withdraw(assets)?;
        self.settle_exit(env, receiver, owner, assets, shares, events)?;
        Ok(shares)
    }

    /// Redeem `shares` of `owner` against free idle
    pub fn redeem(
        &mut self,
        env: &Env,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<u128> {
        self.accrue_management_fee_shares(env.now)?;

        require!(shares > 0, VaultError::ZeroShares);
        require!(
            shares <= self.max_redeem(&owner)?,
            VaultError::ExceededMaxRedeem
        );

        let assets = self.preview_redeem(shares)?;
        require!(assets > 0, VaultError::ZeroAssets);

        self.settle_exit(env, receiver, owner, assets, shares, events)?;
        Ok(assets)
    }

    fn settle_exit(
        &mut self,
        env: &Env,
        receiver: Pubkey,
        owner: Pubkey,
        assets: u128,
        shares: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        require!(receiver != Pubkey::default(), VaultError::InvalidReceiver);
        let idle_assets = self
            .idle_assets
            .checked_sub(assets)
            .ok_or(VaultError::ExceededMaxWithdraw)?;

        self.spend_shares(env, &owner, shares, events)?;
        self.idle_assets = idle_assets;

        events.push(VaultEvent::Withdrawn(Withdrawn {
            vault: self.address,
            caller: env.caller,
            receiver,
            owner,
            assets,
            shares,
        }));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Share ledger entry points
    // ---------------------------------------------------------------------

    pub fn transfer(
        &mut self,
        env: &Env,
        to: Pubkey,
        amount: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.accrue_management_fee_shares(env.now)?;
        self.transfer_shares(&env.caller, &to, amount, events)
    }

    pub fn approve(
        &mut self,
        env: &Env,
        spender: Pubkey,
        amount: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.accrue_management_fee_shares(env.now)?;
        self.ledger.approve(&env.caller, &spender, amount)?;

        events.push(VaultEvent::Approval(Approval {
            vault: self.address,
            owner: env.caller,
            spender,
            amount,
        }));
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        env: &Env,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.accrue_management_fee_shares(env.now)?;

        // Validate the transfer before touching the allowance
        require!(from != Pubkey::default(), VaultError::InvalidSender);
        require!(to != Pubkey::default(), VaultError::InvalidReceiver);
        require!(
            self.ledger.balance_of(&from) >= amount,
            VaultError::InsufficientBalance
        );

        self.ledger.spend_allowance(&from, &env.caller, amount)?;
        self.transfer_shares(&from, &to, amount, events)
    }

    pub(crate) fn transfer_shares(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.ledger.transfer(from, to, amount)?;

        events.push(VaultEvent::SharesTransferred(SharesTransferred {
            vault: self.address,
            from: *from,
            to: *to,
            amount,
        }));
        Ok(())
    }

    pub(crate) fn mint_shares(
        &mut self,
        to: &Pubkey,
        amount: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.ledger.mint(to, amount)?;

        events.push(VaultEvent::SharesTransferred(SharesTransferred {
            vault: self.address,
            from: Pubkey::default(),
            to: *to,
            amount,
        }));
        Ok(())
    }

    /// Burn `shares` of `owner` on behalf of the caller, spending allowance
    /// when the caller is not the owner
    pub(crate) fn spend_shares(
        &mut self,
        env: &Env,
        owner: &Pubkey,
        shares: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        require!(*owner != Pubkey::default(), VaultError::InvalidSender);
        require!(
            self.ledger.balance_of(owner) >= shares,
            VaultError::InsufficientBalance
        );
        if env.caller != *owner {
            self.ledger.spend_allowance(owner, &env.caller, shares)?;
        }
        self.ledger.burn(owner, shares)?;

        events.push(VaultEvent::SharesTransferred(SharesTransferred {
            vault: self.address,
            from: *owner,
            to: Pubkey::default(),
            amount: shares,
        }));
        Ok(())
    }
}
