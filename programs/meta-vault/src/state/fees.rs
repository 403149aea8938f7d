use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::VaultError,
    events::*,
    math::{mul_div, Rounding},
};

use super::{Env, MetaVault, TargetVault};

/// Fee configuration and accrual bookkeeping. Rates are WAD-scaled.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct FeeState {
    pub fee_recipient: Pubkey,

    /// Annualized fraction of total assets
    pub management_fee: u128,

    /// Fraction of profit above the hurdle-adjusted high-water mark
    pub performance_fee: u128,

    /// Annualized minimum return before performance fee applies
    pub hurdle_rate: u128,

    /// Highest post-fee share price recorded at harvest (assets per share, WAD)
    pub high_water_mark: u128,

    /// When the high-water mark was last raised; the hurdle compounds from here
    pub high_water_mark_timestamp: i64,

    pub last_accrued_timestamp: i64,
    pub last_harvested_timestamp: i64,

    /// Accrued, not yet minted
    pub next_management_fee_shares: u128,
    pub next_performance_fee_shares: u128,
}

impl FeeState {
    pub const SPACE: usize = 32 + 16 * 4 + 8 * 3 + 16 * 2;
}

impl MetaVault {
    /// Shares that dilute existing holders by exactly `fee_assets` out of
    /// `total_assets`: `supply * fee / (total - fee)`
    fn fee_assets_to_shares(&self, fee_assets: u128, total_assets: u128) -> Result<u128> {
        let remaining = total_assets
            .checked_sub(fee_assets)
            .ok_or(VaultError::MathOverflow)?;
        mul_div(self.effective_supply(), fee_assets, remaining, Rounding::Down)
    }

    /// Accrue management fee for the time elapsed since the last accrual.
    ///
    /// The timestamp only moves when shares were actually earned (or there is
    /// nothing to charge), so frequent calls cannot round the fee away.
    pub fn accrue_management_fee_shares(&mut self, now: i64) -> Result<u128> {
        let elapsed = now.saturating_sub(self.fees.last_accrued_timestamp);
        if elapsed <= 0 {
            return Ok(0);
        }

        let total_assets = self.total_assets();
        if self.fees.management_fee == 0 || total_assets == 0 || self.effective_supply() == 0 {
            self.fees.last_accrued_timestamp = now;
            return Ok(0);
        }

        let rate_time = self
            .fees
            .management_fee
            .checked_mul(elapsed as u128)
            .ok_or(VaultError::MathOverflow)?;
        let fee_assets = mul_div(total_assets, rate_time, WAD * SECONDS_PER_YEAR, Rounding::Down)?
            .min(total_assets - 1);
        let fee_shares = self.fee_assets_to_shares(fee_assets, total_assets)?;
        if fee_shares == 0 {
            return Ok(0);
        }

        self.fees.next_management_fee_shares = self
            .fees
            .next_management_fee_shares
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        self.fees.last_accrued_timestamp = now;
        Ok(fee_shares)
    }

    /// High-water mark grown by the hurdle rate over the time since the mark
    /// was set. Harvests that do not beat the floor leave the clock running.
    pub fn hurdle_floor(&self, now: i64) -> Result<u128> {
        let elapsed = now.saturating_sub(self.fees.high_water_mark_timestamp).max(0) as u128;
        let hurdle_time = self
            .fees
            .hurdle_rate
            .checked_mul(elapsed)
            .ok_or(VaultError::MathOverflow)?;
        let growth = mul_div(
            self.fees.high_water_mark,
            hurdle_time,
            WAD * SECONDS_PER_YEAR,
            Rounding::Up,
        )?;
        self.fees
            .high_water_mark
            .checked_add(growth)
            .ok_or(VaultError::MathOverflow.into())
    }

    /// Performance fee shares earned right now, and the post-fee share price
    /// when the hurdle floor was beaten
    fn performance_fee_shares(&self, now: i64) -> Result<(u128, Option<u128>)> {
        let supply = self.effective_supply();
        let total_assets = self.total_assets();
        if supply == 0 || total_assets == 0 {
            return Ok((0, None));
        }

        let price = mul_div(total_assets, WAD, supply, Rounding::Down)?;
        let floor = self.hurdle_floor(now)?;
        if price <= floor {
            return Ok((0, None));
        }

        let profit = mul_div(price - floor, supply, WAD, Rounding::Down)?;
        let fee_assets = mul_div(profit, self.fees.performance_fee, WAD, Rounding::Down)?;
        let fee_shares = if fee_assets > 0 && fee_assets < total_assets {
            self.fee_assets_to_shares(fee_assets, total_assets)?
        } else {
            0
        };

        let diluted_supply = supply
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        let post_fee_price = mul_div(total_assets, WAD, diluted_supply, Rounding::Down)?;
        Ok((fee_shares, Some(post_fee_price)))
    }

    /// Mark allocations to market, accrue both fees and mint the pending fee
    /// shares to the fee recipient.
    ///
    /// Permissionless. Only allocations whose target is supplied are marked.
    pub fn harvest(
        &mut self,
        env: &Env,
        targets: &[&dyn TargetVault],
        events: &mut Vec<VaultEvent>,
    ) -> Result<(u128, u128)> {
        self.mark_allocations(targets)?;
        self.accrue_management_fee_shares(env.now)?;

        // Snapshot price and supply before anything is minted
        let (performance_shares, post_fee_price) = self.performance_fee_shares(env.now)?;
        self.fees.next_performance_fee_shares = self
            .fees
            .next_performance_fee_shares
            .checked_add(performance_shares)
            .ok_or(VaultError::MathOverflow)?;
        if let Some(price) = post_fee_price.filter(|p| *p > self.fees.high_water_mark) {
            self.fees.high_water_mark = price;
            self.fees.high_water_mark_timestamp = env.now;
        }

        let management_shares = self.fees.next_management_fee_shares;
        let performance_shares = self.fees.next_performance_fee_shares;
        let fee_shares = management_shares
            .checked_add(performance_shares)
            .ok_or(VaultError::MathOverflow)?;
        if fee_shares > 0 {
            let recipient = self.fees.fee_recipient;
            require!(
                recipient != Pubkey::default(),
                VaultError::ManagementFeeTransfer
            );
            self.mint_shares(&recipient, fee_shares, events)
                .map_err(|_| error!(VaultError::ManagementFeeTransfer))?;
        }

        self.fees.next_management_fee_shares = 0;
        self.fees.next_performance_fee_shares = 0;
        self.fees.last_harvested_timestamp = env.now;

        events.push(VaultEvent::FeesHarvested(FeesHarvested {
            vault: self.address,
            fee_recipient: self.fees.fee_recipient,
            management_fee_shares: management_shares,
            performance_fee_shares: performance_shares,
            high_water_mark: self.fees.high_water_mark,
            timestamp: env.now,
        }));
        Ok((management_shares, performance_shares))
    }

    pub fn set_fee_infos(
        &mut self,
        env: &Env,
        fee_recipient: Pubkey,
        management_fee: u128,
        performance_fee: u128,
        hurdle_rate: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.only_owner(env)?;
        require!(
            management_fee <= MAX_MANAGEMENT_FEE
                && performance_fee <= MAX_PERFORMANCE_FEE
                && hurdle_rate <= MAX_HURDLE_RATE,
            VaultError::InvalidFeeInfo
        );
        require!(
            fee_recipient != Pubkey::default() || (management_fee == 0 && performance_fee == 0),
            VaultError::InvalidFeeInfo
        );

        // Settle time elapsed under the old rate first
        self.accrue_management_fee_shares(env.now)?;
        self.fees.last_accrued_timestamp = env.now;

        self.fees.fee_recipient = fee_recipient;
        self.fees.management_fee = management_fee;
        self.fees.performance_fee = performance_fee;
        self.fees.hurdle_rate = hurdle_rate;

        events.push(VaultEvent::FeeInfosUpdated(FeeInfosUpdated {
            vault: self.address,
            fee_recipient,
            management_fee,
            performance_fee,
            hurdle_rate,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_with(total_assets: u128, supply: u128) -> MetaVault {
        let mut vault = MetaVault {
            address: Pubkey::new_unique(),
            idle_assets: total_assets,
            ..Default::default()
        };
        vault.ledger.mint(&Pubkey::new_unique(), supply).unwrap();
        vault.fees.high_water_mark = WAD;
        vault.fees.fee_recipient = Pubkey::new_unique();
        vault
    }

    #[test]
    fn test_management_fee_one_year() {
        let mut vault = vault_with(1_000 * WAD, 1_000 * WAD);
        vault.fees.management_fee = WAD / 50; // 2%

        let shares = vault
            .accrue_management_fee_shares(SECONDS_PER_YEAR as i64)
            .unwrap();

        // 20 assets of 1000 taken as fee: 1000 * 20 / 980 shares
        assert_eq!(shares, 20_408_163_265_306_122_448);
        assert_eq!(vault.fees.next_management_fee_shares, shares);
        assert_eq!(vault.fees.last_accrued_timestamp, SECONDS_PER_YEAR as i64);

        // Fee holders now own exactly 2% of the vault
        let fee_value = vault.convert_to_assets(shares).unwrap();
        assert!(fee_value <= 20 * WAD && fee_value >= 20 * WAD - 1);
    }

    #[test]
    fn test_management_fee_tiny_interval_keeps_timestamp() {
        let mut vault = vault_with(10, 10);
        vault.fees.management_fee = WAD / 100;

        assert_eq!(vault.accrue_management_fee_shares(1).unwrap(), 0);
        // Nothing earned, so the clock is not advanced
        assert_eq!(vault.fees.last_accrued_timestamp, 0);
    }

    #[test]
    fn test_zero_rate_advances_timestamp() {
        let mut vault = vault_with(1_000, 1_000);
        assert_eq!(vault.accrue_management_fee_shares(100).unwrap(), 0);
        assert_eq!(vault.fees.last_accrued_timestamp, 100);
    }

    #[test]
    fn test_hurdle_floor_grows_with_time() {
        let mut vault = vault_with(1_000, 1_000);
        vault.fees.hurdle_rate = WAD / 10; // 10% per year

        assert_eq!(vault.hurdle_floor(0).unwrap(), WAD);
        assert_eq!(
            vault.hurdle_floor(SECONDS_PER_YEAR as i64).unwrap(),
            WAD + WAD / 10
        );
    }

    #[test]
    fn test_performance_fee_above_high_water_mark() {
        // Price 1.2 with no hurdle: 200 profit, 10% fee = 20 assets
        let mut vault = vault_with(1_200 * WAD, 1_000 * WAD);
        vault.fees.performance_fee = WAD / 10;

        let (shares, post_fee_price) = vault.performance_fee_shares(0).unwrap();
        // 1000 * 20 / 1180
        assert_eq!(shares, 16_949_152_542_372_881_355);
        let post_fee_price = post_fee_price.unwrap();
        assert!(post_fee_price > WAD && post_fee_price < 6 * WAD / 5);
    }

    #[test]
    fn test_frequent_harvests_do_not_restart_hurdle() {
        // 5% a year against a 10% hurdle, harvested daily
        let mut vault = vault_with(1_000 * WAD, 1_000 * WAD);
        vault.fees.performance_fee = WAD / 10;
        vault.fees.hurdle_rate = WAD / 10;
        let recipient = vault.fees.fee_recipient;
        let keeper = Pubkey::new_unique();
        let mut events = Vec::new();

        for day in 1..=365i64 {
            vault.idle_assets += 50 * WAD / 365;
            let (_, performance) = vault
                .harvest(&Env::new(keeper, day * 86_400), &[], &mut events)
                .unwrap();
            assert_eq!(performance, 0, "charged on day {}", day);
        }

        assert_eq!(vault.ledger.balance_of(&recipient), 0);
        assert_eq!(vault.fees.high_water_mark, WAD);
        assert_eq!(vault.fees.high_water_mark_timestamp, 0);
        assert_eq!(vault.fees.last_harvested_timestamp, 365 * 86_400);
    }

    #[test]
    fn test_beating_hurdle_resets_its_clock() {
        let mut vault = vault_with(1_000 * WAD, 1_000 * WAD);
        vault.fees.performance_fee = WAD / 10;
        vault.fees.hurdle_rate = WAD / 10;
        let year = SECONDS_PER_YEAR as i64;

        // Half a year in the price sits under the 1.05 floor
        vault.idle_assets += 40 * WAD;
        let env = Env::new(Pubkey::new_unique(), year / 2);
        let (_, performance) = vault.harvest(&env, &[], &mut Vec::new()).unwrap();
        assert_eq!(performance, 0);

        // A year in, 1.20 clears the 1.10 floor measured from the start
        vault.idle_assets += 160 * WAD;
        let env = Env::new(Pubkey::new_unique(), year);
        let (_, performance) = vault.harvest(&env, &[], &mut Vec::new()).unwrap();
        assert!(performance > 0);
        assert!(vault.fees.high_water_mark > WAD + WAD / 10);
        assert_eq!(vault.fees.high_water_mark_timestamp, year);
        assert_eq!(vault.hurdle_floor(year).unwrap(), vault.fees.high_water_mark);
    }

    #[test]
    fn test_no_performance_fee_below_hurdle() {
        let mut vault = vault_with(1_050 * WAD, 1_000 * WAD);
        vault.fees.performance_fee = WAD / 10;
        vault.fees.hurdle_rate = WAD / 10;

        // One year in: floor 1.10 beats price 1.05
        let (shares, price) = vault
            .performance_fee_shares(SECONDS_PER_YEAR as i64)
            .unwrap();
        assert_eq!(shares, 0);
        assert!(price.is_none());
    }
}
