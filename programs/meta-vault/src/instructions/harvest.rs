use anchor_lang::prelude::*;

use crate::{events::*, state::*};

use super::targets::load_target_vaults;

/// Mint accrued management and performance fees to the fee recipient.
/// Permissionless.
///
/// Remaining accounts: target vaults to mark to market before the
/// performance fee is computed.
#[derive(Accounts)]
pub struct Harvest<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let targets = load_target_vaults(&ctx.accounts.vault, ctx.remaining_accounts)?;
    let refs: Vec<&dyn TargetVault> = targets
        .iter()
        .map(|t| &**t as &dyn TargetVault)
        .collect();
    let mut events = Vec::new();

    let (management_shares, performance_shares) =
        ctx.accounts.vault.harvest(&env, &refs, &mut events)?;

    msg!(
        "Harvested fees: management={} performance={} hwm={}",
        management_shares,
        performance_shares,
        ctx.accounts.vault.fees.high_water_mark
    );
    emit_all(events);
    Ok(())
}
