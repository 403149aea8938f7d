use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Toggle a target on/off in the registry
#[derive(Accounts)]
pub struct ToggleTarget<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [TARGET_REGISTRY_SEED, authority.key().as_ref()],
        bump = target_registry.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub target_registry: Account<'info, TargetRegistry>,
}

pub fn handler(ctx: Context<ToggleTarget>, target: Pubkey, enabled: bool) -> Result<()> {
    let registry = &mut ctx.accounts.target_registry;

    let entry = registry
        .get_target_mut(&target)
        .ok_or(VaultError::TargetNotFound)?;

    entry.enabled = enabled;

    emit!(TargetToggled {
        registry: registry.key(),
        target,
        enabled,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
