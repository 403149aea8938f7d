use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Add a new target to the approved registry
#[derive(Accounts)]
pub struct AddTarget<'info> {
    /// Registry authority - only they can manage targets
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Target registry PDA
    /// Security: Initialized on first add_target call
    #[account(
        init_if_needed,
        payer = authority,
        space = TargetRegistry::SPACE,
        seeds = [TARGET_REGISTRY_SEED, authority.key().as_ref()],
        bump
    )]
    pub target_registry: Account<'info, TargetRegistry>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<AddTarget>, target: Pubkey, name: String) -> Result<()> {
    // CHECKS: Validate inputs
    require!(name.len() <= MAX_NAME_LEN, VaultError::NameTooLong);

    let registry = &mut ctx.accounts.target_registry;

    // Initialize registry if first time
    if registry.authority == Pubkey::default() {
        registry.authority = ctx.accounts.authority.key();
        registry.bump = ctx.bumps.target_registry;
        registry.approved_targets = Vec::new();
    }

    // Check if target already exists
    require!(
        !registry.approved_targets.iter().any(|t| t.target == target),
        VaultError::TargetAlreadyExists
    );

    require!(
        registry.approved_targets.len() < MAX_REGISTRY_TARGETS,
        VaultError::RegistryFull
    );

    // EFFECTS: Add target to registry
    registry.approved_targets.push(ApprovedTarget {
        target,
        enabled: true,
        name: name.clone(),
    });

    emit!(TargetAdded {
        registry: registry.key(),
        target,
        name,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
