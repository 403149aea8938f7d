use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

use super::{custody::release_from_custody, targets::*};

/// Allocate idle assets into approved target vaults
///
/// Remaining accounts: `(target vault, target custody, target authority)` per
/// target, in the order of `assets`.
///
/// Security considerations:
/// - Curator-only (engine checks the vault owner)
/// - Validates every target against the vault's registry
/// - Refuses the vault itself as a target
#[derive(Accounts)]
pub struct Allocate<'info> {
    pub curator: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,

    /// Registry the vault was initialized with
    #[account(address = vault.registry @ VaultError::InvalidTargetAllocation)]
    pub target_registry: Account<'info, TargetRegistry>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault.key().as_ref()],
        bump = vault.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account (source of allocation)
    #[account(
        mut,
        constraint = vault_token_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
    assets: Vec<u128>,
) -> Result<()> {
    let env = Env::current(ctx.accounts.curator.key())?;
    let mut targets = load_targets(&ctx.accounts.vault, ctx.remaining_accounts)?;
    let mut events = Vec::new();

    {
        let registry: &TargetRegistry = &ctx.accounts.target_registry;
        let mut refs = target_refs(&mut targets);
        ctx.accounts
            .vault
            .allocate(&env, registry, &mut refs, &assets, &mut events)?;
    }

    // INTERACTIONS: Move the allocated assets into target custody
    let accounts = &ctx.accounts;
    let vault_key = accounts.vault.key();
    for (target, &amount) in targets.iter().zip(&assets) {
        release_from_custody(
            accounts.token_program.to_account_info(),
            &vault_key,
            accounts.vault.authority_bump,
            accounts.vault_token_account.to_account_info(),
            target.custody.to_account_info(),
            accounts.vault_authority.to_account_info(),
            amount,
        )?;
    }
    persist_targets(&targets)?;

    msg!(
        "Allocated {} targets, idle assets now {}",
        targets.len(),
        accounts.vault.idle_assets
    );
    emit_all(events);
    Ok(())
}
