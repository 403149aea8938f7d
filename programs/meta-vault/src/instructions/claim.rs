use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

use super::custody::release_from_custody;

/// Pay out a claimable withdrawal request to its receiver
#[derive(Accounts)]
pub struct Claim<'info> {
    /// Request owner or receiver
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault.key().as_ref()],
        bump = vault.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Must belong to the receiver recorded in the request
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Claim>, withdraw_key: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let mut events = Vec::new();

    let (receiver, assets) = ctx
        .accounts
        .vault
        .claim(&env, &withdraw_key, &mut events)?;
    require_keys_eq!(
        ctx.accounts.receiver_asset_account.owner,
        receiver,
        VaultError::InvalidReceiver
    );

    let accounts = &ctx.accounts;
    release_from_custody(
        accounts.token_program.to_account_info(),
        &accounts.vault.key(),
        accounts.vault.authority_bump,
        accounts.vault_token_account.to_account_info(),
        accounts.receiver_asset_account.to_account_info(),
        accounts.vault_authority.to_account_info(),
        assets,
    )?;

    emit_all(events);
    Ok(())
}
