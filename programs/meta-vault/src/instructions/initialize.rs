use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, events::*, state::*};

/// Initialize a new meta vault over a given asset token
#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Vault account, pre-allocated by the client with `MetaVault::SPACE` bytes
    #[account(zero)]
    pub vault: Account<'info, MetaVault>,

    /// Asset token mint (the underlying token users deposit)
    pub asset_mint: Account<'info, Mint>,

    /// Vault authority PDA - owns the custody account
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account for holding assets
    #[account(
        init,
        payer = payer,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Initialize>,
    registry: Pubkey,
    owner: Pubkey,
    name: String,
    symbol: String,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let params = InitializeParams {
        address: ctx.accounts.vault.key(),
        asset_mint: ctx.accounts.asset_mint.key(),
        registry,
        owner,
        name,
        symbol,
        decimals: ctx.accounts.asset_mint.decimals,
        authority_bump: ctx.bumps.vault_authority,
    };

    let mut events = Vec::new();
    ctx.accounts.vault.initialize(params, now, &mut events)?;

    emit_all(events);
    Ok(())
}
