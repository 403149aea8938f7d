use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

use super::custody::release_from_custody;

/// Exit against free idle assets (`withdraw` and `redeem`). The receiver is
/// the owner of `receiver_asset_account`.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share owner, or a spender with allowance from the owner
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

    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Withdraw<'info> {
    pub(crate) fn release_assets(&self, assets: u128) -> Result<()> {
        release_from_custody(
            self.token_program.to_account_info(),
            &self.vault.key(),
            self.vault.authority_bump,
            self.vault_token_account.to_account_info(),
            self.receiver_asset_account.to_account_info(),
            self.vault_authority.to_account_info(),
            assets,
        )
    }
}

pub fn withdraw_handler(ctx: Context<Withdraw>, assets: u128, owner: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let receiver = ctx.accounts.receiver_asset_account.owner;
    let mut events = Vec::new();

    ctx.accounts
        .vault
        .withdraw(&env, assets, receiver, owner, &mut events)?;

    ctx.accounts.release_assets(assets)?;

    emit_all(events);
    Ok(())
}

pub fn redeem_handler(ctx: Context<Withdraw>, shares: u128, owner: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let receiver = ctx.accounts.receiver_asset_account.owner;
    let mut events = Vec::new();

    let assets = ctx
        .accounts
        .vault
        .redeem(&env, shares, receiver, owner, &mut events)?;

    ctx.accounts.release_assets(assets)?;

    emit_all(events);
    Ok(())
}
