use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

use super::custody::transfer_to_custody;

/// Deposit assets into the vault and receive shares (`deposit` and `mint`)
///
/// Security checklist:
/// 1. SIGNER VALIDATION: User must be signer
/// 2. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// 3. WHITELIST: Provider account must be the one installed in the vault
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault.key().as_ref()],
        bump = vault.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// User's asset token account (source)
    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// Vault's token account
    #[account(
        mut,
        constraint = vault_token_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Installed whitelist provider; omit when the vault has none
    #[account(
        constraint = whitelist.key() == vault.config.whitelist_provider @ VaultError::NotWhitelisted,
    )]
    pub whitelist: Option<Account<'info, Whitelist>>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Deposit<'info> {
    fn pull_assets(&self, assets: u128) -> Result<()> {
        transfer_to_custody(
            self.token_program.to_account_info(),
            self.user_asset_account.to_account_info(),
            self.vault_token_account.to_account_info(),
            self.user.to_account_info(),
            assets,
        )
    }
}

pub fn deposit_handler(ctx: Context<Deposit>, assets: u128, receiver: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.user.key())?;
    let mut events = Vec::new();

    let whitelist = ctx
        .accounts
        .whitelist
        .as_deref()
        .map(|w| w as &dyn WhitelistProvider);
    ctx.accounts
        .vault
        .deposit(&env, whitelist, assets, receiver, &mut events)?;

    ctx.accounts.pull_assets(assets)?;

    emit_all(events);
    Ok(())
}

pub fn mint_handler(ctx: Context<Deposit>, shares: u128, receiver: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.user.key())?;
    let mut events = Vec::new();

    let whitelist = ctx
        .accounts
        .whitelist
        .as_deref()
        .map(|w| w as &dyn WhitelistProvider);
    let assets = ctx
        .accounts
        .vault
        .mint(&env, whitelist, shares, receiver, &mut events)?;

    ctx.accounts.pull_assets(assets)?;

    emit_all(events);
    Ok(())
}
