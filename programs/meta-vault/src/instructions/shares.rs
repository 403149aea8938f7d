use anchor_lang::prelude::*;

use crate::{events::*, state::*};

/// Share ledger operations (`transfer`, `approve`, `transfer_from`)
#[derive(Accounts)]
pub struct ShareAction<'info> {
    pub signer: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,
}

pub fn transfer_handler(ctx: Context<ShareAction>, to: Pubkey, amount: u128) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.transfer(&env, to, amount, &mut events)?;

    emit_all(events);
    Ok(())
}

pub fn approve_handler(ctx: Context<ShareAction>, spender: Pubkey, amount: u128) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.approve(&env, spender, amount, &mut events)?;

    emit_all(events);
    Ok(())
}

pub fn transfer_from_handler(
    ctx: Context<ShareAction>,
    from: Pubkey,
    to: Pubkey,
    amount: u128,
) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts
        .vault
        .transfer_from(&env, from, to, amount, &mut events)?;

    emit_all(events);
    Ok(())
}
