use anchor_lang::prelude::*;

use crate::{events::*, state::*};

/// Owner and pending-owner operations. Authorization is checked by the
/// engine against the signer.
#[derive(Accounts)]
pub struct Governance<'info> {
    pub signer: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,
}

pub fn set_fee_infos_handler(
    ctx: Context<Governance>,
    fee_recipient: Pubkey,
    management_fee: u128,
    performance_fee: u128,
    hurdle_rate: u128,
) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.set_fee_infos(
        &env,
        fee_recipient,
        management_fee,
        performance_fee,
        hurdle_rate,
        &mut events,
    )?;

    emit_all(events);
    Ok(())
}

pub fn set_deposit_limits_handler(
    ctx: Context<Governance>,
    user_deposit_limit: u128,
    vault_deposit_limit: u128,
) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.set_deposit_limits(
        &env,
        user_deposit_limit,
        vault_deposit_limit,
        &mut events,
    )?;

    emit_all(events);
    Ok(())
}

pub fn set_whitelist_provider_handler(ctx: Context<Governance>, provider: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts
        .vault
        .set_whitelist_provider(&env, provider, &mut events)?;

    emit_all(events);
    Ok(())
}

pub fn shutdown_handler(ctx: Context<Governance>) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.shutdown(&env, &mut events)?;
    msg!("Vault {} shut down", ctx.accounts.vault.key());

    emit_all(events);
    Ok(())
}

pub fn transfer_ownership_handler(ctx: Context<Governance>, new_owner: Pubkey) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts
        .vault
        .transfer_ownership(&env, new_owner, &mut events)?;

    emit_all(events);
    Ok(())
}

pub fn accept_ownership_handler(ctx: Context<Governance>) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.accept_ownership(&env, &mut events)?;

    emit_all(events);
    Ok(())
}

pub fn renounce_ownership_handler(ctx: Context<Governance>) -> Result<()> {
    let env = Env::current(ctx.accounts.signer.key())?;
    let mut events = Vec::new();

    ctx.accounts.vault.renounce_ownership(&env, &mut events)?;

    emit_all(events);
    Ok(())
}
