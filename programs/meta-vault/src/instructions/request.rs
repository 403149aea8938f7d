use anchor_lang::prelude::*;

use crate::{events::*, state::*};

/// Queue a deferred exit (`request_withdraw` and `request_redeem`). Shares are
/// burned now; assets move at `claim`.
#[derive(Accounts)]
pub struct RequestExit<'info> {
    /// Share owner, or a spender with allowance from the owner
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,
}

pub fn request_withdraw_handler(
    ctx: Context<RequestExit>,
    assets: u128,
    receiver: Pubkey,
    owner: Pubkey,
) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let mut events = Vec::new();

    let key = ctx
        .accounts
        .vault
        .request_withdraw(&env, assets, receiver, owner, &mut events)?;
    msg!("Withdraw requested: key={} assets={}", key, assets);

    emit_all(events);
    Ok(())
}

pub fn request_redeem_handler(
    ctx: Context<RequestExit>,
    shares: u128,
    receiver: Pubkey,
    owner: Pubkey,
) -> Result<()> {
    let env = Env::current(ctx.accounts.caller.key())?;
    let mut events = Vec::new();

    let key = ctx
        .accounts
        .vault
        .request_redeem(&env, shares, receiver, owner, &mut events)?;
    msg!("Redeem requested: key={} shares={}", key, shares);

    emit_all(events);
    Ok(())
}
