use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Add or remove a depositor from the authority's whitelist
#[derive(Accounts)]
pub struct UpdateWhitelist<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Whitelist PDA, created on first use
    #[account(
        init_if_needed,
        payer = authority,
        space = Whitelist::SPACE,
        seeds = [WHITELIST_SEED, authority.key().as_ref()],
        bump
    )]
    pub whitelist: Account<'info, Whitelist>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<UpdateWhitelist>, user: Pubkey, allowed: bool) -> Result<()> {
    let whitelist = &mut ctx.accounts.whitelist;

    if whitelist.authority == Pubkey::default() {
        whitelist.authority = ctx.accounts.authority.key();
        whitelist.bump = ctx.bumps.whitelist;
    }

    whitelist.set(user, allowed)?;

    emit!(WhitelistUpdated {
        whitelist: whitelist.key(),
        user,
        allowed,
    });

    Ok(())
}
