use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

use super::{custody::release_from_custody, targets::*};

/// Pull assets back from target vaults (`redeem_allocations`,
/// `withdraw_allocations` and `claim_allocations`)
///
/// Remaining accounts: `(target vault, target custody, target authority)` per
/// target.
#[derive(Accounts)]
pub struct Reclaim<'info> {
    pub curator: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, MetaVault>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault.key().as_ref()],
        bump = vault.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account (destination)
    #[account(
        mut,
        constraint = vault_token_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Reclaim<'info> {
    /// Move `assets` from a target's custody into the vault's, signed by the
    /// target's authority
    fn pull_from(&self, target: &TargetAccounts<'info>, assets: u128) -> Result<()> {
        release_from_custody(
            self.token_program.to_account_info(),
            &target.vault.key(),
            target.vault.authority_bump,
            target.custody.to_account_info(),
            self.vault_token_account.to_account_info(),
            target.authority.clone(),
            assets,
        )
    }

    /// Move what each target settled immediately; deferred exits stay in the
    /// target until claimed
    fn pull_settled(&self, targets: &[TargetAccounts<'info>], receipts: &[ExitReceipt]) -> Result<()> {
        for (target, receipt) in targets.iter().zip(receipts) {
            if receipt.withdraw_key.is_none() {
                self.pull_from(target, receipt.assets)?;
            }
        }
        Ok(())
    }
}

pub fn redeem_allocations_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
    shares: Vec<u128>,
) -> Result<()> {
    let env = Env::current(ctx.accounts.curator.key())?;
    let mut targets = load_targets(&ctx.accounts.vault, ctx.remaining_accounts)?;
    let mut events = Vec::new();

    let receipts = {
        let mut refs = target_refs(&mut targets);
        ctx.accounts
            .vault
            .redeem_allocations(&env, &mut refs, &shares, &mut events)?
    };

    ctx.accounts.pull_settled(&targets, &receipts)?;
    persist_targets(&targets)?;

    let deferred = receipts.iter().filter(|r| r.withdraw_key.is_some()).count();
    msg!(
        "Redeemed from {} targets, {} deferred",
        receipts.len(),
        deferred
    );
    emit_all(events);
    Ok(())
}

pub fn withdraw_allocations_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
    assets: Vec<u128>,
) -> Result<()> {
    let env = Env::current(ctx.accounts.curator.key())?;
    let mut targets = load_targets(&ctx.accounts.vault, ctx.remaining_accounts)?;
    let mut events = Vec::new();

    let receipts = {
        let mut refs = target_refs(&mut targets);
        ctx.accounts
            .vault
            .withdraw_allocations(&env, &mut refs, &assets, &mut events)?
    };

    ctx.accounts.pull_settled(&targets, &receipts)?;
    persist_targets(&targets)?;

    let deferred = receipts.iter().filter(|r| r.withdraw_key.is_some()).count();
    msg!(
        "Withdrew from {} targets, {} deferred",
        receipts.len(),
        deferred
    );
    emit_all(events);
    Ok(())
}

pub fn claim_allocations_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
) -> Result<()> {
    let env = Env::current(ctx.accounts.curator.key())?;
    let mut targets = load_targets(&ctx.accounts.vault, ctx.remaining_accounts)?;
    let mut events = Vec::new();

    let pulled = {
        let mut refs = target_refs(&mut targets);
        ctx.accounts
            .vault
            .claim_allocations(&env, &mut refs, &mut events)?
    };

    let mut total = 0u128;
    for (target, (_, assets)) in targets.iter().zip(&pulled) {
        ctx.accounts.pull_from(target, *assets)?;
        total = total.saturating_add(*assets);
    }
    persist_targets(&targets)?;

    msg!(
        "Claimed {} assets, idle assets now {}",
        total,
        ctx.accounts.vault.idle_assets
    );
    emit_all(events);
    Ok(())
}
