// Meta Vault - pooled asset vault allocating into sibling vaults on Solana
// Architecture: accounting engine on the vault account + thin instruction adapters
// Withdrawals beyond free idle go through a FIFO request/claim queue

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use instructions::*;

declare_id!("6HhAgQfu5ZgAJQ8gvJJt5DjaUW6BSLKcEs5n7rgq6v2s");

#[program]
pub mod meta_vault {
    use super::*;

    /// Initialize a pre-allocated vault account for a given asset token
    ///
    /// Security considerations:
    /// - Vault account must be zeroed (never initialized before)
    /// - Custody is an ATA owned by the vault authority PDA
    pub fn initialize(
        ctx: Context<Initialize>,
        registry: Pubkey,
        owner: Pubkey,
        name: String,
        symbol: String,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, registry, owner, name, symbol)
    }

    /// Add a target to the signer's registry
    pub fn add_target(ctx: Context<AddTarget>, target: Pubkey, name: String) -> Result<()> {
        instructions::add_target::handler(ctx, target, name)
    }

    /// Enable or disable a registry target without removing it
    pub fn toggle_target(ctx: Context<ToggleTarget>, target: Pubkey, enabled: bool) -> Result<()> {
        instructions::toggle_target::handler(ctx, target, enabled)
    }

    /// Add or remove a depositor from the signer's whitelist
    pub fn update_whitelist(
        ctx: Context<UpdateWhitelist>,
        user: Pubkey,
        allowed: bool,
    ) -> Result<()> {
        instructions::update_whitelist::handler(ctx, user, allowed)
    }

    /// Deposit assets and receive shares
    ///
    /// Security considerations:
    /// - Shutdown, whitelist and deposit ceilings checked by the engine
    /// - Assets pulled after the engine has booked the deposit
    pub fn deposit(ctx: Context<Deposit>, assets: u128, receiver: Pubkey) -> Result<()> {
        instructions::deposit::deposit_handler(ctx, assets, receiver)
    }

    /// Mint an exact amount of shares, paying the assets they cost
    pub fn mint(ctx: Context<Deposit>, shares: u128, receiver: Pubkey) -> Result<()> {
        instructions::deposit::mint_handler(ctx, shares, receiver)
    }

    /// Withdraw assets from free idle, burning the owner's shares
    pub fn withdraw(ctx: Context<Withdraw>, assets: u128, owner: Pubkey) -> Result<()> {
        instructions::withdraw::withdraw_handler(ctx, assets, owner)
    }

    /// Redeem shares against free idle
    pub fn redeem(ctx: Context<Withdraw>, shares: u128, owner: Pubkey) -> Result<()> {
        instructions::withdraw::redeem_handler(ctx, shares, owner)
    }

    /// Queue a withdrawal of assets; shares are burned now
    pub fn request_withdraw(
        ctx: Context<RequestExit>,
        assets: u128,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<()> {
        instructions::request::request_withdraw_handler(ctx, assets, receiver, owner)
    }

    /// Queue a redemption of shares; shares are burned now
    pub fn request_redeem(
        ctx: Context<RequestExit>,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<()> {
        instructions::request::request_redeem_handler(ctx, shares, receiver, owner)
    }

    /// Pay out a claimable request
    pub fn claim(ctx: Context<Claim>, withdraw_key: Pubkey) -> Result<()> {
        instructions::claim::handler(ctx, withdraw_key)
    }

    /// Allocate idle assets into registry-approved target vaults
    ///
    /// Security considerations:
    /// - Curator-only
    /// - Targets validated against the vault's registry
    /// - The vault can never be its own target
    pub fn allocate<'info>(
        ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
        assets: Vec<u128>,
    ) -> Result<()> {
        instructions::allocate::handler(ctx, assets)
    }

    /// Redeem target shares, settling now or registering a deferred key
    pub fn redeem_allocations<'info>(
        ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
        shares: Vec<u128>,
    ) -> Result<()> {
        instructions::reclaim::redeem_allocations_handler(ctx, shares)
    }

    /// Withdraw exact asset amounts from targets
    pub fn withdraw_allocations<'info>(
        ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
        assets: Vec<u128>,
    ) -> Result<()> {
        instructions::reclaim::withdraw_allocations_handler(ctx, assets)
    }

    /// Pull claimable deferred exits back into idle
    pub fn claim_allocations<'info>(
        ctx: Context<'_, '_, 'info, 'info, Reclaim<'info>>,
    ) -> Result<()> {
        instructions::reclaim::claim_allocations_handler(ctx)
    }

    /// Mint accrued fees to the fee recipient. Permissionless.
    pub fn harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
        instructions::harvest::handler(ctx)
    }

    pub fn set_fee_infos(
        ctx: Context<Governance>,
        fee_recipient: Pubkey,
        management_fee: u128,
        performance_fee: u128,
        hurdle_rate: u128,
    ) -> Result<()> {
        instructions::governance::set_fee_infos_handler(
            ctx,
            fee_recipient,
            management_fee,
            performance_fee,
            hurdle_rate,
        )
    }

    pub fn set_deposit_limits(
        ctx: Context<Governance>,
        user_deposit_limit: u128,
        vault_deposit_limit: u128,
    ) -> Result<()> {
        instructions::governance::set_deposit_limits_handler(
            ctx,
            user_deposit_limit,
            vault_deposit_limit,
        )
    }

    /// Install a whitelist provider; the zero address lifts the restriction
    pub fn set_whitelist_provider(ctx: Context<Governance>, provider: Pubkey) -> Result<()> {
        instructions::governance::set_whitelist_provider_handler(ctx, provider)
    }

    /// Stop new deposits for good. Exits stay open.
    pub fn shutdown(ctx: Context<Governance>) -> Result<()> {
        instructions::governance::shutdown_handler(ctx)
    }

    pub fn transfer_ownership(ctx: Context<Governance>, new_owner: Pubkey) -> Result<()> {
        instructions::governance::transfer_ownership_handler(ctx, new_owner)
    }

    pub fn accept_ownership(ctx: Context<Governance>) -> Result<()> {
        instructions::governance::accept_ownership_handler(ctx)
    }

    pub fn renounce_ownership(ctx: Context<Governance>) -> Result<()> {
        instructions::governance::renounce_ownership_handler(ctx)
    }

    pub fn transfer(ctx: Context<ShareAction>, to: Pubkey, amount: u128) -> Result<()> {
        instructions::shares::transfer_handler(ctx, to, amount)
    }

    pub fn approve(ctx: Context<ShareAction>, spender: Pubkey, amount: u128) -> Result<()> {
        instructions::shares::approve_handler(ctx, spender, amount)
    }

    pub fn transfer_from(
        ctx: Context<ShareAction>,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
    ) -> Result<()> {
        instructions::shares::transfer_from_handler(ctx, from, to, amount)
    }
}
