use anchor_lang::prelude::*;

use crate::constants::*;

pub mod access;
pub mod accounting;
pub mod allocation;
pub mod fees;
pub mod ledger;
pub mod registry;
pub mod whitelist;
pub mod withdraw_queue;

pub use access::*;
pub use allocation::*;
pub use fees::*;
pub use ledger::*;
pub use registry::*;
pub use whitelist::*;
pub use withdraw_queue::*;

/// Who is calling and when; supplied by the instruction handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Env {
    pub caller: Pubkey,
    pub now: i64,
}

impl Env {
    pub fn new(caller: Pubkey, now: i64) -> Self {
        Self { caller, now }
    }

    /// Environment for the current instruction, timestamped by the Clock sysvar
    pub fn current(caller: Pubkey) -> Result<Self> {
        Ok(Self::new(caller, Clock::get()?.unix_timestamp))
    }
}

/// The whole vault: share ledger, accounting, allocations, withdrawal queue,
/// fees and configuration.
///
/// The account is pre-allocated by the client with `MetaVault::SPACE` bytes.
/// Collections are bounded by the capacities in `constants.rs`.
#[account]
#[derive(Default, Debug)]
pub struct MetaVault {
    /// Address of this vault account, used as the holder identity in targets
    pub address: Pubkey,

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Registry approving allocation targets
    pub registry: Pubkey,

    pub name: String,
    pub symbol: String,
    pub decimals: u8,

    /// Bump seed for the custody authority PDA
    pub authority_bump: u8,

    pub config: VaultConfig,
    pub is_shutdown: bool,

    /// Asset balance held in custody, including assets owed to queued requests
    pub idle_assets: u128,

    /// Running total of assets ever requested through the queue
    pub cumulative_requested_withdrawal_assets: u128,

    /// Running total of assets ever paid out by claims
    pub cumulative_withdrawn_assets: u128,

    pub fees: FeeState,
    pub ledger: ShareLedger,
    pub allocations: Vec<Allocation>,
    pub withdraw_requests: Vec<WithdrawRequest>,
}

impl MetaVault {
    pub const SPACE: usize = 8 // discriminator
        + 32 // address
        + 32 // asset_mint
        + 32 // registry
        + 4 + MAX_NAME_LEN
        + 4 + MAX_SYMBOL_LEN
        + 1 // decimals
        + 1 // authority_bump
        + VaultConfig::SPACE
        + 1 // is_shutdown
        + 16 * 3 // idle + cumulative counters
        + FeeState::SPACE
        + ShareLedger::SPACE
        + 4 + MAX_ALLOCATIONS * Allocation::SPACE
        + 4 + MAX_WITHDRAW_REQUESTS * WithdrawRequest::SPACE;
}
