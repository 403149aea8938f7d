use anchor_lang::prelude::*;

/// Event emitted when a vault is initialized
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub asset_mint: Pubkey,
    pub registry: Pubkey,
    pub name: String,
    pub symbol: String,
}

/// Event emitted when assets are deposited (deposit or mint)
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct Deposited {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u128,
    pub shares: u128,
}

/// Event emitted when assets leave the vault immediately (withdraw or redeem)
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub assets: u128,
    pub shares: u128,
}

/// Event emitted when a deferred withdrawal is queued
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawRequested {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub withdraw_key: Pubkey,
    pub assets: u128,
    pub shares: u128,
    pub cumulative_requested_withdrawal_assets: u128,
    pub timestamp: i64,
}

/// Event emitted when a queued withdrawal is paid out
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct Claimed {
    pub vault: Pubkey,
    pub withdraw_key: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u128,
}

/// Event emitted when idle assets are pushed into a target
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct Allocated {
    pub vault: Pubkey,
    pub target: Pubkey,
    pub assets: u128,
    pub shares: u128,
}

/// Event emitted when target shares are redeemed; `withdraw_key` is set when the
/// target deferred the exit
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRedeemed {
    pub vault: Pubkey,
    pub target: Pubkey,
    pub shares: u128,
    pub assets: u128,
    pub withdraw_key: Option<Pubkey>,
}

/// Event emitted when assets are withdrawn from a target
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationWithdrawn {
    pub vault: Pubkey,
    pub target: Pubkey,
    pub shares: u128,
    pub assets: u128,
    pub withdraw_key: Option<Pubkey>,
}

/// Event emitted when a deferred target withdrawal is pulled back into idle
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationClaimed {
    pub vault: Pubkey,
    pub target: Pubkey,
    pub withdraw_key: Pubkey,
    pub assets: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct FeeInfosUpdated {
    pub vault: Pubkey,
    pub fee_recipient: Pubkey,
    pub management_fee: u128,
    pub performance_fee: u128,
    pub hurdle_rate: u128,
}

/// Event emitted when accrued fee shares are minted to the fee recipient
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct FeesHarvested {
    pub vault: Pubkey,
    pub fee_recipient: Pubkey,
    pub management_fee_shares: u128,
    pub performance_fee_shares: u128,
    pub high_water_mark: u128,
    pub timestamp: i64,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct DepositLimitsUpdated {
    pub vault: Pubkey,
    pub user_deposit_limit: u128,
    pub vault_deposit_limit: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct WhitelistProviderUpdated {
    pub vault: Pubkey,
    pub provider: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct VaultShutdown {
    pub vault: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipTransferStarted {
    pub vault: Pubkey,
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipTransferred {
    pub vault: Pubkey,
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

/// Share ledger transfer; mints come from and burns go to the zero address
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct SharesTransferred {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u128,
}

/// Event emitted when a target is added to a registry
#[event]
pub struct TargetAdded {
    pub registry: Pubkey,
    pub target: Pubkey,
    pub name: String,
    pub timestamp: i64,
}

/// Event emitted when a registry target is toggled
#[event]
pub struct TargetToggled {
    pub registry: Pubkey,
    pub target: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

#[event]
pub struct WhitelistUpdated {
    pub whitelist: Pubkey,
    pub user: Pubkey,
    pub allowed: bool,
}

/// Engine-side record of a state transition, emitted by the instruction
/// handler once the operation has succeeded
#[derive(Debug, Clone, PartialEq)]
pub enum VaultEvent {
    VaultInitialized(VaultInitialized),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    WithdrawRequested(WithdrawRequested),
    Claimed(Claimed),
    Allocated(Allocated),
    AllocationRedeemed(AllocationRedeemed),
    AllocationWithdrawn(AllocationWithdrawn),
    AllocationClaimed(AllocationClaimed),
    FeeInfosUpdated(FeeInfosUpdated),
    FeesHarvested(FeesHarvested),
    DepositLimitsUpdated(DepositLimitsUpdated),
    WhitelistProviderUpdated(WhitelistProviderUpdated),
    VaultShutdown(VaultShutdown),
    OwnershipTransferStarted(OwnershipTransferStarted),
    OwnershipTransferred(OwnershipTransferred),
    SharesTransferred(SharesTransferred),
    Approval(Approval),
}

impl VaultEvent {
    pub fn emit(self) {
        match self {
            VaultEvent::VaultInitialized(e) => emit!(e),
            VaultEvent::Deposited(e) => emit!(e),
            VaultEvent::Withdrawn(e) => emit!(e),
            VaultEvent::WithdrawRequested(e) => emit!(e),
            VaultEvent::Claimed(e) => emit!(e),
            VaultEvent::Allocated(e) => emit!(e),
            VaultEvent::AllocationRedeemed(e) => emit!(e),
            VaultEvent::AllocationWithdrawn(e) => emit!(e),
            VaultEvent::AllocationClaimed(e) => emit!(e),
            VaultEvent::FeeInfosUpdated(e) => emit!(e),
            VaultEvent::FeesHarvested(e) => emit!(e),
            VaultEvent::DepositLimitsUpdated(e) => emit!(e),
            VaultEvent::WhitelistProviderUpdated(e) => emit!(e),
            VaultEvent::VaultShutdown(e) => emit!(e),
            VaultEvent::OwnershipTransferStarted(e) => emit!(e),
            VaultEvent::OwnershipTransferred(e) => emit!(e),
            VaultEvent::SharesTransferred(e) => emit!(e),
            VaultEvent::Approval(e) => emit!(e),
        }
    }
}

pub fn emit_all(events: Vec<VaultEvent>) {
    for event in events {
        event.emit();
    }
}
