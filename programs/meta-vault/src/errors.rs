use anchor_lang::prelude::*;

/// Custom error codes for the Meta Vault program
#[error_code]
pub enum VaultError {
    // Validation
    #[msg("Asset amount must be greater than zero")]
    ZeroAssets,

    #[msg("Share amount must be greater than zero")]
    ZeroShares,

    #[msg("Targets and amounts must have the same length")]
    InvalidParamLength,

    #[msg("Deposit exceeds the maximum allowed for the receiver")]
    ExceededMaxDeposit,

    #[msg("Mint exceeds the maximum allowed for the receiver")]
    ExceededMaxMint,

    #[msg("Withdraw exceeds the owner's immediately available assets")]
    ExceededMaxWithdraw,

    #[msg("Redeem exceeds the owner's immediately redeemable shares")]
    ExceededMaxRedeem,

    #[msg("Withdraw request exceeds the owner's asset-equivalent balance")]
    ExceededMaxRequestWithdraw,

    #[msg("Redeem request exceeds the owner's share balance")]
    ExceededMaxRequestRedeem,

    #[msg("Fee configuration out of bounds")]
    InvalidFeeInfo,

    #[msg("Name or symbol too long")]
    NameTooLong,

    // Capacity / state
    #[msg("Vault is shut down")]
    Shutdown,

    #[msg("Allocation exceeds free idle assets or allocation capacity")]
    OverAllocation,

    #[msg("Target is not an approved allocation destination")]
    InvalidTargetAllocation,

    #[msg("Exit exceeds the shares held in the target")]
    InsufficientAllocation,

    #[msg("Withdraw request is not claimable")]
    NotClaimable,

    #[msg("Unknown withdraw key")]
    InvalidWithdrawKey,

    #[msg("Vault already initialized")]
    AlreadyInitialized,

    #[msg("Share ledger is full")]
    LedgerFull,

    #[msg("Withdraw queue is full")]
    QueueFull,

    // Authorization
    #[msg("Unauthorized - only the vault owner can perform this action")]
    Unauthorized,

    #[msg("Caller is neither the owner nor the receiver of the request")]
    InvalidCaller,

    #[msg("Address is not whitelisted for deposits")]
    NotWhitelisted,

    // Arithmetic
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero")]
    DivisionByZero,

    // Share ledger
    #[msg("Invalid sender")]
    InvalidSender,

    #[msg("Invalid receiver")]
    InvalidReceiver,

    #[msg("Invalid approver")]
    InvalidApprover,

    #[msg("Invalid spender")]
    InvalidSpender,

    #[msg("Insufficient share balance")]
    InsufficientBalance,

    #[msg("Insufficient share allowance")]
    InsufficientAllowance,

    #[msg("Fee shares cannot be minted to the fee recipient")]
    ManagementFeeTransfer,

    // Token accounts
    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    // Collaborator accounts
    #[msg("Target already exists in registry")]
    TargetAlreadyExists,

    #[msg("Target not found in registry")]
    TargetNotFound,

    #[msg("Target registry is full")]
    RegistryFull,

    #[msg("Whitelist is full")]
    WhitelistFull,
}
