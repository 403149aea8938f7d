// Constants for the Meta Vault program

/// Seed for the custody authority PDA of a vault
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for allocation target registry PDAs
pub const TARGET_REGISTRY_SEED: &[u8] = b"target_registry";

/// Seed for depositor whitelist PDAs
pub const WHITELIST_SEED: &[u8] = b"whitelist";

/// Domain separator for withdraw key derivation
pub const WITHDRAW_KEY_SEED: &[u8] = b"withdraw_key";

/// Fixed-point scale used for fee rates and share prices (1.0 == WAD)
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;

/// Upper bounds accepted by `set_fee_infos` (WAD-scaled)
pub const MAX_MANAGEMENT_FEE: u128 = WAD / 20; // 5% per year
pub const MAX_PERFORMANCE_FEE: u128 = WAD / 2; // 50% of profit
pub const MAX_HURDLE_RATE: u128 = WAD; // 100% per year

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;

/// Collection capacities of the vault account. A deserialized vault must stay
/// small enough that it and its targets share the 32 KiB program heap.
pub const MAX_SHARE_ACCOUNTS: usize = 64;
pub const MAX_ALLOWANCES: usize = 16;
pub const MAX_ALLOCATIONS: usize = 4;
pub const MAX_PENDING_KEYS: usize = 4;
pub const MAX_WITHDRAW_REQUESTS: usize = 24;

/// Target vaults one instruction may load from its remaining accounts
pub const MAX_TARGETS_PER_CALL: usize = 2;

pub const MAX_REGISTRY_TARGETS: usize = 10;
pub const MAX_WHITELIST_ENTRIES: usize = 100;
