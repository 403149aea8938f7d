use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError, events::*};

use super::{Env, MetaVault};

/// Capability deciding whether an address may deposit
pub trait WhitelistProvider {
    fn is_whitelisted(&self, user: &Pubkey) -> bool;
}

/// Ownership, deposit ceilings and whitelist gating
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultConfig {
    pub owner: Pubkey,
    pub pending_owner: Pubkey,

    /// Ceiling on the asset value of a single holder's position
    pub user_deposit_limit: u128,

    /// Ceiling on the vault's total assets
    pub vault_deposit_limit: u128,

    /// `Pubkey::default()` means deposits are unrestricted
    pub whitelist_provider: Pubkey,
}

impl VaultConfig {
    pub const SPACE: usize = 32 + 32 + 16 + 16 + 32;

    pub fn ownership(&self) -> Ownership {
        if self.owner == Pubkey::default() {
            Ownership::Renounced
        } else if self.pending_owner != Pubkey::default() {
            Ownership::TransferPending
        } else {
            Ownership::Owned
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    TransferPending,
    Renounced,
}

/// Arguments of `MetaVault::initialize`
#[derive(Clone, Debug)]
pub struct InitializeParams {
    pub address: Pubkey,
    pub asset_mint: Pubkey,
    pub registry: Pubkey,
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub authority_bump: u8,
}

impl MetaVault {
    pub fn initialize(
        &mut self,
        params: InitializeParams,
        now: i64,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        require!(
            self.address == Pubkey::default() && self.config.owner == Pubkey::default(),
            VaultError::AlreadyInitialized
        );
        require!(params.owner != Pubkey::default(), VaultError::Unauthorized);
        require!(
            params.name.len() <= MAX_NAME_LEN && params.symbol.len() <= MAX_SYMBOL_LEN,
            VaultError::NameTooLong
        );

        self.address = params.address;
        self.asset_mint = params.asset_mint;
        self.registry = params.registry;
        self.name = params.name;
        self.symbol = params.symbol;
        self.decimals = params.decimals;
        self.authority_bump = params.authority_bump;
        self.config = VaultConfig {
            owner: params.owner,
            pending_owner: Pubkey::default(),
            user_deposit_limit: u128::MAX,
            vault_deposit_limit: u128::MAX,
            whitelist_provider: Pubkey::default(),
        };
        self.fees.high_water_mark = WAD;
        self.fees.high_water_mark_timestamp = now;
        self.fees.last_accrued_timestamp = now;
        self.fees.last_harvested_timestamp = now;

        events.push(VaultEvent::VaultInitialized(VaultInitialized {
            vault: self.address,
            owner: self.config.owner,
            asset_mint: self.asset_mint,
            registry: self.registry,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
        }));
        Ok(())
    }

    pub fn owner(&self) -> Pubkey {
        self.config.owner
    }

    pub fn pending_owner(&self) -> Pubkey {
        self.config.pending_owner
    }

    pub(crate) fn only_owner(&self, env: &Env) -> Result<()> {
        require!(
            self.config.owner != Pubkey::default() && env.caller == self.config.owner,
            VaultError::Unauthorized
        );
        Ok(())
    }

    /// Whether `user` passes the configured whitelist provider
    pub fn is_whitelisted(&self, whitelist: Option<&dyn WhitelistProvider>, user: &Pubkey) -> bool {
        if self.config.whitelist_provider == Pubkey::default() {
            return true;
        }
        whitelist.is_some_and(|provider| provider.is_whitelisted(user))
    }

    pub fn set_deposit_limits(
        &mut self,
        env: &Env,
        user_deposit_limit: u128,
        vault_deposit_limit: u128,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;

        self.config.user_deposit_limit = user_deposit_limit;
        self.config.vault_deposit_limit = vault_deposit_limit;

        events.push(VaultEvent::DepositLimitsUpdated(DepositLimitsUpdated {
            vault: self.address,
            user_deposit_limit,
            vault_deposit_limit,
        }));
        Ok(())
    }

    pub fn set_whitelist_provider(
        &mut self,
        env: &Env,
        provider: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;

        self.config.whitelist_provider = provider;

        events.push(VaultEvent::WhitelistProviderUpdated(WhitelistProviderUpdated {
            vault: self.address,
            provider,
        }));
        Ok(())
    }

    /// Stop accepting new capital. There is no way back.
    pub fn shutdown(&mut self, env: &Env, events: &mut Vec<VaultEvent>) -> Result<()> {
        self.only_owner(env)?;
        require!(!self.is_shutdown, VaultError::Shutdown);
        self.accrue_management_fee_shares(env.now)?;

        self.is_shutdown = true;

        events.push(VaultEvent::VaultShutdown(VaultShutdown {
            vault: self.address,
        }));
        Ok(())
    }

    /// Start a two-step transfer; passing the zero address cancels a pending one
    pub fn transfer_ownership(
        &mut self,
        env: &Env,
        new_owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<()> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;

        self.config.pending_owner = new_owner;

        events.push(VaultEvent::OwnershipTransferStarted(OwnershipTransferStarted {
            vault: self.address,
            previous_owner: self.config.owner,
            new_owner,
        }));
        Ok(())
    }

    pub fn accept_ownership(&mut self, env: &Env, events: &mut Vec<VaultEvent>) -> Result<()> {
        require!(
            self.config.pending_owner != Pubkey::default()
                && env.caller == self.config.pending_owner,
            VaultError::Unauthorized
        );
        self.accrue_management_fee_shares(env.now)?;

        let previous_owner = self.config.owner;
        self.config.owner = env.caller;
        self.config.pending_owner = Pubkey::default();

        events.push(VaultEvent::OwnershipTransferred(OwnershipTransferred {
            vault: self.address,
            previous_owner,
            new_owner: env.caller,
        }));
        Ok(())
    }

    /// Permanently disable every owner-gated operation
    pub fn renounce_ownership(&mut self, env: &Env, events: &mut Vec<VaultEvent>) -> Result<()> {
        self.only_owner(env)?;
        self.accrue_management_fee_shares(env.now)?;

        let previous_owner = self.config.owner;
        self.config.owner = Pubkey::default();
        self.config.pending_owner = Pubkey::default();

        events.push(VaultEvent::OwnershipTransferred(OwnershipTransferred {
            vault: self.address,
            previous_owner,
            new_owner: Pubkey::default(),
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    struct AllowList(Vec<Pubkey>);

    impl WhitelistProvider for AllowList {
        fn is_whitelisted(&self, user: &Pubkey) -> bool {
            self.0.contains(user)
        }
    }

    fn vault(owner: Pubkey) -> MetaVault {
        let mut vault = MetaVault::default();
        vault
            .initialize(
                InitializeParams {
                    address: Pubkey::new_unique(),
                    asset_mint: Pubkey::new_unique(),
                    registry: Pubkey::new_unique(),
                    owner,
                    name: "Meta USDC".to_string(),
                    symbol: "mUSDC".to_string(),
                    decimals: 6,
                    authority_bump: 255,
                },
                0,
                &mut Vec::new(),
            )
            .unwrap();
        vault
    }

    #[test]
    fn test_initialize_twice_fails() {
        let owner = Pubkey::new_unique();
        let mut vault = vault(owner);
        let err = vault
            .initialize(
                InitializeParams {
                    address: Pubkey::new_unique(),
                    asset_mint: Pubkey::new_unique(),
                    registry: Pubkey::new_unique(),
                    owner,
                    name: String::new(),
                    symbol: String::new(),
                    decimals: 6,
                    authority_bump: 255,
                },
                0,
                &mut Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::AlreadyInitialized));
    }

    #[test]
    fn test_two_step_ownership_state_machine() {
        let owner = Pubkey::new_unique();
        let next = Pubkey::new_unique();
        let mut vault = vault(owner);
        let mut events = Vec::new();
        assert_eq!(vault.config.ownership(), Ownership::Owned);

        vault
            .transfer_ownership(&Env::new(owner, 1), next, &mut events)
            .unwrap();
        assert_eq!(vault.config.ownership(), Ownership::TransferPending);
        // Current owner keeps its powers until acceptance
        assert_eq!(vault.owner(), owner);

        let err = vault
            .accept_ownership(&Env::new(owner, 2), &mut events)
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));

        vault.accept_ownership(&Env::new(next, 3), &mut events).unwrap();
        assert_eq!(vault.owner(), next);
        assert_eq!(vault.pending_owner(), Pubkey::default());
        assert_eq!(vault.config.ownership(), Ownership::Owned);
    }

    #[test]
    fn test_renounce_disables_owner_operations() {
        let owner = Pubkey::new_unique();
        let mut vault = vault(owner);
        let mut events = Vec::new();

        vault
            .renounce_ownership(&Env::new(owner, 1), &mut events)
            .unwrap();
        assert_eq!(vault.config.ownership(), Ownership::Renounced);

        let err = vault.shutdown(&Env::new(owner, 2), &mut events).unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));
        let err = vault
            .set_deposit_limits(&Env::new(Pubkey::default(), 2), 1, 1, &mut events)
            .unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));
    }

    #[test]
    fn test_whitelist_gating() {
        let owner = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut vault = vault(owner);

        // No provider installed: everyone passes
        assert!(vault.is_whitelisted(None, &bob));

        vault
            .set_whitelist_provider(&Env::new(owner, 1), Pubkey::new_unique(), &mut Vec::new())
            .unwrap();
        let list = AllowList(vec![alice]);
        assert!(vault.is_whitelisted(Some(&list), &alice));
        assert!(!vault.is_whitelisted(Some(&list), &bob));
        // Provider configured but not supplied
        assert!(!vault.is_whitelisted(None, &alice));
    }
}
