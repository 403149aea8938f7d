use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

use crate::{constants::*, errors::VaultError, events::*};

use super::{Env, MetaVault};

/// A queued withdrawal. Shares are burned when the request is made, so the
/// owed assets are fixed at the request-time exchange rate.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct WithdrawRequest {
    pub key: Pubkey,
    pub requested_assets: u128,

    /// Running total of requested assets up to and including this request;
    /// its FIFO position
    pub cumulative_requested_withdrawal_assets: u128,

    pub request_timestamp: i64,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub is_claimed: bool,
}

impl WithdrawRequest {
    pub const SPACE: usize = 32 + 16 + 16 + 8 + 32 + 32 + 1;
}

impl MetaVault {
    /// Deterministic key of the `nonce`-th request made by `user` in this vault
    pub fn get_withdraw_key(&self, user: &Pubkey, nonce: u64) -> Pubkey {
        let mut hasher = Sha256::new();
        hasher.update(WITHDRAW_KEY_SEED);
        hasher.update(self.address.as_ref());
        hasher.update(user.as_ref());
        hasher.update(nonce.to_le_bytes());
        Pubkey::new_from_array(hasher.finalize().into())
    }

    /// Requests queued and not yet claimed
    pub fn open_withdraw_requests(&self) -> usize {
        self.withdraw_requests.iter().filter(|r| !r.is_claimed).count()
    }

    pub fn withdraw_request(&self, key: &Pubkey) -> Option<&WithdrawRequest> {
        self.withdraw_requests.iter().find(|r| r.key == *key)
    }

    /// Largest asset amount `owner` can queue
    pub fn max_request_withdraw(&self, owner: &Pubkey) -> Result<u128> {
        self.convert_to_assets(self.ledger.balance_of(owner))
    }

    /// Largest share amount `owner` can queue
    pub fn max_request_redeem(&self, owner: &Pubkey) -> u128 {
        self.ledger.balance_of(owner)
    }

    /// True once idle assets plus everything already paid out reach the
    /// request's position in the queue
    pub fn is_claimable(&self, key: &Pubkey) -> bool {
        let Some(request) = self.withdraw_request(key) else {
            return false;
        };
        if request.is_claimed {
            return false;
        }
        let covered = self
            .cumulative_withdrawn_assets
            .saturating_add(self.idle_assets);
        request.cumulative_requested_withdrawal_assets <= covered
    }

    /// Queue a withdrawal of `assets`, burning the shares it costs now
    pub fn request_withdraw(
        &mut self,
        env: &Env,
        assets: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<Pubkey> {
        self.accrue_management_fee_shares(env.now)?;

        require!(assets > 0, VaultError::ZeroShares);
        require!(
            assets <= self.max_request_withdraw(&owner)?,
            VaultError::ExceededMaxRequestWithdraw
        );

        let shares = self.preview_withdraw(assets)?;
        self.enqueue(env, assets, shares, receiver, owner, events)
    }

    /// Queue a redemption of `shares`, burning them now
    pub fn request_redeem(
        &mut self,
        env: &Env,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<Pubkey> {
        self.accrue_management_fee_shares(env.now)?;

        require!(shares > 0, VaultError::ZeroShares);
        require!(
            shares <= self.max_request_redeem(&owner),
            VaultError::ExceededMaxRequestRedeem
        );

        let assets = self.preview_redeem(shares)?;
        require!(assets > 0, VaultError::ZeroAssets);
        self.enqueue(env, assets, shares, receiver, owner, events)
    }

    fn enqueue(
        &mut self,
        env: &Env,
        assets: u128,
        shares: u128,
        receiver: Pubkey,
        owner: Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<Pubkey> {
        require!(receiver != Pubkey::default(), VaultError::InvalidReceiver);
        require!(
            self.open_withdraw_requests() < MAX_WITHDRAW_REQUESTS,
            VaultError::QueueFull
        );
        let cumulative = self
            .cumulative_requested_withdrawal_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        let nonce = self.ledger.nonce(&owner);
        let next_nonce = nonce.checked_add(1).ok_or(VaultError::MathOverflow)?;

        self.spend_shares(env, &owner, shares, events)?;
        self.ledger.advance_nonce(&owner, next_nonce);
        let key = self.get_withdraw_key(&owner, nonce);

        // Settled records only matter for lookups; drop them to make room
        if self.withdraw_requests.len() >= MAX_WITHDRAW_REQUESTS {
            self.withdraw_requests.retain(|r| !r.is_claimed);
        }
        self.cumulative_requested_withdrawal_assets = cumulative;
        self.withdraw_requests.push(WithdrawRequest {
            key,
            requested_assets: assets,
            cumulative_requested_withdrawal_assets: cumulative,
            request_timestamp: env.now,
            owner,
            receiver,
            is_claimed: false,
        });

        events.push(VaultEvent::WithdrawRequested(WithdrawRequested {
            vault: self.address,
            caller: env.caller,
            receiver,
            owner,
            withdraw_key: key,
            assets,
            shares,
            cumulative_requested_withdrawal_assets: cumulative,
            timestamp: env.now,
        }));
        Ok(key)
    }

    /// Settle a claimable request. Returns the receiver and the assets owed to
    /// it; the caller moves the tokens.
    pub fn claim(
        &mut self,
        env: &Env,
        key: &Pubkey,
        events: &mut Vec<VaultEvent>,
    ) -> Result<(Pubkey, u128)> {
        self.accrue_management_fee_shares(env.now)?;

        let request = self
            .withdraw_request(key)
            .ok_or(VaultError::InvalidWithdrawKey)?;
        require!(
            env.caller == request.owner || env.caller == request.receiver,
            VaultError::InvalidCaller
        );
        require!(self.is_claimable(key), VaultError::NotClaimable);

        let (receiver, assets) = (request.receiver, request.requested_assets);
        let idle_assets = self
            .idle_assets
            .checked_sub(assets)
            .ok_or(VaultError::NotClaimable)?;
        let withdrawn = self
            .cumulative_withdrawn_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;

        if let Some(request) = self.withdraw_requests.iter_mut().find(|r| r.key == *key) {
            request.is_claimed = true;
        }
        self.idle_assets = idle_assets;
        self.cumulative_withdrawn_assets = withdrawn;

        events.push(VaultEvent::Claimed(Claimed {
            vault: self.address,
            withdraw_key: *key,
            caller: env.caller,
            receiver,
            assets,
        }));
        Ok((receiver, assets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_key_is_deterministic() {
        let vault = MetaVault {
            address: Pubkey::new_unique(),
            ..Default::default()
        };
        let user = Pubkey::new_unique();

        assert_eq!(vault.get_withdraw_key(&user, 0), vault.get_withdraw_key(&user, 0));
        assert_ne!(vault.get_withdraw_key(&user, 0), vault.get_withdraw_key(&user, 1));
        assert_ne!(
            vault.get_withdraw_key(&user, 0),
            vault.get_withdraw_key(&Pubkey::new_unique(), 0)
        );

        // Keys are scoped to the vault
        let other = MetaVault {
            address: Pubkey::new_unique(),
            ..Default::default()
        };
        assert_ne!(vault.get_withdraw_key(&user, 0), other.get_withdraw_key(&user, 0));
    }

    #[test]
    fn test_withdraw_key_is_sha256_of_seeded_preimage() {
        let vault = MetaVault {
            address: Pubkey::new_unique(),
            ..Default::default()
        };
        let user = Pubkey::new_unique();

        let mut preimage = WITHDRAW_KEY_SEED.to_vec();
        preimage.extend_from_slice(vault.address.as_ref());
        preimage.extend_from_slice(user.as_ref());
        preimage.extend_from_slice(&7u64.to_le_bytes());
        let digest: [u8; 32] = Sha256::digest(&preimage).into();

        assert_eq!(vault.get_withdraw_key(&user, 7), Pubkey::new_from_array(digest));
    }

    #[test]
    fn test_unknown_key_is_not_claimable() {
        let vault = MetaVault {
            idle_assets: 1_000,
            ..Default::default()
        };
        assert!(!vault.is_claimable(&Pubkey::new_unique()));
    }
}
