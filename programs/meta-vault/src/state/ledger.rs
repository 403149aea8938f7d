use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

/// Balance and authorization nonce of one share holder. Entries exist only
/// while the balance is non-zero.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct ShareAccount {
    pub owner: Pubkey,
    pub balance: u128,
    pub nonce: u64,
}

impl ShareAccount {
    pub const SPACE: usize = 32 + 16 + 8;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct Allowance {
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u128,
}

impl Allowance {
    pub const SPACE: usize = 32 + 32 + 16;
}

/// Fungible bookkeeping for vault shares.
///
/// Invariant: the sum of all balances equals `total_supply`. Every method
/// validates before it writes, so a failed call leaves the ledger untouched.
/// Emptied accounts are dropped so their slot can be reused; `nonce_floor`
/// lies above every nonce ever handed out, so a holder coming back never
/// sees a nonce it already used.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct ShareLedger {
    pub total_supply: u128,
    pub nonce_floor: u64,
    pub accounts: Vec<ShareAccount>,
    pub allowances: Vec<Allowance>,
}

impl ShareLedger {
    pub const SPACE: usize = 16
        + 8
        + 4
        + MAX_SHARE_ACCOUNTS * ShareAccount::SPACE
        + 4
        + MAX_ALLOWANCES * Allowance::SPACE;

    pub fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.find(owner).map_or(0, |a| a.balance)
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances
            .iter()
            .find(|a| a.owner == *owner && a.spender == *spender)
            .map_or(0, |a| a.amount)
    }

    /// Next unused authorization nonce of `owner`
    pub fn nonce(&self, owner: &Pubkey) -> u64 {
        self.find(owner).map_or(self.nonce_floor, |a| a.nonce)
    }

    /// Consume and return the current nonce of `owner`
    pub fn use_nonce(&mut self, owner: &Pubkey) -> Result<u64> {
        let nonce = self.nonce(owner);
        let next = nonce.checked_add(1).ok_or(VaultError::MathOverflow)?;
        self.advance_nonce(owner, next);
        Ok(nonce)
    }

    /// Move the nonce of `owner` to `next`, which the caller has already
    /// checked. Holders without an entry are covered by the floor.
    pub fn advance_nonce(&mut self, owner: &Pubkey, next: u64) {
        if let Some(account) = self.find_mut(owner) {
            account.nonce = next;
        }
        self.nonce_floor = self.nonce_floor.max(next);
    }

    pub fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
        require!(*to != Pubkey::default(), VaultError::InvalidReceiver);

        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.set_balance(to, balance)?;
        self.total_supply = total_supply;
        Ok(())
    }

    pub fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
        require!(*from != Pubkey::default(), VaultError::InvalidSender);

        let balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientBalance)?;
        let total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.set_balance(from, balance)?;
        self.total_supply = total_supply;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        require!(*from != Pubkey::default(), VaultError::InvalidSender);
        require!(*to != Pubkey::default(), VaultError::InvalidReceiver);

        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        // Only a new receiver entry can fail. An emptied sender frees a slot
        // for it, otherwise the receiver goes first so nothing is half-written.
        if from_balance == 0 {
            self.set_balance(from, from_balance)?;
            self.set_balance(to, to_balance)
        } else {
            self.set_balance(to, to_balance)?;
            self.set_balance(from, from_balance)
        }
    }

    pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) -> Result<()> {
        require!(*owner != Pubkey::default(), VaultError::InvalidApprover);
        require!(*spender != Pubkey::default(), VaultError::InvalidSpender);

        let position = self
            .allowances
            .iter()
            .position(|a| a.owner == *owner && a.spender == *spender);

        match (position, amount) {
            (Some(index), 0) => {
                self.allowances.swap_remove(index);
            }
            (Some(index), _) => self.allowances[index].amount = amount,
            (None, 0) => {}
            (None, _) => {
                require!(
                    self.allowances.len() < MAX_ALLOWANCES,
                    VaultError::LedgerFull
                );
                self.allowances.push(Allowance {
                    owner: *owner,
                    spender: *spender,
                    amount,
                });
            }
        }
        Ok(())
    }

    /// Deduct `amount` from the allowance `owner` granted `spender`.
    /// `u128::MAX` is an infinite allowance and is never decremented.
    pub fn spend_allowance(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) -> Result<()> {
        let current = self.allowance(owner, spender);
        if current == u128::MAX {
            return Ok(());
        }
        let remaining = current
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientAllowance)?;
        self.approve(owner, spender, remaining)
    }

    fn find(&self, owner: &Pubkey) -> Option<&ShareAccount> {
        self.accounts.iter().find(|a| a.owner == *owner)
    }

    fn find_mut(&mut self, owner: &Pubkey) -> Option<&mut ShareAccount> {
        self.accounts.iter_mut().find(|a| a.owner == *owner)
    }

    /// Write a balance, dropping the entry at zero and opening one otherwise
    fn set_balance(&mut self, owner: &Pubkey, balance: u128) -> Result<()> {
        let position = self.accounts.iter().position(|a| a.owner == *owner);

        match (position, balance) {
            (Some(index), 0) => {
                self.accounts.swap_remove(index);
            }
            (Some(index), _) => self.accounts[index].balance = balance,
            (None, 0) => {}
            (None, _) => {
                require!(
                    self.accounts.len() < MAX_SHARE_ACCOUNTS,
                    VaultError::LedgerFull
                );
                self.accounts.push(ShareAccount {
                    owner: *owner,
                    balance,
                    nonce: self.nonce_floor,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn funded(owner: &Pubkey, amount: u128) -> ShareLedger {
        let mut ledger = ShareLedger::default();
        ledger.mint(owner, amount).unwrap();
        ledger
    }

    #[test]
    fn test_mint_and_burn_track_supply() {
        let alice = Pubkey::new_unique();
        let mut ledger = funded(&alice, 1_000);
        assert_eq!(ledger.total_supply, 1_000);

        ledger.burn(&alice, 400).unwrap();
        assert_eq!(ledger.balance_of(&alice), 600);
        assert_eq!(ledger.total_supply, 600);

        let err = ledger.burn(&alice, 601).unwrap_err();
        assert_eq!(err, Error::from(VaultError::InsufficientBalance));
        assert_eq!(ledger.total_supply, 600);
    }

    #[test]
    fn test_transfer_moves_balance() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger = funded(&alice, 100);

        ledger.transfer(&alice, &bob, 30).unwrap();
        assert_eq!(ledger.balance_of(&alice), 70);
        assert_eq!(ledger.balance_of(&bob), 30);
        assert_eq!(ledger.total_supply, 100);

        // Self transfer is a no-op
        ledger.transfer(&bob, &bob, 30).unwrap();
        assert_eq!(ledger.balance_of(&bob), 30);
    }

    #[test]
    fn test_zero_address_rejected() {
        let alice = Pubkey::new_unique();
        let zero = Pubkey::default();
        let mut ledger = funded(&alice, 100);

        assert_eq!(
            ledger.transfer(&zero, &alice, 1).unwrap_err(),
            Error::from(VaultError::InvalidSender)
        );
        assert_eq!(
            ledger.transfer(&alice, &zero, 1).unwrap_err(),
            Error::from(VaultError::InvalidReceiver)
        );
        assert_eq!(
            ledger.approve(&zero, &alice, 1).unwrap_err(),
            Error::from(VaultError::InvalidApprover)
        );
        assert_eq!(
            ledger.approve(&alice, &zero, 1).unwrap_err(),
            Error::from(VaultError::InvalidSpender)
        );
        assert_eq!(
            ledger.mint(&zero, 1).unwrap_err(),
            Error::from(VaultError::InvalidReceiver)
        );
    }

    #[test]
    fn test_allowance_spending() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger = funded(&alice, 100);

        ledger.approve(&alice, &bob, 50).unwrap();
        ledger.spend_allowance(&alice, &bob, 20).unwrap();
        assert_eq!(ledger.allowance(&alice, &bob), 30);

        let err = ledger.spend_allowance(&alice, &bob, 31).unwrap_err();
        assert_eq!(err, Error::from(VaultError::InsufficientAllowance));

        // Spending the rest removes the entry
        ledger.spend_allowance(&alice, &bob, 30).unwrap();
        assert!(ledger.allowances.is_empty());

        ledger.approve(&alice, &bob, u128::MAX).unwrap();
        ledger.spend_allowance(&alice, &bob, 1_000).unwrap();
        assert_eq!(ledger.allowance(&alice, &bob), u128::MAX);
    }

    #[test]
    fn test_nonce_is_monotonic() {
        let alice = Pubkey::new_unique();
        let mut ledger = funded(&alice, 100);
        assert_eq!(ledger.use_nonce(&alice).unwrap(), 0);
        assert_eq!(ledger.use_nonce(&alice).unwrap(), 1);
        assert_eq!(ledger.nonce(&alice), 2);
    }

    #[test]
    fn test_emptied_accounts_free_their_slot() {
        let mut ledger = ShareLedger::default();
        for _ in 0..MAX_SHARE_ACCOUNTS * 2 {
            let holder = Pubkey::new_unique();
            ledger.mint(&holder, 10).unwrap();
            ledger.burn(&holder, 10).unwrap();
        }
        assert!(ledger.accounts.is_empty());

        let sink = Pubkey::new_unique();
        for _ in 0..MAX_SHARE_ACCOUNTS - 1 {
            let holder = Pubkey::new_unique();
            ledger.mint(&holder, 10).unwrap();
            ledger.transfer(&holder, &sink, 10).unwrap();
        }
        assert_eq!(ledger.accounts.len(), 1);
        assert_eq!(ledger.balance_of(&sink), 10 * (MAX_SHARE_ACCOUNTS as u128 - 1));
        assert_eq!(ledger.total_supply, ledger.balance_of(&sink));
    }

    #[test]
    fn test_full_ledger_rejects_new_holders_only() {
        let holders: Vec<Pubkey> = (0..MAX_SHARE_ACCOUNTS).map(|_| Pubkey::new_unique()).collect();
        let mut ledger = ShareLedger::default();
        for holder in &holders {
            ledger.mint(holder, 10).unwrap();
        }
        let newcomer = Pubkey::new_unique();

        let err = ledger.mint(&newcomer, 1).unwrap_err();
        assert_eq!(err, Error::from(VaultError::LedgerFull));
        let err = ledger.transfer(&holders[0], &newcomer, 1).unwrap_err();
        assert_eq!(err, Error::from(VaultError::LedgerFull));
        assert_eq!(ledger.balance_of(&holders[0]), 10);

        // Moving a whole balance hands the sender's slot to the receiver
        ledger.transfer(&holders[0], &newcomer, 10).unwrap();
        assert_eq!(ledger.balance_of(&newcomer), 10);
        assert_eq!(ledger.accounts.len(), MAX_SHARE_ACCOUNTS);
    }

    #[test]
    fn test_returning_holder_never_reuses_a_nonce() {
        let alice = Pubkey::new_unique();
        let mut ledger = funded(&alice, 100);
        assert_eq!(ledger.use_nonce(&alice).unwrap(), 0);
        assert_eq!(ledger.use_nonce(&alice).unwrap(), 1);

        ledger.burn(&alice, 100).unwrap();
        assert!(ledger.accounts.is_empty());
        assert_eq!(ledger.nonce(&alice), 2);

        ledger.mint(&alice, 5).unwrap();
        assert_eq!(ledger.use_nonce(&alice).unwrap(), 2);
    }
}
