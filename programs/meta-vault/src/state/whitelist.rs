use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

use super::WhitelistProvider;

/// Depositor allow list that a vault owner can install as its whitelist
/// provider
#[account]
#[derive(Default, Debug)]
pub struct Whitelist {
    pub authority: Pubkey,
    pub entries: Vec<Pubkey>,
    pub bump: u8,
}

impl Whitelist {
    pub const SPACE: usize = 8 + 32 + 4 + MAX_WHITELIST_ENTRIES * 32 + 1;

    /// Add or remove `user`. Idempotent.
    pub fn set(&mut self, user: Pubkey, allowed: bool) -> Result<()> {
        let position = self.entries.iter().position(|e| *e == user);
        match (position, allowed) {
            (None, true) => {
                require!(
                    self.entries.len() < MAX_WHITELIST_ENTRIES,
                    VaultError::WhitelistFull
                );
                self.entries.push(user);
            }
            (Some(index), false) => {
                self.entries.swap_remove(index);
            }
            _ => {}
        }
        Ok(())
    }
}

impl WhitelistProvider for Whitelist {
    fn is_whitelisted(&self, user: &Pubkey) -> bool {
        self.entries.contains(user)
    }
}
