use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;
use anchor_spl::token::TokenAccount;

use crate::{constants::*, errors::*, state::*};

/// A sibling vault used as an allocation target, with its custody account and
/// custody authority
pub struct TargetAccounts<'info> {
    pub vault: Account<'info, MetaVault>,
    pub custody: Account<'info, TokenAccount>,
    pub authority: AccountInfo<'info>,
}

/// Number of targets described by `accounts` entries of `stride` accounts each
fn target_count(accounts: usize, stride: usize) -> Result<usize> {
    require!(
        accounts % stride == 0 && accounts / stride <= MAX_TARGETS_PER_CALL,
        VaultError::InvalidParamLength
    );
    Ok(accounts / stride)
}

fn target_authority(target: &Pubkey, bump: u8) -> Result<Pubkey> {
    Pubkey::create_program_address(&[VAULT_AUTHORITY_SEED, target.as_ref(), &[bump]], &crate::ID)
        .map_err(|_| error!(VaultError::InvalidOwner))
}

fn load_target_vault<'info>(
    vault: &MetaVault,
    info: &'info AccountInfo<'info>,
    seen: &mut Vec<Pubkey>,
) -> Result<Account<'info, MetaVault>> {
    // The vault can never be its own target, and each target appears once
    require!(
        *info.key != vault.address && !seen.contains(info.key),
        VaultError::InvalidTargetAllocation
    );
    seen.push(*info.key);

    let target = Account::<MetaVault>::try_from(info)?;
    require_keys_eq!(target.asset_mint, vault.asset_mint, VaultError::InvalidMint);
    Ok(target)
}

/// Load `(target vault, target custody, target authority)` triples from the
/// remaining accounts
pub fn load_targets<'info>(
    vault: &MetaVault,
    remaining: &'info [AccountInfo<'info>],
) -> Result<Vec<TargetAccounts<'info>>> {
    let mut seen = Vec::with_capacity(target_count(remaining.len(), 3)?);
    remaining
        .chunks_exact(3)
        .map(|chunk| {
            let target = load_target_vault(vault, &chunk[0], &mut seen)?;

            let authority = target_authority(chunk[0].key, target.authority_bump)?;
            require_keys_eq!(authority, *chunk[2].key, VaultError::InvalidOwner);

            let custody = Account::<TokenAccount>::try_from(&chunk[1])?;
            require_keys_eq!(custody.mint, vault.asset_mint, VaultError::InvalidMint);
            require_keys_eq!(custody.owner, authority, VaultError::InvalidOwner);

            Ok(TargetAccounts {
                vault: target,
                custody,
                authority: chunk[2].clone(),
            })
        })
        .collect()
}

/// Load target vaults only, for read-only use
pub fn load_target_vaults<'info>(
    vault: &MetaVault,
    remaining: &'info [AccountInfo<'info>],
) -> Result<Vec<Account<'info, MetaVault>>> {
    let mut seen = Vec::with_capacity(target_count(remaining.len(), 1)?);
    remaining
        .iter()
        .map(|info| load_target_vault(vault, info, &mut seen))
        .collect()
}

pub fn target_refs<'a>(targets: &'a mut [TargetAccounts<'_>]) -> Vec<&'a mut dyn TargetVault> {
    targets
        .iter_mut()
        .map(|t| &mut *t.vault as &mut dyn TargetVault)
        .collect()
}

/// Write target vault state back to their accounts
pub fn persist_targets(targets: &[TargetAccounts<'_>]) -> Result<()> {
    for target in targets {
        target.vault.exit(&crate::ID)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_target_count_bounds() {
        assert_eq!(target_count(0, 3).unwrap(), 0);
        assert_eq!(target_count(3 * MAX_TARGETS_PER_CALL, 3).unwrap(), MAX_TARGETS_PER_CALL);
        assert_eq!(target_count(MAX_TARGETS_PER_CALL, 1).unwrap(), MAX_TARGETS_PER_CALL);

        assert_eq!(target_count(4, 3).unwrap_err(), Error::from(VaultError::InvalidParamLength));
        assert_eq!(
            target_count(3 * (MAX_TARGETS_PER_CALL + 1), 3).unwrap_err(),
            Error::from(VaultError::InvalidParamLength)
        );
        assert_eq!(
            target_count(MAX_TARGETS_PER_CALL + 1, 1).unwrap_err(),
            Error::from(VaultError::InvalidParamLength)
        );
    }
}
