use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::{constants::*, math::to_token_amount};

/// Move `amount` of the asset into a vault custody account, signed by the
/// depositor
pub fn transfer_to_custody<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    custody: AccountInfo<'info>,
    depositor: AccountInfo<'info>,
    amount: u128,
) -> Result<()> {
    let amount = to_token_amount(amount)?;
    if amount == 0 {
        return Ok(());
    }

    let transfer_ctx = CpiContext::new(
        token_program,
        Transfer {
            from,
            to: custody,
            authority: depositor,
        },
    );
    token::transfer(transfer_ctx, amount)
}

/// Move `amount` out of the custody of `vault`, signed by its authority PDA
pub fn release_from_custody<'info>(
    token_program: AccountInfo<'info>,
    vault: &Pubkey,
    authority_bump: u8,
    custody: AccountInfo<'info>,
    to: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
    amount: u128,
) -> Result<()> {
    let amount = to_token_amount(amount)?;
    if amount == 0 {
        return Ok(());
    }

    let authority_seeds: &[&[u8]] = &[VAULT_AUTHORITY_SEED, vault.as_ref(), &[authority_bump]];
    let signer_seeds = &[authority_seeds];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program,
        Transfer {
            from: custody,
            to,
            authority: vault_authority,
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)
}
