use anchor_lang::prelude::*;

use crate::constants::*;

use super::AllocationRegistry;

/// Registry of approved allocation targets
///
/// Curators can only allocate into targets listed and enabled here. A target
/// can be disabled without removing it, which blocks new allocations while
/// leaving existing positions redeemable.
#[account]
#[derive(Default, Debug)]
pub struct TargetRegistry {
    /// Authority allowed to add and toggle targets
    pub authority: Pubkey,

    pub approved_targets: Vec<ApprovedTarget>,

    /// Bump seed for PDA
    pub bump: u8,
}

/// Individual approved target entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ApprovedTarget {
    /// Address of the target vault account
    pub target: Pubkey,

    /// Whether new allocations into this target are allowed
    pub enabled: bool,

    /// Human-readable name
    pub name: String,
}

impl ApprovedTarget {
    pub const SPACE: usize = 32 + 1 + 4 + MAX_NAME_LEN;
}

impl TargetRegistry {
    /// 8 (discriminator) + 32 (authority) + 4 (vec len) + entries + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + MAX_REGISTRY_TARGETS * ApprovedTarget::SPACE + 1;

    /// Check if a target is approved and enabled
    pub fn is_target_approved(&self, target: &Pubkey) -> bool {
        self.approved_targets
            .iter()
            .any(|t| t.target == *target && t.enabled)
    }

    /// Get mutable target entry
    pub fn get_target_mut(&mut self, target: &Pubkey) -> Option<&mut ApprovedTarget> {
        self.approved_targets
            .iter_mut()
            .find(|t| t.target == *target)
    }
}

impl AllocationRegistry for TargetRegistry {
    fn is_approved(&self, target: &Pubkey) -> bool {
        self.is_target_approved(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_target_is_not_approved() {
        let target = Pubkey::new_unique();
        let mut registry = TargetRegistry {
            approved_targets: vec![ApprovedTarget {
                target,
                enabled: true,
                name: "Stable Yield".to_string(),
            }],
            ..Default::default()
        };
        assert!(registry.is_approved(&target));
        assert!(!registry.is_approved(&Pubkey::new_unique()));

        registry.get_target_mut(&target).unwrap().enabled = false;
        assert!(!registry.is_approved(&target));
    }
}
