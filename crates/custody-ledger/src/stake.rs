//! Required stake collaborator
//!
//! The ledger does not own staking rules. It asks a [`StakeRequirement`] how
//! much of an identity's deposit is committed, on every call that needs it.

use custody_core::{Amount, Identity, StakingConfig};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Source of the stake an identity must keep deposited
pub trait StakeRequirement: Send + Sync {
    /// Stake currently required of `identity`
    fn required_stake(&self, identity: &Identity) -> Amount;
}

/// Policy that never requires stake
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStake;

impl StakeRequirement for NoStake {
    fn required_stake(&self, _identity: &Identity) -> Amount {
        0
    }
}

#[derive(Debug, Default)]
struct SlotStakeState {
    required: bool,
    stake_per_slot: Amount,
    slots: HashMap<Identity, u64>,
}

/// `slot_count × stake_per_slot`, when staking is required
#[derive(Debug, Default)]
pub struct SlotStakePolicy {
    state: RwLock<SlotStakeState>,
}

impl SlotStakePolicy {
    /// Create a policy from configuration defaults
    pub fn new(config: &StakingConfig) -> Self {
        Self {
            state: RwLock::new(SlotStakeState {
                required: config.required,
                stake_per_slot: config.stake_per_slot,
                slots: HashMap::new(),
            }),
        }
    }

    /// Toggle whether slots require stake
    pub fn set_staking_required(&self, required: bool) {
        self.state.write().required = required;
        tracing::info!(required, "staking requirement changed");
    }

    /// Whether slots require stake
    pub fn is_staking_required(&self) -> bool {
        self.state.read().required
    }

    /// Change the stake per slot
    pub fn set_stake_per_slot(&self, stake_per_slot: Amount) {
        self.state.write().stake_per_slot = stake_per_slot;
        tracing::info!(stake_per_slot, "stake per slot changed");
    }

    /// Stake per slot
    pub fn stake_per_slot(&self) -> Amount {
        self.state.read().stake_per_slot
    }

    /// Record how many slots `identity` operates
    pub fn set_slot_count(&self, identity: Identity, slots: u64) {
        let mut state = self.state.write();
        if slots == 0 {
            state.slots.remove(&identity);
        } else {
            state.slots.insert(identity, slots);
        }
    }

    /// Slots operated by `identity`
    pub fn slot_count(&self, identity: &Identity) -> u64 {
        self.state.read().slots.get(identity).copied().unwrap_or(0)
    }
}

impl StakeRequirement for SlotStakePolicy {
    fn required_stake(&self, identity: &Identity) -> Amount {
        let state = self.state.read();
        if !state.required {
            return 0;
        }
        let slots = state.slots.get(identity).copied().unwrap_or(0);
        Amount::from(slots).saturating_mul(state.stake_per_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stake_only_applies_when_required() {
        let node = Identity::from_bytes([1; 20]);
        let policy = SlotStakePolicy::new(&StakingConfig {
            required: false,
            stake_per_slot: 10,
        });
        policy.set_slot_count(node, 20);
        assert_eq!(policy.required_stake(&node), 0);

        policy.set_staking_required(true);
        assert_eq!(policy.required_stake(&node), 200);

        policy.set_stake_per_slot(3);
        assert_eq!(policy.required_stake(&node), 60);
    }

    #[test]
    fn identities_without_slots_need_nothing() {
        let policy = SlotStakePolicy::new(&StakingConfig {
            required: true,
            stake_per_slot: 10,
        });
        assert_eq!(policy.required_stake(&Identity::from_bytes([2; 20])), 0);
    }
}
