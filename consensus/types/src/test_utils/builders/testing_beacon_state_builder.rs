use crate::*;

pub const DEFAULT_EFFECTIVE_BALANCE: u64 = 32_000_000_000;

/// Builds a beacon state to be used for testing purposes.
///
/// This struct should **never be used for production purposes.**
pub struct TestingBeaconStateBuilder {
    state: BeaconState,
}

impl TestingBeaconStateBuilder {
    /// Creates a state with `validator_count` validators, all active from genesis with the default
    /// effective balance.
    ///
    /// Every RANDAO mix is derived from its position so that seeds differ between epochs.
    pub fn new(validator_count: usize, spec: &ChainSpec) -> Self {
        let validators = (0..validator_count)
            .map(|_| Validator {
                effective_balance: DEFAULT_EFFECTIVE_BALANCE,
                activation_epoch: spec.genesis_epoch,
                exit_epoch: spec.far_future_epoch,
                slashed: false,
            })
            .collect();

        let randao_mixes = (0..spec.epochs_per_historical_vector)
            .map(|i| Hash256::from_low_u64_le(i as u64 + 1))
            .collect();

        Self {
            state: BeaconState::new(validators, randao_mixes, spec),
        }
    }

    /// Moves the state to the first slot of `epoch`.
    pub fn teleport_to_epoch(&mut self, epoch: Epoch, spec: &ChainSpec) {
        self.state.slot = epoch.start_slot(spec.slots_per_epoch);
        self.state.drop_committee_caches();
    }

    /// Moves the state to `slot`.
    pub fn teleport_to_slot(&mut self, slot: Slot) {
        self.state.slot = slot;
        self.state.drop_committee_caches();
    }

    /// Sets the effective balance of every validator.
    pub fn set_effective_balances(&mut self, balance: u64) {
        self.state
            .validators
            .iter_mut()
            .for_each(|v| v.effective_balance = balance);
    }

    /// Gives mutable access to the validator registry.
    pub fn validators_mut(&mut self) -> &mut Vec<Validator> {
        &mut self.state.validators
    }

    /// Replaces every RANDAO mix with `mix`.
    pub fn set_randao_mixes(&mut self, mix: Hash256) {
        self.state.randao_mixes.iter_mut().for_each(|m| *m = mix);
    }

    /// Builds the previous, current and next committee caches.
    pub fn build_caches(&mut self, spec: &ChainSpec) -> Result<(), BeaconStateError> {
        self.state.build_all_committee_caches(spec)
    }

    /// Returns the state, consuming the builder.
    pub fn build(self) -> BeaconState {
        self.state
    }
}
