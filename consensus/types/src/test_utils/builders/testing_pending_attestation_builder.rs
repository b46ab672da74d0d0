use crate::*;

/// Builds a `PendingAttestation` to be used for testing purposes.
///
/// This struct should **never be used for production purposes.**
pub struct TestingPendingAttestationBuilder {
    pending_attestation: PendingAttestation,
}

impl TestingPendingAttestationBuilder {
    /// Create a `PendingAttestation` for the committee at (`slot`, `index`) voting for
    /// `crosslink_data_root`.
    ///
    /// The shard is read from the state's committee cache, which must be built. The aggregation
    /// bitfield will be empty, it needs to be set with `Self::add_committee_participation`.
    pub fn new(
        state: &BeaconState,
        slot: Slot,
        index: CommitteeIndex,
        crosslink_data_root: Hash256,
        spec: &ChainSpec,
    ) -> Result<Self, BeaconStateError> {
        let committee = state.get_beacon_committee(slot, index, spec)?;

        let pending_attestation = PendingAttestation {
            aggregation_bits: vec![false; committee.committee.len()],
            data: AttestationData {
                slot,
                index,
                shard: committee.shard,
                crosslink_data_root,
            },
            inclusion_delay: 1,
            proposer_index: 0,
        };

        Ok(Self {
            pending_attestation,
        })
    }

    /// Sets the committee participation in the `PendingAttestation`.
    ///
    /// The `PendingAttestation` will appear to be signed by each committee member who's value in
    /// `signers` is true.
    pub fn add_committee_participation(&mut self, signers: Vec<bool>) -> &mut Self {
        self.pending_attestation.aggregation_bits = signers;
        self
    }

    /// Marks every committee member as having attested.
    pub fn full_participation(&mut self) -> &mut Self {
        self.pending_attestation
            .aggregation_bits
            .iter_mut()
            .for_each(|bit| *bit = true);
        self
    }

    pub fn inclusion(&mut self, inclusion_delay: u64, proposer_index: u64) -> &mut Self {
        self.pending_attestation.inclusion_delay = inclusion_delay;
        self.pending_attestation.proposer_index = proposer_index;
        self
    }

    /// Returns the `PendingAttestation`, consuming the builder.
    pub fn build(self) -> PendingAttestation {
        self.pending_attestation
    }
}
