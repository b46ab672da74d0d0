mod testing_beacon_state_builder;
mod testing_pending_attestation_builder;

pub use testing_beacon_state_builder::TestingBeaconStateBuilder;
pub use testing_pending_attestation_builder::TestingPendingAttestationBuilder;
