mod builders;

pub use builders::{TestingBeaconStateBuilder, TestingPendingAttestationBuilder};
