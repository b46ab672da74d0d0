use crate::*;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};

/// Each of the domains used to separate seeds derived from the same RANDAO mix.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Domain {
    BeaconAttester,
}

/// Holds all the "constants" for a BeaconChain.
///
/// A `ChainSpec` is built once at start-up and passed by reference into every function that needs
/// it. Presets are obtained through `ChainSpec::mainnet` and `ChainSpec::minimal`; networks
/// override individual values with a `YamlConfig`.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    /*
     * Misc
     */
    #[serde(with = "serde_utils::quoted_u64")]
    pub shard_count: u64,
    pub target_committee_size: usize,
    pub max_committees_per_slot: usize,
    pub shuffle_round_count: u8,

    /*
     * Initial values
     */
    pub genesis_epoch: Epoch,
    pub far_future_epoch: Epoch,

    /*
     * Time parameters
     */
    #[serde(with = "serde_utils::quoted_u64")]
    pub slots_per_epoch: u64,
    pub min_seed_lookahead: Epoch,

    /*
     * State list lengths
     */
    pub epochs_per_historical_vector: usize,

    /*
     * Seed domains
     */
    pub domain_beacon_attester: u8,
}

impl ChainSpec {
    /// Returns the number of committees in every slot of an epoch with `active_validator_count`
    /// active validators.
    ///
    /// The value is evaluated once per epoch and applies uniformly to all of its slots.
    pub fn get_committee_count_per_slot(
        &self,
        active_validator_count: usize,
    ) -> Result<usize, ArithError> {
        Ok(std::cmp::max(
            1,
            std::cmp::min(
                self.max_committees_per_slot,
                active_validator_count
                    .safe_div(self.slots_per_epoch as usize)?
                    .safe_div(self.target_committee_size)?,
            ),
        ))
    }

    /// Returns the one-byte tag that separates seeds for `domain`.
    pub fn get_domain_constant(&self, domain: Domain) -> u8 {
        match domain {
            Domain::BeaconAttester => self.domain_beacon_attester,
        }
    }

    /// Returns a `ChainSpec` compatible with the mainnet preset.
    pub fn mainnet() -> Self {
        Self {
            /*
             * Misc
             */
            shard_count: 1_024,
            target_committee_size: 128,
            max_committees_per_slot: 64,
            shuffle_round_count: 90,

            /*
             * Initial values
             */
            genesis_epoch: Epoch::new(0),
            far_future_epoch: Epoch::new(u64::MAX),

            /*
             * Time parameters
             */
            slots_per_epoch: 32,
            min_seed_lookahead: Epoch::new(1),

            /*
             * State list lengths
             */
            epochs_per_historical_vector: 65_536,

            /*
             * Seed domains
             */
            domain_beacon_attester: 1,
        }
    }

    /// Returns a `ChainSpec` compatible with the minimal preset used for conformance testing.
    pub fn minimal() -> Self {
        Self {
            shard_count: 8,
            target_committee_size: 4,
            max_committees_per_slot: 4,
            shuffle_round_count: 10,
            slots_per_epoch: 8,
            epochs_per_historical_vector: 64,
            ..ChainSpec::mainnet()
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Union of the presets a `YamlConfig` may be based upon.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetBase {
    #[default]
    Mainnet,
    Minimal,
}

impl PresetBase {
    pub fn chain_spec(self) -> ChainSpec {
        match self {
            PresetBase::Mainnet => ChainSpec::mainnet(),
            PresetBase::Minimal => ChainSpec::minimal(),
        }
    }
}

/// A network configuration document: a preset plus any number of overridden values.
///
/// Keys are upper-case, e.g. `SLOTS_PER_EPOCH: 4`. Omitted keys keep the preset's value.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct YamlConfig {
    pub preset_base: PresetBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_committee_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_committees_per_slot: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_round_count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genesis_epoch: Option<Epoch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots_per_epoch: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_seed_lookahead: Option<Epoch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epochs_per_historical_vector: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_beacon_attester: Option<u8>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ConfigError {
    Yaml(String),
    /// A value that would make committee arithmetic divide by zero.
    ZeroValue(&'static str),
}

impl YamlConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Returns the configured preset with every present override applied.
    pub fn to_chain_spec(&self) -> Result<ChainSpec, ConfigError> {
        self.apply_to_chain_spec(&self.preset_base.chain_spec())
    }

    /// Returns a copy of `base` with every present override applied.
    pub fn apply_to_chain_spec(&self, base: &ChainSpec) -> Result<ChainSpec, ConfigError> {
        let spec = ChainSpec {
            shard_count: self.shard_count.unwrap_or(base.shard_count),
            target_committee_size: self
                .target_committee_size
                .unwrap_or(base.target_committee_size),
            max_committees_per_slot: self
                .max_committees_per_slot
                .unwrap_or(base.max_committees_per_slot),
            shuffle_round_count: self
                .shuffle_round_count
                .unwrap_or(base.shuffle_round_count),
            genesis_epoch: self.genesis_epoch.unwrap_or(base.genesis_epoch),
            far_future_epoch: base.far_future_epoch,
            slots_per_epoch: self.slots_per_epoch.unwrap_or(base.slots_per_epoch),
            min_seed_lookahead: self.min_seed_lookahead.unwrap_or(base.min_seed_lookahead),
            epochs_per_historical_vector: self
                .epochs_per_historical_vector
                .unwrap_or(base.epochs_per_historical_vector),
            domain_beacon_attester: self
                .domain_beacon_attester
                .unwrap_or(base.domain_beacon_attester),
        };

        if spec.shard_count == 0 {
            return Err(ConfigError::ZeroValue("SHARD_COUNT"));
        }
        if spec.target_committee_size == 0 {
            return Err(ConfigError::ZeroValue("TARGET_COMMITTEE_SIZE"));
        }
        if spec.max_committees_per_slot == 0 {
            return Err(ConfigError::ZeroValue("MAX_COMMITTEES_PER_SLOT"));
        }
        if spec.slots_per_epoch == 0 {
            return Err(ConfigError::ZeroValue("SLOTS_PER_EPOCH"));
        }
        if spec.epochs_per_historical_vector == 0 {
            return Err(ConfigError::ZeroValue("EPOCHS_PER_HISTORICAL_VECTOR"));
        }

        Ok(spec)
    }
}
