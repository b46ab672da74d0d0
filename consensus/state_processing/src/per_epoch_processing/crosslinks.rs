//! Crosslink processing at an epoch boundary.
//!
//! The transition runs through a fixed sequence of phases:
//!
//! `Start -> TallyAttestations -> SelectCrosslinks -> Finalize -> Done`
//!
//! Each phase is a distinct type and every transition consumes its input, so a phase cannot be
//! repeated or skipped. Nothing is written to the `BeaconState` until `Finalize::commit`, which
//! cannot fail; an error in any earlier phase leaves the state untouched.

use super::{select_winning_root, EpochProcessingError as Error, WinningRoot};
use crate::common::get_attesting_indices;
use safe_arith::SafeArith;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use types::*;

/// The earliest inclusion of some validator's previous-epoch attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionInfo {
    /// Slots between the attestation slot and the slot of the block which included it.
    pub delay: u64,
    /// The proposer of the including block.
    pub proposer_index: u64,
}

impl InclusionInfo {
    /// Replaces `self` with `other` if `other` was included sooner.
    pub fn update(&mut self, other: &Self) {
        if other.delay < self.delay {
            *self = *other;
        }
    }
}

/// The output of crosslink processing, for use by reward computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrosslinkSummary {
    pub previous_epoch_winning_roots: BTreeMap<Shard, WinningRoot>,
    pub current_epoch_winning_roots: BTreeMap<Shard, WinningRoot>,
    /// Keyed by validator index. Only covers previous-epoch attestations.
    pub inclusion_info: BTreeMap<usize, InclusionInfo>,
}

/// Updates `state.previous_crosslinks` and `state.current_crosslinks` from the attestations of
/// the previous and current epochs.
///
/// The committee caches for both epochs are built if required. On error the crosslinks are left
/// exactly as they were.
pub fn process_crosslinks(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<CrosslinkSummary, Error> {
    state.build_committee_cache(RelativeEpoch::Previous, spec)?;
    state.build_committee_cache(RelativeEpoch::Current, spec)?;

    let finalize = Start::new(state, spec)?
        .tally_attestations()?
        .select_crosslinks()?
        .finalize();

    Ok(finalize.commit(state).into_summary())
}

/// Per-epoch inputs for tallying.
struct EpochInput<'a> {
    epoch: Epoch,
    committee_cache: Arc<CommitteeCache>,
    attestations: &'a [PendingAttestation],
}

/// Votes for a single shard in a single epoch.
#[derive(Default)]
struct ShardTally {
    /// Attesting validators per candidate data root.
    candidates: BTreeMap<Hash256, BTreeSet<usize>>,
}

/// Votes for all shards in a single epoch.
struct EpochTally {
    epoch: Epoch,
    committee_cache: Arc<CommitteeCache>,
    shards: BTreeMap<Shard, ShardTally>,
}

/// Winners for a single epoch.
struct EpochSelection {
    winning_roots: BTreeMap<Shard, WinningRoot>,
}

/// The transition has its inputs but has not looked at any attestation.
pub struct Start<'a> {
    state: &'a BeaconState,
    spec: &'a ChainSpec,
    epochs: [EpochInput<'a>; 2],
}

impl<'a> Start<'a> {
    /// Requires the previous and current committee caches of `state` to be built.
    pub fn new(state: &'a BeaconState, spec: &'a ChainSpec) -> Result<Self, Error> {
        let previous = EpochInput {
            epoch: state.previous_epoch(spec),
            committee_cache: state
                .committee_cache(RelativeEpoch::Previous, spec)?
                .clone(),
            attestations: &state.previous_epoch_attestations,
        };
        let current = EpochInput {
            epoch: state.current_epoch(spec),
            committee_cache: state.committee_cache(RelativeEpoch::Current, spec)?.clone(),
            attestations: &state.current_epoch_attestations,
        };

        Ok(Self {
            state,
            spec,
            epochs: [previous, current],
        })
    }

    /// Groups the unslashed attesters of every attestation by shard and data root.
    pub fn tally_attestations(self) -> Result<TallyAttestations<'a>, Error> {
        let mut inclusion_info: BTreeMap<usize, InclusionInfo> = BTreeMap::new();
        let mut tallies = Vec::with_capacity(self.epochs.len());

        for (i, input) in self.epochs.iter().enumerate() {
            let is_previous_epoch = i == 0;
            let mut shards: BTreeMap<Shard, ShardTally> = BTreeMap::new();

            for attestation in input.attestations {
                let data = &attestation.data;
                if data.slot.epoch(self.spec.slots_per_epoch) != input.epoch {
                    continue;
                }

                let committee = input
                    .committee_cache
                    .get_beacon_committee(data.slot, data.index)
                    .ok_or(Error::NoCommittee {
                        slot: data.slot,
                        index: data.index,
                    })?;

                if committee.shard != data.shard {
                    return Err(Error::ShardMismatch {
                        slot: data.slot,
                        index: data.index,
                        attestation_shard: data.shard,
                        committee_shard: committee.shard,
                    });
                }

                let attesters = get_attesting_indices(&committee, &attestation.aggregation_bits)?
                    .into_iter()
                    .filter(|index| {
                        self.state
                            .validators
                            .get(*index)
                            .map_or(false, |v| !v.slashed)
                    })
                    .collect::<Vec<_>>();

                if is_previous_epoch {
                    let info = InclusionInfo {
                        delay: attestation.inclusion_delay,
                        proposer_index: attestation.proposer_index,
                    };
                    for index in &attesters {
                        inclusion_info
                            .entry(*index)
                            .and_modify(|existing| existing.update(&info))
                            .or_insert(info);
                    }
                }

                shards
                    .entry(committee.shard)
                    .or_default()
                    .candidates
                    .entry(data.crosslink_data_root)
                    .or_default()
                    .extend(attesters);
            }

            tallies.push(EpochTally {
                epoch: input.epoch,
                committee_cache: input.committee_cache.clone(),
                shards,
            });
        }

        Ok(TallyAttestations {
            state: self.state,
            tallies,
            inclusion_info,
        })
    }
}

/// Every attestation has been counted.
pub struct TallyAttestations<'a> {
    state: &'a BeaconState,
    tallies: Vec<EpochTally>,
    inclusion_info: BTreeMap<usize, InclusionInfo>,
}

impl<'a> TallyAttestations<'a> {
    /// Picks the winning root of each shard and stages it as the new crosslink if it has a
    /// two-thirds supermajority of the shard's committee balance.
    pub fn select_crosslinks(self) -> Result<SelectCrosslinks<'a>, Error> {
        let mut staged: BTreeMap<Shard, Crosslink> = BTreeMap::new();
        let mut selections = Vec::with_capacity(self.tallies.len());

        for tally in &self.tallies {
            let mut winning_roots = BTreeMap::new();

            for (shard, shard_tally) in &tally.shards {
                let candidates = shard_tally
                    .candidates
                    .iter()
                    .map(|(data_root, attesters)| -> Result<WinningRoot, Error> {
                        let total_attesting_balance =
                            attesters.iter().try_fold(0_u64, |acc, index| -> Result<u64, Error> {
                                let balance = self
                                    .state
                                    .validators
                                    .get(*index)
                                    .ok_or(BeaconStateError::UnknownValidator(*index))?
                                    .effective_balance;
                                acc.safe_add(balance).map_err(Error::from)
                            })?;

                        Ok(WinningRoot {
                            crosslink: Crosslink {
                                shard: *shard,
                                epoch: tally.epoch,
                                data_root: *data_root,
                            },
                            attesting_validator_indices: attesters.iter().copied().collect(),
                            total_attesting_balance,
                        })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;

                let winning_root = match select_winning_root(candidates) {
                    Some(winning_root) => winning_root,
                    None => continue,
                };

                let total_balance = self.shard_committee_balance(tally, *shard)?;

                if winning_root.is_supermajority(total_balance)? {
                    staged.insert(*shard, winning_root.crosslink);
                }
                winning_roots.insert(*shard, winning_root);
            }

            selections.push(EpochSelection { winning_roots });
        }

        for shard in staged.keys() {
            if *shard as usize >= self.state.current_crosslinks.len() {
                return Err(Error::UnknownShard(*shard));
            }
        }

        Ok(SelectCrosslinks {
            state: self.state,
            staged,
            selections,
            inclusion_info: self.inclusion_info,
        })
    }

    /// The combined effective balance of every committee crosslinking `shard` in the epoch.
    fn shard_committee_balance(&self, tally: &EpochTally, shard: Shard) -> Result<u64, Error> {
        let members = tally
            .committee_cache
            .get_committees_for_shard(shard)?
            .into_iter()
            .flat_map(|committee| committee.committee.iter().copied())
            .collect::<Vec<_>>();

        Ok(self.state.get_total_balance(&members)?)
    }
}

/// New crosslinks have been chosen but not yet applied.
pub struct SelectCrosslinks<'a> {
    state: &'a BeaconState,
    staged: BTreeMap<Shard, Crosslink>,
    selections: Vec<EpochSelection>,
    inclusion_info: BTreeMap<usize, InclusionInfo>,
}

impl<'a> SelectCrosslinks<'a> {
    /// Builds the post-transition crosslink lists, releasing the borrow of the state.
    pub fn finalize(self) -> Finalize {
        let previous_crosslinks = self.state.current_crosslinks.clone();
        let mut current_crosslinks = self.state.current_crosslinks.clone();

        for (shard, crosslink) in self.staged {
            if let Some(slot) = current_crosslinks.get_mut(shard as usize) {
                *slot = crosslink;
            }
        }

        let mut selections = self.selections.into_iter();
        let summary = CrosslinkSummary {
            previous_epoch_winning_roots: selections
                .next()
                .map(|s| s.winning_roots)
                .unwrap_or_default(),
            current_epoch_winning_roots: selections
                .next()
                .map(|s| s.winning_roots)
                .unwrap_or_default(),
            inclusion_info: self.inclusion_info,
        };

        Finalize {
            previous_crosslinks,
            current_crosslinks,
            summary,
        }
    }
}

/// The post-transition crosslinks, ready to be written.
pub struct Finalize {
    previous_crosslinks: Vec<Crosslink>,
    current_crosslinks: Vec<Crosslink>,
    summary: CrosslinkSummary,
}

impl Finalize {
    /// Writes both crosslink lists to `state` in a single step.
    pub fn commit(self, state: &mut BeaconState) -> Done {
        state.previous_crosslinks = self.previous_crosslinks;
        state.current_crosslinks = self.current_crosslinks;

        Done {
            summary: self.summary,
        }
    }
}

/// The transition is complete.
pub struct Done {
    summary: CrosslinkSummary,
}

impl Done {
    pub fn into_summary(self) -> CrosslinkSummary {
        self.summary
    }
}
