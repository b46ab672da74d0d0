#![cfg(test)]
use super::*;
use types::test_utils::{TestingBeaconStateBuilder, TestingPendingAttestationBuilder};
use types::*;

const VALIDATOR_COUNT: usize = 16;

/// A minimal-preset state in epoch 2, with one committee of two validators per slot.
fn state_at_epoch_two(spec: &ChainSpec) -> BeaconState {
    let mut builder = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, spec);
    builder.teleport_to_epoch(Epoch::new(2), spec);
    builder.build_caches(spec).unwrap();
    builder.build()
}

fn attestation(
    state: &BeaconState,
    slot: u64,
    data_root: Hash256,
    bits: Option<Vec<bool>>,
    spec: &ChainSpec,
) -> PendingAttestation {
    let mut builder =
        TestingPendingAttestationBuilder::new(state, Slot::new(slot), 0, data_root, spec).unwrap();
    match bits {
        Some(bits) => builder.add_committee_participation(bits),
        None => builder.full_participation(),
    };
    builder.build()
}

fn committee_of(state: &BeaconState, slot: u64, spec: &ChainSpec) -> Vec<usize> {
    state
        .get_beacon_committee(Slot::new(slot), 0, spec)
        .unwrap()
        .committee
        .to_vec()
}

#[test]
fn no_attestations_retains_crosslinks() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    state.current_crosslinks[1].data_root = Hash256::repeat_byte(5);
    let pre = state.clone();

    let summary = process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(state.current_crosslinks, pre.current_crosslinks);
    assert_eq!(state.previous_crosslinks, pre.current_crosslinks);
    assert!(summary.previous_epoch_winning_roots.is_empty());
    assert!(summary.current_epoch_winning_roots.is_empty());
    assert!(summary.inclusion_info.is_empty());
}

#[test]
fn full_participation_updates_crosslink() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let root = Hash256::repeat_byte(0xaa);
    // Slot 11 is offset 3 in epoch 1, so its committee crosslinks shard 3.
    let att = attestation(&state, 11, root, None, &spec);
    assert_eq!(att.data.shard, 3);
    state.previous_epoch_attestations.push(att);
    let pre = state.clone();

    let summary = process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(
        state.current_crosslinks[3],
        Crosslink {
            shard: 3,
            epoch: Epoch::new(1),
            data_root: root
        }
    );
    assert_eq!(state.previous_crosslinks, pre.current_crosslinks);
    for shard in (0..spec.shard_count as usize).filter(|s| *s != 3) {
        assert_eq!(state.current_crosslinks[shard], pre.current_crosslinks[shard]);
    }

    let winner = &summary.previous_epoch_winning_roots[&3];
    assert_eq!(winner.total_attesting_balance, 64_000_000_000);
    let mut expected_attesters = committee_of(&pre, 11, &spec);
    expected_attesters.sort_unstable();
    assert_eq!(winner.attesting_validator_indices, expected_attesters);
}

#[test]
fn below_supermajority_is_retained_and_idempotent() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let att = attestation(
        &state,
        19,
        Hash256::repeat_byte(1),
        Some(vec![true, false]),
        &spec,
    );
    state.current_epoch_attestations.push(att);
    let pre = state.clone();

    let summary = process_crosslinks(&mut state, &spec).unwrap();
    assert_eq!(state.current_crosslinks, pre.current_crosslinks);
    assert_eq!(
        summary.current_epoch_winning_roots[&3].total_attesting_balance,
        32_000_000_000
    );

    process_crosslinks(&mut state, &spec).unwrap();
    assert_eq!(state, {
        let mut expected = pre;
        expected.previous_crosslinks = expected.current_crosslinks.clone();
        expected
    });
}

#[test]
fn exactly_two_thirds_is_enough() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let members = committee_of(&state, 18, &spec);
    state.validators[members[0]].effective_balance = 2;
    state.validators[members[1]].effective_balance = 1;

    let root = Hash256::repeat_byte(2);
    let att = attestation(&state, 18, root, Some(vec![true, false]), &spec);
    state.current_epoch_attestations.push(att);

    process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(state.current_crosslinks[2].data_root, root);
    assert_eq!(state.current_crosslinks[2].epoch, Epoch::new(2));
}

#[test]
fn ties_favour_the_smaller_root() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let larger = Hash256::repeat_byte(0xf0);
    let smaller = Hash256::repeat_byte(0x0f);

    let a = attestation(&state, 20, larger, Some(vec![true, false]), &spec);
    let b = attestation(&state, 20, smaller, Some(vec![false, true]), &spec);
    state.current_epoch_attestations.push(a.clone());
    state.current_epoch_attestations.push(b.clone());

    let mut reversed = state.clone();
    reversed.current_epoch_attestations = vec![b, a];

    let summary = process_crosslinks(&mut state, &spec).unwrap();
    let reversed_summary = process_crosslinks(&mut reversed, &spec).unwrap();

    assert_eq!(
        summary.current_epoch_winning_roots[&4].crosslink.data_root,
        smaller
    );
    assert_eq!(summary, reversed_summary);
}

#[test]
fn slashed_attesters_do_not_count() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let members = committee_of(&state, 21, &spec);
    state.validators[members[0]].slashed = true;

    let att = attestation(&state, 21, Hash256::repeat_byte(3), None, &spec);
    state.current_epoch_attestations.push(att);
    let pre = state.clone();

    let summary = process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(state.current_crosslinks, pre.current_crosslinks);
    assert_eq!(
        summary.current_epoch_winning_roots[&5].attesting_validator_indices,
        vec![members[1]]
    );
}

#[test]
fn current_epoch_overrides_previous_epoch() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let previous_root = Hash256::repeat_byte(0x11);
    let current_root = Hash256::repeat_byte(0x22);

    let prev = attestation(&state, 14, previous_root, None, &spec);
    let curr = attestation(&state, 22, current_root, None, &spec);
    state.previous_epoch_attestations.push(prev);
    state.current_epoch_attestations.push(curr);

    let summary = process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(
        state.current_crosslinks[6],
        Crosslink {
            shard: 6,
            epoch: Epoch::new(2),
            data_root: current_root
        }
    );
    assert_eq!(
        summary.previous_epoch_winning_roots[&6].crosslink.data_root,
        previous_root
    );
}

#[test]
fn inclusion_info_keeps_earliest_inclusion() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let root = Hash256::repeat_byte(9);
    let members = committee_of(&state, 9, &spec);

    let mut late = TestingPendingAttestationBuilder::new(&state, Slot::new(9), 0, root, &spec)
        .unwrap();
    late.full_participation().inclusion(3, 7);
    let mut early = TestingPendingAttestationBuilder::new(&state, Slot::new(9), 0, root, &spec)
        .unwrap();
    early.full_participation().inclusion(1, 4);

    state.previous_epoch_attestations.push(late.build());
    state.previous_epoch_attestations.push(early.build());

    let summary = process_crosslinks(&mut state, &spec).unwrap();

    for member in members {
        assert_eq!(
            summary.inclusion_info[&member],
            InclusionInfo {
                delay: 1,
                proposer_index: 4
            }
        );
    }
    assert_eq!(summary.inclusion_info.len(), 2);
}

#[test]
fn missing_committee_is_not_fatal_and_state_is_untouched() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let mut att = attestation(&state, 17, Hash256::repeat_byte(1), None, &spec);
    att.data.index = 1;
    state.current_epoch_attestations.push(att);
    let pre = state.clone();

    let err = process_crosslinks(&mut state, &spec).unwrap_err();

    assert_eq!(
        err,
        EpochProcessingError::NoCommittee {
            slot: Slot::new(17),
            index: 1
        }
    );
    assert!(!err.is_fatal());
    assert_eq!(state, pre);
}

#[test]
fn shard_mismatch_is_fatal() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let mut att = attestation(&state, 17, Hash256::repeat_byte(1), None, &spec);
    att.data.shard = 7;
    state.current_epoch_attestations.push(att);
    let pre = state.clone();

    let err = process_crosslinks(&mut state, &spec).unwrap_err();

    assert_eq!(
        err,
        EpochProcessingError::ShardMismatch {
            slot: Slot::new(17),
            index: 0,
            attestation_shard: 7,
            committee_shard: 1,
        }
    );
    assert!(err.is_fatal());
    assert_eq!(state, pre);
}

#[test]
fn balance_overflow_is_fatal() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let members = committee_of(&state, 16, &spec);
    for member in &members {
        state.validators[*member].effective_balance = u64::MAX;
    }
    let att = attestation(&state, 16, Hash256::repeat_byte(1), None, &spec);
    state.current_epoch_attestations.push(att);
    let pre = state.clone();

    let err = process_crosslinks(&mut state, &spec).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(state, pre);
}

#[test]
fn wrong_bitfield_length_is_rejected() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_epoch_two(&spec);
    let att = attestation(&state, 17, Hash256::repeat_byte(1), Some(vec![true]), &spec);
    state.current_epoch_attestations.push(att);

    assert!(matches!(
        process_crosslinks(&mut state, &spec),
        Err(EpochProcessingError::InvalidBitfieldLength {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn genesis_epoch() {
    let spec = ChainSpec::minimal();
    let mut builder = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, &spec);
    builder.build_caches(&spec).unwrap();
    let mut state = builder.build();
    let root = Hash256::repeat_byte(4);
    let att = attestation(&state, 5, root, None, &spec);
    state.current_epoch_attestations.push(att);

    process_crosslinks(&mut state, &spec).unwrap();

    assert_eq!(
        state.current_crosslinks[5],
        Crosslink {
            shard: 5,
            epoch: Epoch::new(0),
            data_root: root
        }
    );
}
