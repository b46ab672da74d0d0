use crate::EpochProcessingError as Error;
use types::*;

/// Returns validator indices which participated in the attestation, in committee order.
///
/// The bitfield must have exactly one bit per committee member.
pub fn get_attesting_indices(
    committee: &BeaconCommittee,
    aggregation_bits: &[bool],
) -> Result<Vec<usize>, Error> {
    if aggregation_bits.len() != committee.committee.len() {
        return Err(Error::InvalidBitfieldLength {
            slot: committee.slot,
            index: committee.index,
            expected: committee.committee.len(),
            found: aggregation_bits.len(),
        });
    }

    Ok(committee
        .committee
        .iter()
        .zip(aggregation_bits)
        .filter_map(|(validator_index, bit)| if *bit { Some(*validator_index) } else { None })
        .collect())
}
