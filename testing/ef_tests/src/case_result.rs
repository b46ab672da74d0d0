use super::*;
use std::fmt::Debug;
use types::BeaconState;

pub const MAX_VALUE_STRING_LEN: usize = 500;

#[derive(Debug, PartialEq, Clone)]
pub struct CaseResult {
    pub case_index: usize,
    pub desc: String,
    pub result: Result<(), Error>,
}

impl CaseResult {
    pub fn new(case_index: usize, case: &impl Case, result: Result<(), Error>) -> Self {
        CaseResult {
            case_index,
            desc: case.description(),
            result,
        }
    }
}

/// Same as `compare_result`, however names the fields of the state which differ.
///
/// Committee caches are not part of state equality and so are never compared.
pub fn compare_beacon_state_results<E: Debug>(
    result: &Result<BeaconState, E>,
    expected: &Option<BeaconState>,
) -> Result<(), Error> {
    match (result, expected) {
        (Ok(result), Some(expected)) if result != expected => {
            let fields = differing_fields(result, expected);
            Err(Error::NotEqual(format!(
                "States differ in {:?}\nGot {:?}\nExpected {:?}",
                fields,
                fmt_val(result),
                fmt_val(expected)
            )))
        }
        _ => compare_result(result, expected),
    }
}

fn differing_fields(result: &BeaconState, expected: &BeaconState) -> Vec<&'static str> {
    let mut fields = vec![];
    if result.slot != expected.slot {
        fields.push("slot");
    }
    if result.validators != expected.validators {
        fields.push("validators");
    }
    if result.randao_mixes != expected.randao_mixes {
        fields.push("randao_mixes");
    }
    if result.previous_crosslinks != expected.previous_crosslinks {
        fields.push("previous_crosslinks");
    }
    if result.current_crosslinks != expected.current_crosslinks {
        fields.push("current_crosslinks");
    }
    if result.previous_epoch_attestations != expected.previous_epoch_attestations {
        fields.push("previous_epoch_attestations");
    }
    if result.current_epoch_attestations != expected.current_epoch_attestations {
        fields.push("current_epoch_attestations");
    }
    fields
}

pub fn compare_result<T, E>(result: &Result<T, E>, expected: &Option<T>) -> Result<(), Error>
where
    T: PartialEq<T> + Debug,
    E: Debug,
{
    match (result, expected) {
        // Pass: The should have failed and did fail.
        (Err(_), None) => Ok(()),
        // Fail: The test failed when it should have produced a result (fail).
        (Err(e), Some(expected)) => Err(Error::NotEqual(format!(
            "Got {:?} | Expected {}",
            e,
            fmt_val(expected)
        ))),
        // Fail: The test produced a result when it should have failed (fail).
        (Ok(result), None) => Err(Error::DidntFail(format!("Got {:?}", result))),
        // Potential Pass: The test should have produced a result, and it did.
        (Ok(result), Some(expected)) => {
            if result == expected {
                Ok(())
            } else {
                Err(Error::NotEqual(format!(
                    "Got {} | Expected {}",
                    fmt_val(result),
                    fmt_val(expected)
                )))
            }
        }
    }
}

fn fmt_val<T: Debug>(val: T) -> String {
    let mut string = format!("{:?}", val);
    string.truncate(MAX_VALUE_STRING_LEN);
    string
}
