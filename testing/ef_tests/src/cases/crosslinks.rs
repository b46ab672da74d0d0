use super::*;
use crate::case_result::compare_beacon_state_results;
use serde::Deserialize;
use state_processing::per_epoch_processing::process_crosslinks;
use types::BeaconState;

/// A single `process_crosslinks` vector.
///
/// A missing `post` means processing is expected to fail.
#[derive(Debug, Clone, Deserialize)]
pub struct CrosslinksCase {
    #[serde(default)]
    pub description: Option<String>,
    pub pre: BeaconState,
    pub post: Option<BeaconState>,
}

impl Case for CrosslinksCase {
    fn description(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    fn result(&self, _case_index: usize, spec: &ChainSpec) -> Result<(), Error> {
        let mut state = self.pre.clone();
        let expected = self.post.clone();

        let result = process_crosslinks(&mut state, spec).map(|_| state);

        compare_beacon_state_results(&result, &expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::yaml_decode;

    const PRE: &str = r#"
slot: 16
validators:
  - {effective_balance: "32000000000", activation_epoch: "0", exit_epoch: "18446744073709551615", slashed: false}
  - {effective_balance: "32000000000", activation_epoch: "0", exit_epoch: "18446744073709551615", slashed: false}
randao_mixes: ["0x0101010101010101010101010101010101010101010101010101010101010101"]
previous_crosslinks:
  - {shard: "0", epoch: "0", data_root: "0x0000000000000000000000000000000000000000000000000000000000000000"}
current_crosslinks:
  - {shard: "0", epoch: "1", data_root: "0x0202020202020202020202020202020202020202020202020202020202020202"}
previous_epoch_attestations: []
current_epoch_attestations: []
"#;

    fn case(post: Option<BeaconState>) -> CrosslinksCase {
        CrosslinksCase {
            description: None,
            pre: yaml_decode(PRE).unwrap(),
            post,
        }
    }

    #[test]
    fn wrong_post_state_names_the_field() {
        let spec = ChainSpec::minimal();
        // Without processing, `previous_crosslinks` keeps its old value.
        let unprocessed = yaml_decode(PRE).unwrap();

        match case(Some(unprocessed)).result(0, &spec) {
            Err(Error::NotEqual(msg)) => {
                assert!(msg.contains("previous_crosslinks"));
                assert!(!msg.contains("current_crosslinks\""));
            }
            other => panic!("expected NotEqual, got {:?}", other),
        }
    }

    #[test]
    fn missing_post_expects_failure() {
        let spec = ChainSpec::minimal();

        assert!(matches!(
            case(None).result(0, &spec),
            Err(Error::DidntFail(_))
        ));
    }

    #[test]
    fn matching_post_passes() {
        let spec = ChainSpec::minimal();
        let mut post: BeaconState = yaml_decode(PRE).unwrap();
        post.previous_crosslinks = post.current_crosslinks.clone();

        assert_eq!(case(Some(post)).result(0, &spec), Ok(()));
    }
}
