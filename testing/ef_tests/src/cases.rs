use super::*;
use std::fmt::Debug;
use types::ChainSpec;

mod crosslinks;

pub use crosslinks::CrosslinksCase;

pub trait Case: Debug + Sync {
    /// An optional field for implementing a custom description.
    ///
    /// Defaults to "no description".
    fn description(&self) -> String {
        "no description".to_string()
    }

    /// Execute a test and return the result.
    ///
    /// `case_index` reports the index of the case in the set of test cases. It is not strictly
    /// necessary, but it's useful when troubleshooting specific failing tests.
    fn result(&self, case_index: usize, spec: &ChainSpec) -> Result<(), Error>;
}

#[derive(Debug)]
pub struct Cases<T> {
    pub test_cases: Vec<T>,
}

impl<T: Case> Cases<T> {
    pub fn test_results(&self, spec: &ChainSpec) -> Vec<CaseResult> {
        self.test_cases
            .iter()
            .enumerate()
            .map(|(i, tc)| CaseResult::new(i, tc, tc.result(i, spec)))
            .collect()
    }
}
