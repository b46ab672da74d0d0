use crate::cases::{Case, Cases, CrosslinksCase};
use crate::decode::yaml_decode_file;
use crate::{CaseResult, Error};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use types::YamlConfig;

/// A vector file: a configuration plus the cases to run under it.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct TestDocument<T> {
    #[serde(default)]
    pub config: YamlConfig,
    pub test_cases: Vec<T>,
}

pub trait Handler {
    type Case: Case + DeserializeOwned;

    fn handler_name() -> &'static str;

    fn vectors_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("vectors")
            .join(Self::handler_name())
    }

    /// Runs every `.yaml` document in `vectors_dir()`, panicking on the first failing file.
    fn run() {
        let dir = Self::vectors_dir();
        let mut paths = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("unable to read {}: {:?}", dir.display(), e))
            .map(|entry| entry.expect("should read dir entry").path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "yaml"))
            .collect::<Vec<_>>();
        paths.sort();

        assert!(
            !paths.is_empty(),
            "no {} vectors in {}",
            Self::handler_name(),
            dir.display()
        );

        for path in paths {
            let results = Self::run_file(&path);
            assert_tests_pass(&path, &results);
        }
    }

    /// Loads a single document and runs each of its cases against the document's config.
    fn run_file(path: &Path) -> Vec<CaseResult> {
        let document: TestDocument<Self::Case> = match yaml_decode_file(path) {
            Ok(document) => document,
            Err(e) => return vec![load_failure(e)],
        };

        let spec = match document.config.to_chain_spec() {
            Ok(spec) => spec,
            Err(e) => return vec![load_failure(Error::InvalidConfig(format!("{:?}", e)))],
        };

        Cases {
            test_cases: document.test_cases,
        }
        .test_results(&spec)
    }
}

pub struct CrosslinksHandler;

impl Handler for CrosslinksHandler {
    type Case = CrosslinksCase;

    fn handler_name() -> &'static str {
        "crosslinks"
    }
}

fn load_failure(e: Error) -> CaseResult {
    CaseResult {
        case_index: 0,
        desc: "load test document".to_string(),
        result: Err(e),
    }
}

pub fn assert_tests_pass(path: &Path, results: &[CaseResult]) {
    let failures: Vec<&CaseResult> = results.iter().filter(|r| r.result.is_err()).collect();

    if !failures.is_empty() {
        let mut error = format!(
            "{} of {} tests failed in {}\n\n",
            failures.len(),
            results.len(),
            path.display()
        );
        for failure in failures {
            if let Err(e) = &failure.result {
                error.push_str(&format!(
                    "-------\ncase[{}] ({}) failed with {}:\n{}\n",
                    failure.case_index,
                    failure.desc,
                    e.name(),
                    e.message()
                ));
            }
        }
        panic!("{}", error);
    }
}
