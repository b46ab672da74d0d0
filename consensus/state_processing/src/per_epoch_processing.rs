pub use crosslinks::{
    process_crosslinks, CrosslinkSummary, Done, Finalize, InclusionInfo, SelectCrosslinks, Start,
    TallyAttestations,
};
pub use errors::EpochProcessingError;
pub use winning_root::{select_winning_root, WinningRoot};

pub mod crosslinks;
pub mod errors;
#[cfg(test)]
mod tests;
pub mod winning_root;
