pub mod common;
pub mod per_epoch_processing;

pub use per_epoch_processing::{
    errors::EpochProcessingError, process_crosslinks, CrosslinkSummary, InclusionInfo,
    WinningRoot,
};
