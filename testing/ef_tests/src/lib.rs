pub use case_result::CaseResult;
pub use cases::{Case, Cases, CrosslinksCase};
pub use error::Error;
pub use handler::{CrosslinksHandler, Handler, TestDocument};

mod case_result;
mod cases;
mod decode;
mod error;
mod handler;
