//! Issuance - turns the code space into a batch of never-before-issued codes
//!
//! The loop itself lives in [`runner`]; the issued set it checks against and
//! the sinks it hands results to are small collaborators that callers can
//! replace with their own storage.

pub mod runner;
pub mod sink;
pub mod store;

pub use runner::{rendered_len, IssuanceLoop, IssuanceOutcome, Phase};
pub use sink::{CodeSink, CouponRecordSink, FileSink, MemorySink};
pub use store::{FileIssuanceStore, IssuanceStore, IssuedCodeSet};
