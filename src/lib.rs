//! Coupon Forge - collision-free coupon and invite code generation
//!
//! Codes come from a mixed-radix counter advanced by random jumps and
//! rendered through shuffled per-position alphabets, so large batches look
//! scattered without ever storing the full code space.

pub mod batch;
pub mod cli;
pub mod codespace;
pub mod error;
pub mod issuance;
pub mod types;

// Re-export commonly used types
pub use error::{CouponForgeError, Result};
pub use types::{CouponCode, GenerationConfig, GenerationReport, Grouping};

// Re-export main functionality
pub use batch::BatchPlan;
pub use codespace::{Alphabet, CounterState, GenerationParameters, PositionTables};
pub use issuance::{CodeSink, IssuanceLoop, IssuanceStore, IssuedCodeSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
