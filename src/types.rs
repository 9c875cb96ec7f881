//! Core types and structures for coupon-forge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{CouponForgeError, Result};

/// Historical code length of issued coupons
pub const DEFAULT_DIGIT_COUNT: usize = 10;

/// Default discount target written into coupon records
pub const DEFAULT_DISCOUNT_TARGET: &str = "RETAIL";

/// Grouping of a raw code into spacer-separated chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub size: usize,
    pub spacer: char,
}

impl Grouping {
    pub fn new(size: usize, spacer: char) -> Self {
        Self { size, spacer }
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub qty_to_generate: usize,
    pub digit_count: usize,
    pub grouping: Option<Grouping>,
    /// Fixed seed for reproducible runs
    pub random_seed: Option<u64>,
    /// Upper bound on collisions per run
    pub max_retries: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            qty_to_generate: 100,
            digit_count: DEFAULT_DIGIT_COUNT,
            grouping: None,
            random_seed: None,
            max_retries: None,
        }
    }
}

impl GenerationConfig {
    /// Create a config for `qty` codes with every other setting at its default
    pub fn with_quantity(qty: usize) -> Self {
        Self {
            qty_to_generate: qty,
            ..Default::default()
        }
    }

    /// Build a config from `COUPON_*` environment variables.
    ///
    /// Unset variables keep their defaults. `COUPON_GROUP_SIZE` without
    /// `COUPON_SPACER` groups with `-`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(digits) = env_value::<usize>("COUPON_DIGITS")? {
            config.digit_count = digits;
        }
        if let Some(seed) = env_value::<u64>("COUPON_SEED")? {
            config.random_seed = Some(seed);
        }
        if let Some(retries) = env_value::<u64>("COUPON_MAX_RETRIES")? {
            config.max_retries = Some(retries);
        }
        if let Some(size) = env_value::<usize>("COUPON_GROUP_SIZE")? {
            let spacer = env_value::<char>("COUPON_SPACER")?.unwrap_or('-');
            config.grouping = Some(Grouping::new(size, spacer));
        }

        Ok(config)
    }

    /// Reject settings that would fail before or during generation
    pub fn validate(&self) -> Result<()> {
        if self.qty_to_generate == 0 {
            return Err(CouponForgeError::config(
                "quantity to generate must be greater than zero",
            ));
        }
        if self.digit_count == 0 {
            return Err(CouponForgeError::config("digit count must be at least 1"));
        }
        if let Some(grouping) = &self.grouping {
            if grouping.size == 0 {
                return Err(CouponForgeError::config("group size must be at least 1"));
            }
            if grouping.spacer.is_control() {
                return Err(CouponForgeError::config(format!(
                    "spacer {:?} is not printable",
                    grouping.spacer
                )));
            }
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            CouponForgeError::config(format!("{} has an invalid value: {}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

/// Persisted coupon record handed to downstream storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponCode {
    pub code: String,
    /// Discount expressed as a fraction, e.g. 0.65 for 65%
    pub discount: f64,
    pub discount_target: String,
    /// 0 means no customer is attached yet
    pub customer_id: u64,
}

impl CouponCode {
    pub fn new(code: impl Into<String>, discount: f64) -> Self {
        Self {
            code: code.into(),
            discount,
            discount_target: DEFAULT_DISCOUNT_TARGET.to_string(),
            customer_id: 0,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.discount_target = target.into();
        self
    }
}

/// Summary of a finished generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub qty_codes: usize,
    pub qty_permutations: u128,
    /// Percentage of the code space left unused by this run
    pub sparsity: f64,
    /// Candidates discarded because they were already issued
    pub collisions: u64,
    pub generated_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn new(qty_codes: usize, qty_permutations: u128, collisions: u64) -> Self {
        Self {
            qty_codes,
            qty_permutations,
            sparsity: sparsity_percent(qty_codes, qty_permutations),
            collisions,
            generated_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generated {} codes from a total set of {} ({:.6}% sparsity)",
            group_thousands(self.qty_codes as u128),
            group_thousands(self.qty_permutations),
            self.sparsity
        )
    }
}

/// `(1 - qty_codes / qty_permutations) * 100`
pub fn sparsity_percent(qty_codes: usize, qty_permutations: u128) -> f64 {
    if qty_permutations == 0 {
        return 0.0;
    }
    (1.0 - (qty_codes as f64 / qty_permutations as f64)) * 100.0
}

/// Render an integer with `,` thousands separators
pub fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
