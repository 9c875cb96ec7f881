//! Parameters derived once per generation run

use crate::error::{CouponForgeError, Result};

/// Size of the code space and bounds of one random jump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParameters {
    /// Alphabet size `L`
    pub base: usize,
    /// Digits per code `D`
    pub digit_count: usize,
    pub qty_to_generate: usize,
    /// Previously issued codes that may each cost one extra counter step
    pub reserved: usize,
    /// `L^D`
    pub qty_permutations: u128,
    /// Largest single random jump
    pub max_increment: u128,
    /// Smallest `e` with `L^e >= max_increment`
    pub max_exponent: usize,
}

impl GenerationParameters {
    /// Derive the parameters for a run.
    ///
    /// The counter only moves forward and each state renders a distinct code,
    /// so a run takes at most `qty_to_generate + reserved` steps. Splitting the
    /// space evenly across that many steps keeps the counter inside `L^D`.
    pub fn new(
        base: usize,
        digit_count: usize,
        qty_to_generate: usize,
        reserved: usize,
    ) -> Result<Self> {
        if qty_to_generate == 0 {
            return Err(CouponForgeError::config(
                "quantity to generate must be greater than zero",
            ));
        }
        if base < 2 {
            return Err(CouponForgeError::config(format!(
                "alphabet size {} is too small",
                base
            )));
        }
        if digit_count == 0 {
            return Err(CouponForgeError::config("digit count must be at least 1"));
        }

        let qty_permutations = u32::try_from(digit_count)
            .ok()
            .and_then(|d| (base as u128).checked_pow(d))
            .ok_or_else(|| {
                CouponForgeError::config(format!(
                    "{} digits over {} symbols is too large a code space",
                    digit_count, base
                ))
            })?;

        let demand = qty_to_generate as u128 + reserved as u128;
        if demand > qty_permutations {
            return Err(CouponForgeError::config(format!(
                "requested {} codes but only {} of {} permutations remain",
                qty_to_generate,
                qty_permutations.saturating_sub(reserved as u128),
                qty_permutations
            )));
        }

        let max_increment = qty_permutations / demand;
        if max_increment == 0 {
            return Err(CouponForgeError::config(
                "quantity leaves no room for a random jump",
            ));
        }

        let mut max_exponent = 0usize;
        while (base as u128).pow(max_exponent as u32) < max_increment {
            max_exponent += 1;
        }

        Ok(Self {
            base,
            digit_count,
            qty_to_generate,
            reserved,
            qty_permutations,
            max_increment,
            max_exponent,
        })
    }

    /// Share of the code space this run and prior issuance will occupy
    pub fn fill_ratio(&self) -> f64 {
        (self.qty_to_generate as f64 + self.reserved as f64) / self.qty_permutations as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_parameters() {
        let params = GenerationParameters::new(32, 10, 100, 0).unwrap();
        assert_eq!(params.qty_permutations, 1u128 << 50);
        assert_eq!(params.max_increment, (1u128 << 50) / 100);
        // 32^8 = 2^40 < 2^50 / 100 <= 32^9
        assert_eq!(params.max_exponent, 9);
    }

    #[test]
    fn test_reserved_shrinks_jump() {
        let params = GenerationParameters::new(5, 2, 5, 20).unwrap();
        assert_eq!(params.qty_permutations, 25);
        assert_eq!(params.max_increment, 1);
        assert_eq!(params.max_exponent, 0);
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = GenerationParameters::new(32, 10, 0, 0).unwrap_err();
        assert!(matches!(err, CouponForgeError::Config { .. }));
    }

    #[test]
    fn test_rejects_quantity_beyond_space() {
        assert!(GenerationParameters::new(3, 2, 10, 0).is_err());
        assert!(GenerationParameters::new(3, 2, 5, 5).is_err());
        assert!(GenerationParameters::new(3, 2, 9, 0).is_ok());
    }

    #[test]
    fn test_rejects_oversized_space() {
        assert!(GenerationParameters::new(32, 40, 1, 0).is_err());
    }
}
