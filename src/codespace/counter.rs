//! Mixed-radix counter

use crate::error::{CouponForgeError, Result};

/// `D` digits in base `L`; digit `i` carries place value `L^i`.
///
/// Digit 0 is the least significant and renders as the last character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterState {
    digits: Vec<usize>,
    base: usize,
}

impl CounterState {
    /// All-zero counter with `digit_count` digits in base `base`
    pub fn zero(digit_count: usize, base: usize) -> Self {
        Self {
            digits: vec![0; digit_count],
            base,
        }
    }

    /// Counter at explicit digits (least significant first)
    pub fn from_digits(digits: Vec<usize>, base: usize) -> Result<Self> {
        if let Some(pos) = digits.iter().position(|&d| d >= base) {
            return Err(CouponForgeError::validation(format!(
                "digit {} has value {} outside base {}",
                pos, digits[pos], base
            )));
        }
        Ok(Self { digits, base })
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    /// Numeric value of the counter
    pub fn value(&self) -> u128 {
        self.digits
            .iter()
            .rev()
            .fold(0u128, |acc, &d| acc * self.base as u128 + d as u128)
    }

    /// Add an increment given as base-`L` digits (least significant first).
    ///
    /// The increment may be shorter than the counter; the remaining digits
    /// only see carry propagation. Digits past the counter width must be zero.
    /// A carry out of the top digit fails with [`CouponForgeError::Overflow`]
    /// and leaves the counter untouched.
    pub fn add_increment(&mut self, increment: &[usize]) -> Result<()> {
        let width = self.digits.len();
        let mut next = self.digits.clone();
        let mut carry = 0usize;

        for (exponent, slot) in next.iter_mut().enumerate() {
            let addend = increment.get(exponent).copied().unwrap_or(0);
            if exponent >= increment.len() && carry == 0 {
                break;
            }
            let sum = *slot + addend + carry;
            if sum < self.base {
                *slot = sum;
                carry = 0;
            } else {
                *slot = sum - self.base;
                carry = 1;
            }
        }

        let spill = increment.iter().skip(width).any(|&d| d != 0);
        if carry != 0 || spill {
            return Err(CouponForgeError::overflow(width.saturating_sub(1), width));
        }

        self.digits = next;
        Ok(())
    }
}
