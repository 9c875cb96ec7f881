//! Random jumps of bounded size, expressed as counter digits

use rand::Rng;

use super::params::GenerationParameters;

/// Draw a jump size in `1..=max_increment`
pub fn draw_jump<R: Rng + ?Sized>(params: &GenerationParameters, rng: &mut R) -> u128 {
    rng.gen_range(1..=params.max_increment)
}

/// Draw a jump and return it as base-`L` digits
pub fn next_increment_digits<R: Rng + ?Sized>(
    params: &GenerationParameters,
    rng: &mut R,
) -> Vec<usize> {
    to_digits(draw_jump(params, rng), params.base, params.max_exponent)
}

/// Greedy place-value decomposition of `value` for exponents `max_exponent..=0`.
///
/// Index `e` of the result holds the multiplier of `base^e`. Any part of
/// `value` at or above `base^(max_exponent + 1)` is folded into the top digit,
/// which then exceeds `base - 1`; callers size `max_exponent` so that never
/// happens.
pub fn to_digits(value: u128, base: usize, max_exponent: usize) -> Vec<usize> {
    let base = base as u128;
    let mut digits = vec![0usize; max_exponent + 1];
    let mut remaining = value;

    for exponent in (0..=max_exponent).rev() {
        let place = base.pow(exponent as u32);
        let digit = remaining / place;
        remaining -= digit * place;
        digits[exponent] = digit as usize;
    }

    digits
}
