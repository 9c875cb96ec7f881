//! The issuance loop - draws candidates until the quota is met

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::sink::CodeSink;
use super::store::IssuedCodeSet;
use crate::codespace::{
    draw_jump, format_grouping, next_increment_digits, render, to_digits, Alphabet,
    CounterState, GenerationParameters, PositionTables,
};
use crate::error::{CouponForgeError, Result};
use crate::types::{GenerationConfig, GenerationReport, Grouping};

/// Above this share of the code space, collisions start to dominate run time
const EXHAUSTION_WARN_RATIO: f64 = 0.5;

/// Lifecycle of one issuance run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Generating,
    Finalizing,
    Done,
    Failed,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct IssuanceOutcome {
    /// Accepted codes in output (shuffled) order
    pub codes: Vec<String>,
    pub report: GenerationReport,
}

/// Owns the counter, tables and working issued set of a single run.
///
/// A loop runs once. To keep avoiding earlier codes in a follow-up run,
/// hand [`IssuanceLoop::into_issued`] to a new loop.
pub struct IssuanceLoop<R: Rng = StdRng> {
    params: GenerationParameters,
    tables: PositionTables,
    counter: CounterState,
    grouping: Option<Grouping>,
    max_retries: Option<u64>,
    issued: IssuedCodeSet,
    rng: R,
    phase: Phase,
    advanced: bool,
}

impl IssuanceLoop<StdRng> {
    /// Standard alphabet, seeded from the config or from entropy
    pub fn from_config(config: &GenerationConfig, issued: IssuedCodeSet) -> Result<Self> {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, Alphabet::standard(), issued, rng)
    }
}

impl<R: Rng> IssuanceLoop<R> {
    /// Validate the config, derive parameters and build the position tables
    pub fn new(
        config: &GenerationConfig,
        alphabet: Alphabet,
        issued: IssuedCodeSet,
        mut rng: R,
    ) -> Result<Self> {
        config.validate()?;

        let code_len = rendered_len(config.digit_count, config.grouping.as_ref());
        let reserved = issued.count_with_len(code_len);
        let params = GenerationParameters::new(
            alphabet.len(),
            config.digit_count,
            config.qty_to_generate,
            reserved,
        )?;

        if params.fill_ratio() > EXHAUSTION_WARN_RATIO {
            tracing::warn!(
                qty = params.qty_to_generate,
                reserved = params.reserved,
                permutations = %params.qty_permutations,
                fill_ratio = params.fill_ratio(),
                "Run will fill most of the code space; expect many collisions"
            );
        }

        let tables = PositionTables::build(&alphabet, params.digit_count, &mut rng);
        let counter = CounterState::zero(params.digit_count, params.base);

        tracing::debug!(
            base = params.base,
            digits = params.digit_count,
            qty = params.qty_to_generate,
            max_increment = %params.max_increment,
            max_exponent = params.max_exponent,
            "Issuance loop initialized"
        );

        Ok(Self {
            params,
            tables,
            counter,
            grouping: config.grouping,
            max_retries: config.max_retries,
            issued,
            rng,
            phase: Phase::Initializing,
            advanced: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn tables(&self) -> &PositionTables {
        &self.tables
    }

    pub fn counter(&self) -> &CounterState {
        &self.counter
    }

    pub fn issued(&self) -> &IssuedCodeSet {
        &self.issued
    }

    /// The issued set, including codes accepted by a successful run
    pub fn into_issued(self) -> IssuedCodeSet {
        self.issued
    }

    /// Generate, shuffle and hand the codes to `sink`.
    ///
    /// On any error nothing reaches the sink and the issued set is unchanged.
    pub fn run<S: CodeSink + ?Sized>(&mut self, sink: &mut S) -> Result<IssuanceOutcome> {
        if self.phase != Phase::Initializing {
            return Err(CouponForgeError::internal(format!(
                "issuance loop already ran (phase {:?}); build a new loop for another run",
                self.phase
            )));
        }

        self.phase = Phase::Generating;
        let (codes, collisions) = match self.generate() {
            Ok(generated) => generated,
            Err(e) => {
                self.phase = Phase::Failed;
                tracing::error!(error = %e, "Generation aborted, discarding accepted codes");
                return Err(e);
            }
        };

        self.phase = Phase::Finalizing;
        let codes = match self.finalize(codes, sink) {
            Ok(codes) => codes,
            Err(e) => {
                self.phase = Phase::Failed;
                return Err(e);
            }
        };

        self.phase = Phase::Done;
        let report = GenerationReport::new(codes.len(), self.params.qty_permutations, collisions);
        tracing::info!(
            qty = report.qty_codes,
            collisions = report.collisions,
            sparsity = report.sparsity,
            "Issuance run complete"
        );

        Ok(IssuanceOutcome { codes, report })
    }

    fn generate(&mut self) -> Result<(Vec<String>, u64)> {
        let target = self.params.qty_to_generate;
        let mut accepted = Vec::with_capacity(target);
        let mut seen = HashSet::with_capacity(target);
        let mut collisions = 0u64;

        while accepted.len() < target {
            let code = self.next_candidate()?;

            if self.issued.contains(&code) || seen.contains(&code) {
                collisions += 1;
                tracing::trace!(code = %code, collisions, "Candidate already issued");
                if let Some(limit) = self.max_retries {
                    if collisions > limit {
                        return Err(CouponForgeError::retry_budget(collisions, accepted.len()));
                    }
                }
                continue;
            }

            seen.insert(code.clone());
            accepted.push(code);
        }

        Ok((accepted, collisions))
    }

    /// Advance the counter by one random jump and render the new state.
    ///
    /// The very first jump is one short so the all-zero state is reachable.
    fn next_candidate(&mut self) -> Result<String> {
        let increment = if self.advanced {
            next_increment_digits(&self.params, &mut self.rng)
        } else {
            self.advanced = true;
            let jump = draw_jump(&self.params, &mut self.rng) - 1;
            to_digits(jump, self.params.base, self.params.max_exponent)
        };
        self.counter.add_increment(&increment)?;

        let raw = render(&self.counter, &self.tables);
        Ok(format_grouping(&raw, self.grouping.as_ref()))
    }

    fn finalize<S: CodeSink + ?Sized>(
        &mut self,
        mut codes: Vec<String>,
        sink: &mut S,
    ) -> Result<Vec<String>> {
        codes.shuffle(&mut self.rng);
        sink.accept(&codes)?;
        self.issued.extend(codes.iter().cloned());
        Ok(codes)
    }
}

/// Length in characters of a rendered code
pub fn rendered_len(digit_count: usize, grouping: Option<&Grouping>) -> usize {
    match grouping {
        Some(g) if g.size > 0 && digit_count > 0 => digit_count + (digit_count - 1) / g.size,
        _ => digit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::MemorySink;

    fn small_config(qty: usize, digits: usize) -> GenerationConfig {
        GenerationConfig {
            qty_to_generate: qty,
            digit_count: digits,
            random_seed: Some(11),
            ..Default::default()
        }
    }

    fn small_alphabet() -> Alphabet {
        Alphabet::from_symbols("ABCDE".chars()).unwrap()
    }

    #[test]
    fn test_generates_unique_codes() {
        let config = small_config(50, 4);
        let mut issuance = IssuanceLoop::new(
            &config,
            small_alphabet(),
            IssuedCodeSet::new(),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        let mut sink = MemorySink::new();

        let outcome = issuance.run(&mut sink).unwrap();
        assert_eq!(outcome.codes.len(), 50);
        assert_eq!(sink.codes, outcome.codes);
        assert_eq!(sink.batches, 1);

        let unique: HashSet<&String> = outcome.codes.iter().collect();
        assert_eq!(unique.len(), 50);
        assert!(outcome.codes.iter().all(|c| c.chars().count() == 4));
        assert_eq!(issuance.phase(), Phase::Done);
        assert_eq!(issuance.issued().len(), 50);
    }

    #[test]
    fn test_fills_entire_space() {
        // 5^2 = 25 permutations, all requested
        let config = small_config(25, 2);
        let mut issuance = IssuanceLoop::new(
            &config,
            small_alphabet(),
            IssuedCodeSet::new(),
            StdRng::seed_from_u64(2),
        )
        .unwrap();

        let outcome = issuance.run(&mut MemorySink::new()).unwrap();
        let unique: HashSet<&String> = outcome.codes.iter().collect();
        assert_eq!(unique.len(), 25);
        assert_eq!(outcome.report.sparsity, 0.0);
        assert_eq!(issuance.counter().value(), 24);
    }

    #[test]
    fn test_avoids_issued_codes_up_to_remaining_space() {
        let alphabet = small_alphabet();
        let mut first = IssuanceLoop::new(
            &small_config(10, 2),
            alphabet.clone(),
            IssuedCodeSet::new(),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        let earlier = first.run(&mut MemorySink::new()).unwrap().codes;
        let issued = first.into_issued();

        // a fresh loop has different tables, so its counter will hit earlier codes
        let mut second = IssuanceLoop::new(
            &small_config(15, 2),
            alphabet,
            issued.clone(),
            StdRng::seed_from_u64(4),
        )
        .unwrap();
        let outcome = second.run(&mut MemorySink::new()).unwrap();

        assert_eq!(outcome.codes.len(), 15);
        assert!(outcome.codes.iter().all(|c| !earlier.contains(c)));
        assert_eq!(outcome.report.collisions, 10);
        assert_eq!(second.issued().len(), 25);
    }

    #[test]
    fn test_rejects_zero_quantity_before_building() {
        let err = IssuanceLoop::from_config(&small_config(0, 4), IssuedCodeSet::new())
            .err()
            .unwrap();
        assert!(matches!(err, CouponForgeError::Config { .. }));
    }

    #[test]
    fn test_rejects_quantity_beyond_remaining_space() {
        let issued = IssuedCodeSet::from_lines("AA\nAB\n");
        let result = IssuanceLoop::new(
            &small_config(24, 2),
            small_alphabet(),
            issued,
            StdRng::seed_from_u64(5),
        );
        assert!(matches!(result, Err(CouponForgeError::Config { .. })));
    }

    #[test]
    fn test_retry_budget_discards_run() {
        let alphabet = small_alphabet();
        let mut first = IssuanceLoop::new(
            &small_config(20, 2),
            alphabet.clone(),
            IssuedCodeSet::new(),
            StdRng::seed_from_u64(6),
        )
        .unwrap();
        first.run(&mut MemorySink::new()).unwrap();
        let issued = first.into_issued();

        let mut config = small_config(5, 2);
        config.max_retries = Some(0);
        let mut second =
            IssuanceLoop::new(&config, alphabet, issued, StdRng::seed_from_u64(7)).unwrap();
        let mut sink = MemorySink::new();

        let err = second.run(&mut sink).unwrap_err();
        assert!(matches!(err, CouponForgeError::RetryBudgetExhausted { .. }));
        assert!(sink.codes.is_empty());
        assert_eq!(sink.batches, 0);
        assert_eq!(second.phase(), Phase::Failed);
        assert_eq!(second.issued().len(), 20);
    }

    #[test]
    fn test_grouping_applied() {
        let mut config = small_config(5, 9);
        config.grouping = Some(Grouping::new(3, '-'));
        let mut issuance = IssuanceLoop::from_config(&config, IssuedCodeSet::new()).unwrap();

        let outcome = issuance.run(&mut MemorySink::new()).unwrap();
        for code in &outcome.codes {
            assert_eq!(code.len(), 11);
            assert_eq!(&code[3..4], "-");
            assert_eq!(&code[7..8], "-");
        }
    }

    #[test]
    fn test_second_run_is_rejected() {
        let mut issuance =
            IssuanceLoop::from_config(&small_config(3, 6), IssuedCodeSet::new()).unwrap();
        issuance.run(&mut MemorySink::new()).unwrap();
        let err = issuance.run(&mut MemorySink::new()).unwrap_err();
        assert!(matches!(err, CouponForgeError::Internal { .. }));
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = small_config(20, 8);
        let a = IssuanceLoop::from_config(&config, IssuedCodeSet::new())
            .unwrap()
            .run(&mut MemorySink::new())
            .unwrap();
        let b = IssuanceLoop::from_config(&config, IssuedCodeSet::new())
            .unwrap()
            .run(&mut MemorySink::new())
            .unwrap();
        assert_eq!(a.codes, b.codes);
    }

    #[test]
    fn test_rendered_len() {
        assert_eq!(rendered_len(10, None), 10);
        assert_eq!(rendered_len(9, Some(&Grouping::new(3, '-'))), 11);
        assert_eq!(rendered_len(10, Some(&Grouping::new(3, '-'))), 13);
    }
}
