//! Batch plans - several output groups generated in one process
//!
//! Each group gets a fresh issuance loop (new tables, new counter). The issued
//! set is carried from one group to the next so no code repeats across files.

use std::str::FromStr;

use regex::Regex;

use crate::error::{CouponForgeError, Result};
use crate::issuance::{CodeSink, IssuanceLoop, IssuedCodeSet};
use crate::types::{GenerationConfig, GenerationReport};

/// `groups` output files of `qty` codes each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEntry {
    pub groups: usize,
    pub qty: usize,
}

/// One output group about to be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub qty: usize,
    /// 1-based index within its entry
    pub index: usize,
    /// 0-based position across the whole plan
    pub ordinal: usize,
    pub file_name: String,
}

/// Report of one finished group
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub spec: GroupSpec,
    pub report: GenerationReport,
}

/// Everything produced by a batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub groups: Vec<GroupReport>,
    /// Codes issued by this batch, in group order
    pub new_codes: Vec<String>,
    /// Issued set including every group of this batch
    pub issued: IssuedCodeSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    entries: Vec<BatchEntry>,
}

impl BatchPlan {
    pub fn new(entries: Vec<BatchEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CouponForgeError::validation("batch plan is empty"));
        }
        if let Some(bad) = entries.iter().find(|e| e.groups == 0 || e.qty == 0) {
            return Err(CouponForgeError::validation(format!(
                "batch entry {}x{} must have non-zero groups and quantity",
                bad.groups, bad.qty
            )));
        }
        Ok(Self { entries })
    }

    /// 5 groups of 100, 25 of 30 and 35 of 250
    pub fn historical() -> Self {
        Self {
            entries: vec![
                BatchEntry { groups: 5, qty: 100 },
                BatchEntry { groups: 25, qty: 30 },
                BatchEntry { groups: 35, qty: 250 },
            ],
        }
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn total_groups(&self) -> usize {
        self.entries.iter().map(|e| e.groups).sum()
    }

    pub fn total_codes(&self) -> usize {
        self.entries.iter().map(|e| e.groups * e.qty).sum()
    }

    /// Output file name of group `index` of size `qty`
    pub fn group_file_name(qty: usize, index: usize) -> String {
        format!("Group_{}_{}.csv", qty, index)
    }

    /// Every group of the plan in generation order
    pub fn groups(&self) -> Vec<GroupSpec> {
        let mut specs = Vec::with_capacity(self.total_groups());
        for entry in &self.entries {
            for index in 1..=entry.groups {
                specs.push(GroupSpec {
                    qty: entry.qty,
                    index,
                    ordinal: specs.len(),
                    file_name: Self::group_file_name(entry.qty, index),
                });
            }
        }
        specs
    }

    /// Run every group.
    ///
    /// `make_sink` opens the destination for a group. `on_group` receives
    /// each group and its codes as soon as the sink has accepted them, which
    /// is where callers record them as issued. A seeded `base` config yields a
    /// distinct but reproducible seed per group. The first failing group (or
    /// `on_group` error) aborts the batch; earlier groups stay written and
    /// have already been passed to `on_group`.
    pub fn run<S, F, P>(
        &self,
        base: &GenerationConfig,
        issued: IssuedCodeSet,
        mut make_sink: F,
        mut on_group: P,
    ) -> Result<BatchOutcome>
    where
        S: CodeSink,
        F: FnMut(&GroupSpec) -> Result<S>,
        P: FnMut(&GroupReport, &[String]) -> Result<()>,
    {
        let mut issued = issued;
        let mut groups = Vec::with_capacity(self.total_groups());
        let mut new_codes = Vec::with_capacity(self.total_codes());

        for spec in self.groups() {
            let config = GenerationConfig {
                qty_to_generate: spec.qty,
                random_seed: base
                    .random_seed
                    .map(|seed| seed.wrapping_add(spec.ordinal as u64)),
                ..base.clone()
            };

            let mut sink = make_sink(&spec)?;
            let mut issuance = IssuanceLoop::from_config(&config, issued)?;
            let outcome = issuance.run(&mut sink)?;
            issued = issuance.into_issued();

            tracing::debug!(file = %spec.file_name, qty = spec.qty, "Group generated");

            let group = GroupReport {
                spec,
                report: outcome.report,
            };
            on_group(&group, &outcome.codes)?;
            new_codes.extend(outcome.codes);
            groups.push(group);
        }

        Ok(BatchOutcome {
            groups,
            new_codes,
            issued,
        })
    }
}

impl FromStr for BatchPlan {
    type Err = CouponForgeError;

    /// Parse `"5x100,25x30"` (groups `x` quantity, comma separated)
    fn from_str(s: &str) -> Result<Self> {
        let entry_regex = Regex::new(r"^\s*(\d+)\s*[xX]\s*(\d+)\s*$")
            .map_err(|e| CouponForgeError::internal(format!("Invalid batch regex: {}", e)))?;

        let entries = s
            .split(',')
            .map(|part| {
                let caps = entry_regex.captures(part).ok_or_else(|| {
                    CouponForgeError::validation(format!(
                        "batch entry '{}' is not of the form GROUPSxQTY",
                        part.trim()
                    ))
                })?;
                let number = |i: usize| {
                    caps[i].parse::<usize>().map_err(|_| {
                        CouponForgeError::validation(format!("batch entry '{}' is too large", part.trim()))
                    })
                };
                Ok(BatchEntry {
                    groups: number(1)?,
                    qty: number(2)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::MemorySink;
    use std::collections::HashSet;

    #[test]
    fn test_parse_plan() {
        let plan: BatchPlan = "5x100, 25X30,35 x 250".parse().unwrap();
        assert_eq!(plan, BatchPlan::historical());
        assert_eq!(plan.total_groups(), 65);
        assert_eq!(plan.total_codes(), 500 + 750 + 8750);
    }

    #[test]
    fn test_parse_rejects_bad_plans() {
        assert!("".parse::<BatchPlan>().is_err());
        assert!("5".parse::<BatchPlan>().is_err());
        assert!("0x10".parse::<BatchPlan>().is_err());
        assert!("2x0".parse::<BatchPlan>().is_err());
        assert!("2x10,abc".parse::<BatchPlan>().is_err());
    }

    #[test]
    fn test_group_names() {
        let plan: BatchPlan = "2x100,1x30".parse().unwrap();
        let names: Vec<String> = plan.groups().into_iter().map(|g| g.file_name).collect();
        assert_eq!(names, vec!["Group_100_1.csv", "Group_100_2.csv", "Group_30_1.csv"]);
    }

    #[test]
    fn test_batch_never_repeats_codes() {
        let plan: BatchPlan = "3x40,2x15".parse().unwrap();
        let base = GenerationConfig {
            digit_count: 4,
            random_seed: Some(99),
            ..Default::default()
        };
        let issued = IssuedCodeSet::from_lines("AAAA\nBBBB\n");

        let mut seen_groups = 0;
        let outcome = plan
            .run(&base, issued, |_| Ok(MemorySink::new()), |_, _| {
                seen_groups += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(seen_groups, 5);
        assert_eq!(outcome.groups.len(), 5);
        assert_eq!(outcome.new_codes.len(), 150);

        let unique: HashSet<&String> = outcome.new_codes.iter().collect();
        assert_eq!(unique.len(), 150);
        assert!(!unique.contains(&"AAAA".to_string()));
        assert_eq!(outcome.issued.len(), 152);
    }

    #[test]
    fn test_failed_group_keeps_earlier_groups_handed_out() {
        // one digit gives 32 permutations; the second group of 20 cannot fit beside the first
        let plan: BatchPlan = "1x20,1x20".parse().unwrap();
        let base = GenerationConfig {
            digit_count: 1,
            random_seed: Some(5),
            ..Default::default()
        };

        let mut recorded: Vec<String> = Vec::new();
        let mut opened = 0;
        let err = plan
            .run(
                &base,
                IssuedCodeSet::new(),
                |_| {
                    opened += 1;
                    Ok(MemorySink::new())
                },
                |group, codes| {
                    assert_eq!(group.spec.file_name, "Group_20_1.csv");
                    recorded.extend_from_slice(codes);
                    Ok(())
                },
            )
            .unwrap_err();

        assert!(matches!(err, CouponForgeError::Config { .. }));
        assert_eq!(opened, 2);
        assert_eq!(recorded.len(), 20);
    }

    #[test]
    fn test_group_callback_error_aborts_batch() {
        let plan: BatchPlan = "3x5".parse().unwrap();
        let base = GenerationConfig {
            digit_count: 6,
            random_seed: Some(8),
            ..Default::default()
        };

        let mut calls = 0;
        let err = plan
            .run(&base, IssuedCodeSet::new(), |_| Ok(MemorySink::new()), |_, _| {
                calls += 1;
                Err(CouponForgeError::io("disk full", None))
            })
            .unwrap_err();

        assert!(matches!(err, CouponForgeError::Io { .. }));
        assert_eq!(calls, 1);
    }
}
