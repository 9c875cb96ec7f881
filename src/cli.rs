//! Command line parsing

use std::path::PathBuf;

use crate::batch::BatchPlan;
use crate::error::{CouponForgeError, Result};
use crate::types::{GenerationConfig, Grouping};

pub const DEFAULT_EXISTING_PATH: &str = "existing-codes.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "new-codes.csv";
pub const DEFAULT_RECORD_OUTPUT_PATH: &str = "new-codes.jsonl";

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Help,
    Version,
    Generate(CliOptions),
}

/// Work to run: a single file or a batch of group files
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Single { output: PathBuf },
    Batch { plan: BatchPlan, output_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: GenerationConfig,
    pub mode: RunMode,
    /// Newline-delimited file of codes issued so far
    pub existing: PathBuf,
    pub require_existing: bool,
    /// Append new codes to `existing` after a successful run
    pub record: bool,
    /// Write JSON coupon records with this discount instead of bare codes
    pub discount: Option<f64>,
    pub target: Option<String>,
    pub verbose: bool,
}

/// Parse arguments (without the program name) on top of `base`
pub fn parse_args(args: &[String], base: GenerationConfig) -> Result<CliCommand> {
    let mut config = base;
    let mut quantity: Option<usize> = None;
    let mut batch: Option<BatchPlan> = None;
    let mut output: Option<PathBuf> = None;
    let mut output_dir = PathBuf::from(".");
    let mut existing = PathBuf::from(DEFAULT_EXISTING_PATH);
    let mut require_existing = false;
    let mut record = true;
    let mut discount = None;
    let mut target = None;
    let mut verbose = false;
    let mut group_size: Option<usize> = config.grouping.map(|g| g.size);
    let mut spacer: Option<char> = config.grouping.map(|g| g.spacer);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "-d" | "--digits" => config.digit_count = parse_number(arg, next_value(&mut iter, arg)?)?,
            "-g" | "--group" => group_size = Some(parse_number(arg, next_value(&mut iter, arg)?)?),
            "--no-group" => {
                group_size = None;
                spacer = None;
            }
            "-s" | "--spacer" => spacer = Some(parse_spacer(next_value(&mut iter, arg)?)?),
            "--seed" => config.random_seed = Some(parse_number(arg, next_value(&mut iter, arg)?)?),
            "--max-retries" => config.max_retries = Some(parse_number(arg, next_value(&mut iter, arg)?)?),
            "-e" | "--existing" => existing = PathBuf::from(next_value(&mut iter, arg)?),
            "--require-existing" => require_existing = true,
            "--no-record" => record = false,
            "-o" | "--output" => output = Some(PathBuf::from(next_value(&mut iter, arg)?)),
            "--output-dir" => output_dir = PathBuf::from(next_value(&mut iter, arg)?),
            "-b" | "--batch" => batch = Some(next_value(&mut iter, arg)?.parse()?),
            "--discount" => discount = Some(parse_discount(next_value(&mut iter, arg)?)?),
            "--target" => target = Some(next_value(&mut iter, arg)?.to_string()),
            "-v" | "--verbose" => verbose = true,
            other if other.starts_with('-') => {
                return Err(CouponForgeError::cli(format!("unknown option '{}'", other)));
            }
            other => {
                if quantity.is_some() {
                    return Err(CouponForgeError::cli(format!(
                        "unexpected argument '{}'",
                        other
                    )));
                }
                quantity = Some(parse_number("quantity", other)?);
            }
        }
    }

    config.grouping = match (group_size, spacer) {
        (Some(size), spacer) => Some(Grouping::new(size, spacer.unwrap_or('-'))),
        (None, Some(_)) => {
            return Err(CouponForgeError::cli("--spacer needs --group to take effect"));
        }
        (None, None) => None,
    };

    if target.is_some() && discount.is_none() {
        return Err(CouponForgeError::cli("--target only applies with --discount"));
    }

    let mode = match (quantity, batch) {
        (Some(_), Some(_)) => {
            return Err(CouponForgeError::cli(
                "give either a quantity or --batch, not both",
            ));
        }
        (Some(qty), None) => {
            config.qty_to_generate = qty;
            let default_output = if discount.is_some() {
                DEFAULT_RECORD_OUTPUT_PATH
            } else {
                DEFAULT_OUTPUT_PATH
            };
            RunMode::Single {
                output: output.unwrap_or_else(|| PathBuf::from(default_output)),
            }
        }
        (None, Some(plan)) => {
            if output.is_some() {
                return Err(CouponForgeError::cli(
                    "--output is for single runs; use --output-dir with --batch",
                ));
            }
            RunMode::Batch { plan, output_dir }
        }
        (None, None) => {
            return Err(CouponForgeError::cli(
                "missing quantity of codes to generate",
            ));
        }
    };

    config.validate()?;

    Ok(CliCommand::Generate(CliOptions {
        config,
        mode,
        existing,
        require_existing,
        record,
        discount,
        target,
        verbose,
    }))
}

fn next_value<'a>(iter: &mut std::slice::Iter<'a, String>, name: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| CouponForgeError::cli(format!("{} requires a value", name)))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .replace('_', "")
        .parse::<T>()
        .map_err(|_| CouponForgeError::cli(format!("{} expects a non-negative number, got '{}'", name, raw)))
}

fn parse_spacer(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CouponForgeError::cli(format!(
            "spacer must be a single character, got '{}'",
            raw
        ))),
    }
}

fn parse_discount(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CouponForgeError::cli(format!("discount expects a number, got '{}'", raw)))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(CouponForgeError::cli(format!(
            "discount is a fraction between 0 and 1, got {}",
            value
        )));
    }
    Ok(value)
}
