//! Coupon Forge - collision-free coupon and invite code generation
//!
//! Generates batches of short, readable codes that never repeat a code
//! issued before, and records them for the next run.

use anyhow::Context;
use coupon_forge::{
    batch::{BatchPlan, GroupReport},
    cli::{self, CliCommand, CliOptions, RunMode},
    issuance::{CodeSink, CouponRecordSink, FileIssuanceStore, FileSink, IssuanceLoop, IssuanceStore, IssuedCodeSet},
    types::{group_thousands, GenerationConfig},
    Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize the library
    coupon_forge::init().context("failed to initialize")?;

    // Get command line arguments
    let args: Vec<String> = env::args().skip(1).collect();
    let base = GenerationConfig::from_env().context("invalid COUPON_* environment variable")?;

    let options = match cli::parse_args(&args, base) {
        Ok(CliCommand::Help) => {
            print_help();
            return Ok(());
        }
        Ok(CliCommand::Version) => {
            println!("coupon-forge {}", coupon_forge::VERSION);
            return Ok(());
        }
        Ok(CliCommand::Generate(options)) => options,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(2);
        }
    };

    init_tracing(options.verbose);

    if let Err(e) = run(&options) {
        eprintln!("{}", e.user_message());
        process::exit(1);
    }

    Ok(())
}

/// Log to stderr, `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main coupon forge workflow
fn run(options: &CliOptions) -> Result<()> {
    let mut store = FileIssuanceStore::new(&options.existing).require_existing(options.require_existing);
    let issued = store.load()?;
    if !issued.is_empty() {
        println!("📚 {} codes already issued ({})", group_thousands(issued.len() as u128), options.existing.display());
    }

    match &options.mode {
        RunMode::Single { output } => {
            let new_codes = run_single(options, issued, output)?;
            if options.record {
                store.append(&new_codes)?;
                print_recorded(new_codes.len(), &options.existing);
            }
            Ok(())
        }
        RunMode::Batch { plan, output_dir } => run_batch(options, &mut store, issued, plan, output_dir),
    }
}

fn print_recorded(count: usize, existing: &Path) {
    println!("📝 Recorded {} new codes in {}", group_thousands(count as u128), existing.display());
}

fn run_single(options: &CliOptions, issued: IssuedCodeSet, output: &Path) -> Result<Vec<String>> {
    let mut issuance = IssuanceLoop::from_config(&options.config, issued)?;
    let mut sink = open_sink(options, output.to_path_buf());

    let outcome = issuance.run(&mut sink)?;

    println!("✅ {}", outcome.report);
    println!("📄 Wrote {}", output.display());
    Ok(outcome.codes)
}

/// Each group is recorded as soon as its file is written, so a later failing
/// group cannot leave earlier group files unrecorded
fn run_batch(
    options: &CliOptions,
    store: &mut FileIssuanceStore,
    issued: IssuedCodeSet,
    plan: &BatchPlan,
    output_dir: &Path,
) -> Result<()> {
    println!(
        "📦 Generating {} groups ({} codes)",
        plan.total_groups(),
        group_thousands(plan.total_codes() as u128)
    );

    let progress = ProgressBar::new(plan.total_groups() as u64);
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style.progress_chars("=> "));

    let mut recorded = 0usize;
    let outcome = plan.run(
        &options.config,
        issued,
        |spec| {
            progress.set_message(spec.file_name.clone());
            let file_name = if options.discount.is_some() {
                Path::new(&spec.file_name).with_extension("jsonl")
            } else {
                PathBuf::from(&spec.file_name)
            };
            Ok(open_sink(options, output_dir.join(file_name)))
        },
        |group: &GroupReport, codes: &[String]| {
            if options.record {
                store.append(codes)?;
                recorded += codes.len();
            }
            progress.inc(1);
            progress.println(format!("   {} → {}", group.spec.file_name, group.report));
            Ok(())
        },
    );

    if options.record {
        print_recorded(recorded, &options.existing);
    }

    match outcome {
        Ok(outcome) => {
            progress.finish_with_message("done");
            println!(
                "✅ Generated {} codes in {} files under {}",
                group_thousands(outcome.new_codes.len() as u128),
                outcome.groups.len(),
                output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            progress.abandon_with_message("failed");
            Err(e)
        }
    }
}

fn open_sink(options: &CliOptions, path: PathBuf) -> Box<dyn CodeSink> {
    match options.discount {
        Some(discount) => {
            let sink = CouponRecordSink::new(path, discount);
            match &options.target {
                Some(target) => Box::new(sink.with_target(target.as_str())),
                None => Box::new(sink),
            }
        }
        None => Box::new(FileSink::new(path)),
    }
}

/// Print help information
fn print_help() {
    println!("🎟️  Coupon Forge - collision-free coupon code generation");
    println!("═══════════════════════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    coupon-forge <QUANTITY> [OPTIONS]");
    println!("    coupon-forge --batch <GROUPSxQTY,...> [OPTIONS]");
    println!();
    println!("EXAMPLES:");
    println!("    coupon-forge 1000                          # 1,000 codes into new-codes.csv");
    println!("    coupon-forge 500 -g 5 -s -                 # grouped like ABCDE-FGHJK");
    println!("    coupon-forge --batch 5x100,25x30,35x250    # Group_100_1.csv ... Group_250_35.csv");
    println!("    coupon-forge 200 --discount 0.65           # JSON coupon records");
    println!();
    println!("OPTIONS:");
    println!("    -d, --digits <N>         Characters per code (default: 10)");
    println!("    -g, --group <N>          Insert a spacer every N characters");
    println!("    -s, --spacer <C>         Spacer character (default: -)");
    println!("        --no-group           Disable grouping set in the environment");
    println!("        --seed <N>           Seed for a reproducible run");
    println!("        --max-retries <N>    Give up after N collisions");
    println!("    -e, --existing <PATH>    Issued codes file (default: existing-codes.csv)");
    println!("        --require-existing   Fail if the issued codes file is missing");
    println!("        --no-record          Do not append new codes to the issued codes file");
    println!("    -o, --output <PATH>      Output file (default: new-codes.csv)");
    println!("        --output-dir <DIR>   Directory for batch group files (default: .)");
    println!("    -b, --batch <PLAN>       Generate several group files");
    println!("        --discount <F>       Write coupon records with this discount (0-1)");
    println!("        --target <T>         Discount target for records (default: RETAIL)");
    println!("    -v, --verbose            Debug logging (RUST_LOG overrides)");
    println!("    -h, --help               Show this help");
    println!("    -V, --version            Show version");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    COUPON_DIGITS        Default digit count");
    println!("    COUPON_GROUP_SIZE    Default group size");
    println!("    COUPON_SPACER        Default spacer");
    println!("    COUPON_SEED          Default seed");
    println!("    COUPON_MAX_RETRIES   Default collision budget");
    println!();
    println!("Made with ❤️ and 🦀 Rust");
}
