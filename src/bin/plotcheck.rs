//! Command-line front end for the spacing analyzer.
//!
//! Reads an SVG drawing, runs the analysis, prints the bounded issue
//! report, and optionally writes the annotated SVG and a JSON report.

use anyhow::{bail, ensure, Context, Result};
use plotcheck::{run_analysis_observed, AnalysisRequest, CancelFlag};
use std::fs;

const USAGE: &str = "Usage: plotcheck <input.svg> [options]

Options:
  --threshold <units>   Flag pairs closer than this distance (default 0.5)
  --budget <tier|N>     Comparison budget: fast (100K), medium (500K),
                        thorough (1M, default), exhaustive (5M), or a number
  --out <file>          Write the annotated SVG here
  --report <file>       Write the JSON report here
  --quiet               Suppress progress output";

struct CliArgs {
    input: String,
    threshold: f32,
    max_comparisons: u64,
    out: Option<String>,
    report: Option<String>,
    quiet: bool,
}

fn parse_budget(value: &str) -> Result<u64> {
    // Preset tiers from the analyzer UI, or a raw count
    match value {
        "fast" => Ok(100_000),
        "medium" => Ok(500_000),
        "thorough" => Ok(1_000_000),
        "exhaustive" => Ok(5_000_000),
        other => other
            .parse::<u64>()
            .with_context(|| format!("invalid budget '{}'", other)),
    }
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut threshold = 0.5f32;
    let mut max_comparisons = 1_000_000u64;
    let mut out = None;
    let mut report = None;
    let mut quiet = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--threshold" => {
                let value = args.next().context("--threshold requires a value")?;
                threshold = value
                    .parse::<f32>()
                    .with_context(|| format!("invalid threshold '{}'", value))?;
            }
            "--budget" => {
                let value = args.next().context("--budget requires a value")?;
                max_comparisons = parse_budget(&value)?;
            }
            "--out" => out = Some(args.next().context("--out requires a path")?),
            "--report" => report = Some(args.next().context("--report requires a path")?),
            "--quiet" => quiet = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option '{}'\n{}", other, USAGE),
            other => {
                ensure!(input.is_none(), "multiple input files given\n{}", USAGE);
                input = Some(other.to_string());
            }
        }
    }

    let input = input.with_context(|| format!("no input file given\n{}", USAGE))?;
    ensure!(threshold > 0.0, "threshold must be positive");
    ensure!(max_comparisons > 0, "budget must be positive");

    Ok(CliArgs {
        input,
        threshold,
        max_comparisons,
        out,
        report,
        quiet,
    })
}

fn main() -> Result<()> {
    let cli = parse_args()?;

    let document = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input))?;

    let request = AnalysisRequest {
        threshold: cli.threshold,
        max_comparisons: cli.max_comparisons,
    };

    let quiet = cli.quiet;
    let result = run_analysis_observed(
        &document,
        &request,
        &mut |event| {
            if !quiet {
                eprintln!("[plotcheck] {:3.0}% {}", event.percent, event.message);
            }
        },
        &CancelFlag::new(),
    )?;

    let summary = &result.summary;
    println!(
        "{} segments, {} comparisons ({} skipped), {} issues [{:?}] in {:.1}ms",
        summary.segment_count,
        summary.comparisons,
        summary.skipped,
        summary.issue_count,
        summary.completion,
        summary.elapsed_ms
    );

    if !result.decode_errors.is_empty() {
        println!("{} coordinate decode errors:", result.decode_errors.len());
        for err in &result.decode_errors {
            println!("  {} {}: {}", err.kind.label(), err.owner_index, err.detail);
        }
    }

    if !result.rows.is_empty() {
        println!("\n{:<10} {:<14} {:<14} location", "distance", "element 1", "element 2");
        for row in &result.rows {
            println!("{:<10} {:<14} {:<14} {}", row.distance, row.segment1, row.segment2, row.location);
        }
        if result.summary.issue_count > result.rows.len() {
            println!("... showing first {} of {} issues", result.rows.len(), result.summary.issue_count);
        }
    }

    if let Some(path) = &cli.out {
        fs::write(path, &result.annotated_svg)
            .with_context(|| format!("failed to write {}", path))?;
        println!("annotated SVG written to {}", path);
    }

    if let Some(path) = &cli.report {
        let report = serde_json::json!({
            "summary": summary,
            "issues": result.rows,
            "decode_errors": result.decode_errors,
        });
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write {}", path))?;
        println!("report written to {}", path);
    }

    Ok(())
}
