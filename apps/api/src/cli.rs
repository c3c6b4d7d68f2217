use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::Config;
use crate::models::analysis::AnalysisResult;
use crate::routes::analyze::AnalyzePayload;
use crate::state::build_engine;

#[derive(Parser, Debug)]
#[command(
    name = "shortlist-api",
    about = "Rank candidate resumes against a job description",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze a JSON file of resumes and write the ranked shortlist
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file with `resumes` and `job_description`
    pub input: PathBuf,
    /// Where to write the ranked results
    #[arg(long, short, default_value = "shortlisted_candidates.json")]
    pub output: PathBuf,
    /// How many top candidates to print
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Runs the offline analysis and returns the ranked results it wrote.
pub fn run_analyze(config: &Config, args: &AnalyzeArgs) -> Result<Vec<AnalysisResult>> {
    let data = read_input(&args.input)?;
    let payload = AnalyzePayload::from_value(data).map_err(|e| anyhow::anyhow!("{e}"))?;

    let engine = build_engine(config)?;
    let results = engine.analyze(&payload.resumes, &payload.job_description)?;

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Results saved to {}", args.output.display());

    print_top(&results, args.top);
    Ok(results)
}

fn read_input(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("File '{}' not found or unreadable", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON format in '{}'", path.display()))
}

fn print_top(results: &[AnalysisResult], top: usize) {
    println!("\nTOP {top} CANDIDATES:");
    println!("{}", "=".repeat(50));
    for (rank, result) in results.iter().take(top).enumerate() {
        let preview: String = result.skills.chars().take(100).collect();
        println!("{}. {} - Score: {}/100", rank + 1, result.name, result.score);
        println!("   Skills: {preview}...");
        println!("   Experience: {}", result.experience);
        println!("   Reasoning: {}", result.reasoning);
        println!("{}", "-".repeat(50));
    }
}
