use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cull_engine::{
    cull, default_model_path, extract_features, load_image, Classifier, CullRequest, FileOutcome,
    FileReport, LinearModel,
};

#[derive(Parser)]
#[command(name = "photocull")]
#[command(about = "Classifier-driven photo culling for large shoots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cull a source folder into a destination folder
    Run {
        /// Folder containing the shoot
        #[arg(short, long)]
        source: PathBuf,

        /// Folder that receives the keepers
        #[arg(short, long)]
        dest: PathBuf,

        /// Keep threshold; a file is copied when its score >= threshold
        #[arg(short, long, default_value_t = 0.6)]
        threshold: f64,

        /// Model file (defaults to model/culler_model.json next to the executable)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Write per-file results to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a single image and print its feature vector
    Score {
        /// Image file to score
        path: PathBuf,

        /// Model file (defaults to model/culler_model.json next to the executable)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            dest,
            threshold,
            model,
            output,
        } => run_cull(source, dest, threshold, model, output),
        Commands::Score { path, model } => score_one(path, model),
    }
}

fn load_model(path: Option<PathBuf>) -> Result<LinearModel> {
    let path = path.unwrap_or_else(default_model_path);
    LinearModel::from_file(&path)
        .with_context(|| format!("Failed to load classifier model from {}", path.display()))
}

fn run_cull(
    source: PathBuf,
    dest: PathBuf,
    threshold: f64,
    model: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let model = load_model(model)?;

    println!(
        "🔍 Culling {} -> {} (threshold {})",
        source.display(),
        dest.display(),
        threshold
    );

    let request = CullRequest {
        source,
        dest,
        threshold,
    };

    let mut reports: Vec<FileReport> = Vec::new();
    let summary = cull(&model, &request, |report| {
        let name = report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.path.display().to_string());
        match &report.outcome {
            FileOutcome::Copied { score } => {
                println!("[{:>3}%] ✅ {} ({:.3})", report.percent, name, score)
            }
            FileOutcome::Skipped { score } => {
                println!("[{:>3}%] ⏭️  {} ({:.3})", report.percent, name, score)
            }
            FileOutcome::Failed { reason } => {
                println!("[{:>3}%] ⚠️  {}: {}", report.percent, name, reason)
            }
        }
        reports.push(report.clone());
    })?;

    println!(
        "📸 {} files: {} copied, {} skipped, {} failed",
        summary.total, summary.copied, summary.skipped, summary.failed
    );

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize results to JSON")?;
        std::fs::write(&output, json)
            .with_context(|| format!("Failed to write output to {}", output.display()))?;
        println!("💾 Results saved to: {}", output.display());
    }

    Ok(())
}

fn score_one(path: PathBuf, model: Option<PathBuf>) -> Result<()> {
    let model = load_model(model)?;

    let img = load_image(&path)?;
    let features = extract_features(&img);
    let score = model
        .predict_batch(std::slice::from_ref(&features))?
        .first()
        .copied()
        .context("Classifier returned no score")?;

    println!("{} ({}x{})", path.display(), img.width(), img.height());
    println!("  sharpness:    {:.4}", features.sharpness);
    println!("  brightness:   {:.4}", features.brightness);
    println!("  noise:        {:.4}", features.noise);
    println!("  mean_blue:    {:.4}", features.mean_blue);
    println!("  mean_green:   {:.4}", features.mean_green);
    println!("  mean_red:     {:.4}", features.mean_red);
    println!("  std_blue:     {:.4}", features.std_blue);
    println!("  std_green:    {:.4}", features.std_green);
    println!("  std_red:      {:.4}", features.std_red);
    println!("  entropy:      {:.4}", features.entropy);
    println!("  edge_density: {:.4}", features.edge_density);
    println!("  score:        {:.4}", score);

    Ok(())
}
