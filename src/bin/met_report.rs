use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meteval::{analyze, io::{write_json, MetVectors}, AnalysisConfig};

#[derive(Parser, Debug)]
#[command(name = "met_report", about = "MET response / resolution comparison: ML vs PUPPI")]
struct Args {
    /// .safetensors file with [N, 2] tensors `truth`, `ml`, `puppi`
    #[arg(long)]
    input: PathBuf,

    /// JSON report output path
    #[arg(long)]
    output: PathBuf,

    /// Number of truth-MET bins
    #[arg(long, default_value_t = 20)]
    nbins: usize,

    /// Upper edge of the truth-MET domain (GeV)
    #[arg(long, default_value_t = 400.0)]
    met_max: f64,

    /// Bins of the 1-D distribution histograms
    #[arg(long, default_value_t = 40)]
    hist_bins: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let v = MetVectors::load(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!(events = v.truth.nrows(), input = %args.input.display(), "loaded MET vectors");

    let cfg = AnalysisConfig {
        nbins: args.nbins,
        met_max: args.met_max,
        hist_bins: args.hist_bins,
        ..AnalysisConfig::default()
    };

    let report = analyze(v.truth.view(), v.ml.view(), v.puppi.view(), &cfg)?;
    let s = &report.summary;
    info!(
        ml_x = s.ml.x, ml_y = s.ml.y, puppi_x = s.puppi.x, puppi_y = s.puppi.y,
        "one-bin response-corrected resolution"
    );
    info!(x_dif = s.x_res_avg_dif, y_dif = s.y_res_avg_dif, "PUPPI - ML resolution difference");

    write_json(&report, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(output = %args.output.display(), "report written");

    Ok(())
}
