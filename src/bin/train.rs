//! Offline training binary.
//!
//! Reads the clinical CSV export, runs the full pipeline (impute/encode,
//! neighborhood cleaning, borderline oversampling, gradient boosting), and
//! writes the JSON artifact the assessment TUI loads at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train -- --data <csv> [--out <path>] [--label <column>] \
//!     [--seed <u64>] [--enn-k <n>] [--smote-k <n>] [--smote-m <n>] \
//!     [--categorical <column>]...
//! ```

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crkp_risk::ports::RiskModel;
use crkp_risk::training::TrainingConfig;

const USAGE: &str = "Usage: train --data <csv> [--out <path>] [--label <column>] \
                     [--seed <u64>] [--enn-k <n>] [--smote-k <n>] [--smote-m <n>] \
                     [--categorical <column>]...";

fn usage_exit() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(2);
}

fn next_value(args: &mut impl Iterator<Item = String>) -> String {
    match args.next() {
        Some(v) if !v.is_empty() => v,
        _ => usage_exit(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let mut data_path: Option<std::path::PathBuf> = None;
    let mut out_path = std::path::PathBuf::from("model/model.json");
    let mut label: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut enn_k: Option<usize> = None;
    let mut smote_k: Option<usize> = None;
    let mut smote_m: Option<usize> = None;
    let mut categorical: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_path = Some(std::path::PathBuf::from(next_value(&mut args))),
            "--out" => out_path = std::path::PathBuf::from(next_value(&mut args)),
            "--label" => label = Some(next_value(&mut args)),
            "--seed" => match next_value(&mut args).parse() {
                Ok(v) => seed = Some(v),
                Err(_) => usage_exit(),
            },
            "--enn-k" => match next_value(&mut args).parse() {
                Ok(v) => enn_k = Some(v),
                Err(_) => usage_exit(),
            },
            "--smote-k" => match next_value(&mut args).parse() {
                Ok(v) => smote_k = Some(v),
                Err(_) => usage_exit(),
            },
            "--smote-m" => match next_value(&mut args).parse() {
                Ok(v) => smote_m = Some(v),
                Err(_) => usage_exit(),
            },
            "--categorical" => categorical.push(next_value(&mut args)),
            _ => usage_exit(),
        }
    }

    let Some(data_path) = data_path else {
        usage_exit();
    };

    let mut config = TrainingConfig::new(data_path, out_path);
    if let Some(label) = label {
        config.label_column = label;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(k) = enn_k {
        config.enn_neighbors = k;
    }
    if let Some(k) = smote_k {
        config.smote_neighbors = k;
    }
    if let Some(m) = smote_m {
        config.smote_m_neighbors = m;
    }
    config.categorical_columns = categorical;

    let artifact = crkp_risk::training::run(&config)?;
    tracing::info!(
        "Training complete: {} features -> {:?}",
        artifact.feature_names().len(),
        config.output_path
    );
    Ok(())
}
