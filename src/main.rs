use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spam_filter::{
    app::{self, SpamFilterApp},
    config,
    infrastructure::{directories, logging},
};

#[derive(Parser)]
#[command(name = "spam-filter", version, about = "Email spam classification pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and label the raw corpus into the intermediate CSV
    MakeDataset {
        input_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
    },
    /// Preprocess, vectorize, split and balance the labeled corpus
    BuildFeatures,
    /// Train every candidate model and keep the most accurate one
    Train,
    /// Run whichever stages are missing until a model is ready
    Setup,
    /// Classify a single email body
    Predict { text: String },
    /// Classify email bodies read from stdin, one per blank-line separated block
    Serve,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging, &paths.logs_dir)?;
    tracing::debug!(models = %paths.models_dir.display(), "artifact directories ready");

    let app = SpamFilterApp::new(config);
    match cli.command {
        Command::MakeDataset {
            input_dir,
            output_dir,
        } => {
            app.make_dataset(input_dir, output_dir)?;
        }
        Command::BuildFeatures => app.build_features()?,
        Command::Train => {
            let model = app.train()?;
            println!("Best model: {} (accuracy: {:.4})", model.name, model.accuracy);
        }
        Command::Setup => app.setup()?,
        Command::Predict { text } => {
            let prediction = app.predict(&text)?;
            println!(
                "The email is classified as: {} (confidence: {})",
                prediction.label,
                prediction
                    .confidence
                    .map(|c| format!("{c:.2}"))
                    .unwrap_or_else(|| "n/a".to_string())
            );
        }
        Command::Serve => app::serve_stdio(&app)?,
    }
    Ok(())
}
