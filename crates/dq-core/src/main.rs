//! digit-qda — QDA digit classifier CLI.
//!
//! Subcommands:
//! - `predict`: classify a sample read from a JSON file or stdin
//! - `fit`: fit class statistics and print a per-class summary
//!
//! Payloads go to stdout as JSON; logs go to stderr. Exit codes are
//! stable so wrappers can branch without parsing: 0 success, 2
//! validation failure, 3 data/model failure.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use dq_common::{Error, Label};
use dq_core::config::{resolve_config, Config};
use dq_core::logging::init_logging;
use dq_core::{Classifier, ClassStatistics, CsvCorpus, TrainingCorpus};

/// Gaussian discriminant (QDA) handwritten digit classifier.
#[derive(Parser)]
#[command(name = "digit-qda")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands.
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the training CSV (label column first, then 784 pixels).
    /// Falls back to the DQ_TRAIN_DATA environment variable.
    #[arg(long, global = true)]
    train_data: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a sample and print {"prediction": <label>}
    Predict {
        /// Path to a JSON array of 784 pixel intensities; reads stdin
        /// when omitted
        sample: Option<PathBuf>,

        /// Include the full per-class posterior distribution
        #[arg(long)]
        probabilities: bool,
    },
    /// Fit class statistics and print a per-class summary
    Fit,
}

enum CliError {
    /// A structured core error (validation or data).
    Core(Error),
    /// The request payload itself could not be read or parsed.
    Payload(String),
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        CliError::Core(err)
    }
}

#[derive(Serialize)]
struct PredictionPayload {
    prediction: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    posteriors: Option<Vec<dq_core::posterior::ClassPosterior>>,
}

#[derive(Serialize)]
struct ClassSummary {
    label: Label,
    prior: f64,
    samples: usize,
    covariance_rank: usize,
}

#[derive(Serialize)]
struct FitPayload {
    train_data: String,
    source: String,
    rows: usize,
    classes: Vec<ClassSummary>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let config = resolve_config(cli.global.train_data.clone());

    match run(&cli, &config) {
        Ok(payload) => {
            println!("{payload}");
            ExitCode::SUCCESS
        }
        Err(CliError::Core(err)) => {
            println!("{}", err.to_json());
            if err.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::from(3)
            }
        }
        Err(CliError::Payload(message)) => {
            println!(
                "{}",
                serde_json::json!({
                    "kind": "malformed_payload",
                    "category": "validation",
                    "message": message,
                })
            );
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<String, CliError> {
    match &cli.command {
        Commands::Predict {
            sample,
            probabilities,
        } => run_predict(config, sample.as_deref(), *probabilities),
        Commands::Fit => run_fit(config),
    }
}

fn run_predict(
    config: &Config,
    sample_path: Option<&std::path::Path>,
    probabilities: bool,
) -> Result<String, CliError> {
    let pixels = read_sample(sample_path)?;
    let classifier = Classifier::new(CsvCorpus::new(&config.train_data));

    let payload = if probabilities {
        let posteriors = classifier.posteriors(&pixels)?;
        PredictionPayload {
            prediction: posteriors.argmax(),
            posteriors: Some(posteriors.entries().to_vec()),
        }
    } else {
        PredictionPayload {
            prediction: classifier.predict(&pixels)?,
            posteriors: None,
        }
    };
    serde_json::to_string(&payload).map_err(|err| CliError::Payload(err.to_string()))
}

fn run_fit(config: &Config) -> Result<String, CliError> {
    let corpus = CsvCorpus::new(&config.train_data);
    let training = corpus.load()?;
    let stats = ClassStatistics::fit(&training)?;

    let classes = stats
        .classes()
        .map(|(label, params)| {
            let density =
                dq_math::GaussianDensity::new(params.mean.clone(), params.covariance.clone());
            ClassSummary {
                label,
                prior: params.prior,
                samples: params.count,
                covariance_rank: density.rank(),
            }
        })
        .collect();

    let payload = FitPayload {
        train_data: config.train_data.display().to_string(),
        source: config.source.to_string(),
        rows: training.len(),
        classes,
    };
    serde_json::to_string(&payload).map_err(|err| CliError::Payload(err.to_string()))
}

/// Read a sample payload: a JSON array of pixel intensities.
///
/// Length and range constraints are NOT checked here; that is the
/// validator's job, so defects surface with the structured error kinds.
fn read_sample(path: Option<&std::path::Path>) -> Result<Vec<f64>, CliError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| CliError::Payload(format!("reading {}: {err}", path.display())))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| CliError::Payload(format!("reading stdin: {err}")))?;
            buffer
        }
    };
    serde_json::from_str(&content)
        .map_err(|err| CliError::Payload(format!("sample payload is not a JSON number array: {err}")))
}
