use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crop_recommender::features::FEATURE_NAMES;
use crop_recommender::{logging, predictor, Config, Error};

/// Recommend a crop for one set of soil and climate readings.
#[derive(Parser, Debug)]
#[command(name = "predict", disable_help_flag = true, disable_version_flag = true)]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Override the model file
	#[arg(short, long, value_name = "FILE")]
	model: Option<PathBuf>,

	#[arg(short, long)]
	verbose: bool,

	/// N P K temperature humidity ph rainfall
	#[arg(value_name = "FEATURES", allow_negative_numbers = true)]
	features: Vec<String>,
}

const USAGE_FAILURE: u8 = 1;
const FAILURE: u8 = 2;

fn main() -> ExitCode {
	// Any malformed invocation, flags included, is the same usage error.
	let args = match Args::try_parse() {
		Ok(args) => args,
		Err(_) => {
			eprintln!("{}", Error::Usage { expected: FEATURE_NAMES.len() });
			return ExitCode::from(USAGE_FAILURE);
		}
	};
	if let Err(e) = logging::init(if args.verbose { "debug" } else { "warn" }) {
		eprintln!("{e}");
	}

	let model_path = match Config::load_or_default(args.config.as_deref()) {
		Ok(config) => args.model.unwrap_or(config.paths.model),
		Err(e) => {
			eprintln!("{e}");
			return ExitCode::from(FAILURE);
		}
	};

	match predictor::predict(&model_path, &args.features) {
		Ok(label) => {
			println!("{label}");
			ExitCode::SUCCESS
		}
		Err(e) if e.is_usage() => {
			eprintln!("{e}");
			ExitCode::from(USAGE_FAILURE)
		}
		Err(e) => {
			eprintln!("{e}");
			ExitCode::from(FAILURE)
		}
	}
}
