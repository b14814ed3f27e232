//! PrintSpec CLI - batch checker for specification XML
//!
//! Commands: validate, check, tables, rule-sets
//! Outputs JSON to stdout unless another format is requested
//! Returns 2 when any document fails validation

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use printspec_core::{
    has_failures, report, FieldRecord, RuleSet, RuleSetRevision, ValidationPipeline,
    ValidatorConfig,
};

#[derive(Parser)]
#[command(name = "printspec-cli")]
#[command(about = "PrintSpec CLI - Product Specification Checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference tables JSON (overrides the configuration file)
    #[arg(short, long, global = true)]
    tables: Option<PathBuf>,

    /// Rule set revision (overrides the configuration file)
    #[arg(short, long, global = true)]
    rule_set: Option<RuleSetRevision>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    CsvDetailed,
    CsvSummary,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more XML files
    Validate {
        /// XML files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Validate a single pre-extracted record
    Check {
        /// JSON payload (FieldRecord)
        #[arg(short, long)]
        payload: String,
    },

    /// Print the active reference tables
    Tables,

    /// List rule set revisions and their steps
    RuleSets,
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            false
        }
    }
}

fn error_exit(message: String) -> ExitCode {
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn load_config(cli: &Cli) -> Result<ValidatorConfig, String> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::load(path).map_err(|e| e.to_string())?,
        None => ValidatorConfig::default(),
    };
    if let Some(tables) = &cli.tables {
        config.tables_path = Some(tables.clone());
    }
    if let Some(rule_set) = cli.rule_set {
        config.rule_set = rule_set;
    }
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => return error_exit(format!("Failed to load configuration: {}", e)),
    };

    if let Commands::RuleSets = cli.command {
        let rule_sets: Vec<_> = RuleSetRevision::ALL
            .iter()
            .map(|&r| RuleSet::revision(r))
            .collect();
        return if print_json(&rule_sets) { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    let pipeline = match ValidationPipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => return error_exit(e.to_string()),
    };

    match cli.command {
        Commands::RuleSets => ExitCode::SUCCESS,

        Commands::Tables => {
            if print_json(pipeline.validator().tables()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }

        Commands::Check { payload } => {
            let record: FieldRecord = match serde_json::from_str(&payload) {
                Ok(r) => r,
                Err(e) => return error_exit(format!("Invalid payload: {}", e)),
            };

            let results = pipeline.validate_record(&record);
            let passed = !has_failures(&results);
            let output = serde_json::json!({ "passed": passed, "results": results });
            if !print_json(&output) {
                ExitCode::FAILURE
            } else if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Validate { files, format } => {
            let batch = match pipeline.validate_batch(&files) {
                Ok(b) => b,
                Err(e) => return error_exit(e.to_string()),
            };

            match format {
                OutputFormat::Json => {
                    if !print_json(&batch) {
                        return ExitCode::FAILURE;
                    }
                }
                OutputFormat::Text => print!("{}", report::text_report(&batch)),
                OutputFormat::CsvDetailed => println!("{}", report::detailed_csv(&batch.documents)),
                OutputFormat::CsvSummary => println!("{}", report::summary_csv(&batch.documents)),
            }

            if batch.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
    }
}
