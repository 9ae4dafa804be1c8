use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "parley",
    version,
    about = "Communication-competence evaluation for code LLMs — classify clarifying questions and score them with a multi-judge jury"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the evaluation pipeline over a directory of JSONL record files
    Run(RunArgs),
    /// Load and validate a config file without processing anything
    Validate(ValidateArgs),
    Version,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Config file (providers, classifier, jury)
    #[arg(long, default_value = "parley.json", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Directory with input .jsonl record files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for annotated output files (created if missing)
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Records to process per file; -1 for all
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub samples: i64,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[arg(long, default_value = "parley.json", env = "PARLEY_CONFIG")]
    pub config: PathBuf,
}
