use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "rxscan",
    version,
    about = "Turn prescription transcriptions into structured medicine lists"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse transcriptions of one prescription into medicine candidates.
    Scan(ScanArgs),
    /// Check scanned medicines against the registry before confirmation.
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Transcription files, one recognition pass each. Reads stdin when omitted.
    pub files: Vec<PathBuf>,

    /// Lexicon JSON overriding the built-in registry.
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// A scan result, `{"medicines": [...]}`, or a bare medicine array.
    pub input: PathBuf,

    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
