use std::path::PathBuf;

use clap::Parser;

/// gemchat: a terminal chat client for the Gemini API with stored sessions.
#[derive(Parser, Debug)]
#[command(name = "gemchat", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. `gemchat=debug`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Model id to start with.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Keep sessions in memory only, whatever the config says.
    #[arg(long)]
    pub memory: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
