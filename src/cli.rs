use std::path::PathBuf;

use clap::{Parser, builder::TypedValueParser};

/// Shows an image wrapped around a rotating sphere, optionally in front of a background image.
#[derive(Parser, Debug)]
#[command(name = "texsphere", version, about)]
pub struct Args {
    /// Image mapped onto the sphere. Overrides the config file.
    pub texture: Option<PathBuf>,

    /// Image drawn behind the sphere. Pass "" for none. Overrides the config file.
    #[arg(value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from))]
    pub background: Option<PathBuf>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error, off).
    #[arg(long)]
    pub log_level: Option<log::LevelFilter>,
}

pub fn parse() -> Args {
    Args::parse()
}
