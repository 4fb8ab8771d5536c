use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{get_config_dir, get_data_dir};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Print colored, indented JSON instead of one document per line
    #[arg(short, long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Convert DynamoDB JSON items (single item, array, or scan output)
    Item {
        /// Input file, stdin when omitted
        file: Option<PathBuf>,
    },
    /// Convert a DynamoDB Streams event, one document per record
    Stream {
        /// Input file, stdin when omitted
        file: Option<PathBuf>,
    },
    /// Scan a live table and convert every item
    Scan {
        table: String,

        #[arg(short, long)]
        region: Option<String>,

        /// Items per scan page
        #[arg(short, long)]
        limit: Option<i32>,
    },
}

pub fn version() -> String {
    let version = match option_env!("VERGEN_GIT_DESCRIBE") {
        Some(describe) => format!("{}-{describe}", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };
    let author = clap::crate_authors!();

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
