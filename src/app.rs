use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use color_eyre::{eyre::WrapErr, Result};
use dynojson::{convert_event, convert_to_json, items_from_slice, scan, Event};
use tracing::{debug, info};

use crate::{
    cli::{Cli, Command},
    config::Config,
};

pub struct App {
    command: Command,
    config: Config,
    pretty: bool,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::new().wrap_err("failed to load configuration")?;
        let pretty = cli.pretty || config.pretty;

        Ok(Self {
            command: cli.command,
            config,
            pretty,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let documents = match &self.command {
            Command::Item { file } => {
                let input = read_input(file.as_deref())?;
                let items = items_from_slice(&input)?;
                debug!(items = items.len(), "decoded items");
                items
                    .iter()
                    .map(convert_to_json)
                    .collect::<Result<Vec<_>, _>>()?
            }
            Command::Stream { file } => {
                let input = read_input(file.as_deref())?;
                let event: Event =
                    serde_json::from_slice(&input).wrap_err("failed to parse stream event")?;
                debug!(records = event.records.len(), "decoded stream event");
                convert_event(&event)?
            }
            Command::Scan {
                table,
                region,
                limit,
            } => {
                let region = region.clone().or_else(|| self.config.region.clone());
                let page_size = limit.unwrap_or(self.config.page_size);
                let client = scan::client(region).await;
                scan::scan_to_json(&client, table, page_size)
                    .await
                    .wrap_err_with(|| format!("failed to scan table {table}"))?
            }
        };

        self.write_documents(&documents)?;
        info!(documents = documents.len(), "conversion finished");

        Ok(())
    }

    fn write_documents(&self, documents: &[Vec<u8>]) -> Result<()> {
        let mut stdout = io::stdout().lock();

        for document in documents {
            if self.pretty {
                let value: serde_json::Value = serde_json::from_slice(document)?;
                writeln!(stdout, "{}", colored_json::to_colored_json_auto(&value)?)?;
            } else {
                stdout.write_all(document)?;
                stdout.write_all(b"\n")?;
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut input = Vec::new();
            io::stdin().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}
