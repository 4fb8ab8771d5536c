use app::App;
use clap::Parser;
use cli::Cli;

mod app;
mod cli;
mod config;
mod errors;
mod logging;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    errors::init()?;
    logging::init()?;

    let args = Cli::parse();
    let mut app = App::new(args)?;
    app.run().await
}
