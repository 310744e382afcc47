use clap::Parser as _;
use pcso::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    pcso_client::setup(Some(cli.log_level()));
    pcso::cli::run(cli).await
}
