use clap::Parser;
use process::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    process::run(cli).await
}
