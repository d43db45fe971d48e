use clap::Parser;
use dispatch_cli::logger::init_logger;
use dispatch_cli::{run, write_result, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let cli = Cli::parse();
    let result = run(&cli).await?;
    write_result(&result, cli.output.as_deref(), cli.compact)
}
