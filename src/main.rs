use anyhow::Context;
use clap::Parser;

use shorturl::cli::Cli;
use shorturl::config::AppConfig;
use shorturl::interfaces::cli::run_cli_command;
use shorturl::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    let guard = init_logging(&config.logging).context("failed to initialize logging")?;
    let result = run_cli_command(cli.command, &config).await;
    // 退出前释放 guard，刷新缓冲的日志
    drop(guard);

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    Ok(())
}
