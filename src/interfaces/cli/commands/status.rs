//! Stats and ping commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::UrlService;

pub async fn show_stats(service: &UrlService) -> Result<(), CliError> {
    let stats = service.stats().await?;
    let info = service.storage().backend_info();

    println!("{}", "Storage statistics:".bold().green());
    println!("  {} {}", "backend:".dimmed(), info.storage_type.cyan());
    println!("  {} {}", "urls:   ".dimmed(), stats.urls.to_string().green());
    println!("  {} {}", "users:  ".dimmed(), stats.users.to_string().green());
    Ok(())
}

pub async fn ping_storage(service: &UrlService) -> Result<(), CliError> {
    service.ping().await?;
    println!(
        "{} {} storage is reachable",
        "✓".bold().green(),
        service.storage().backend_info().storage_type.cyan()
    );
    Ok(())
}
