//! Shorten commands

use colored::Colorize;

use crate::cli::Commands;
use crate::errors::ShortUrlError;
use crate::interfaces::cli::CliError;
use crate::services::{BatchRequest, UrlService};

pub async fn shorten_url(service: &UrlService, url: String, owner: &str) -> Result<(), CliError> {
    match service.create(&url, owner).await {
        Ok(code) => {
            println!(
                "{} Shortened: {} -> {}",
                "✓".bold().green(),
                code.cyan(),
                url.blue().underline()
            );
            println!("  {} {}", "owner:".dimmed(), owner.dimmed());
            Ok(())
        }
        Err(ShortUrlError::UrlConflict { existing_code, .. }) => {
            println!(
                "{} Already shortened: {} -> {}",
                "ℹ".bold().blue(),
                existing_code.cyan(),
                url.blue().underline()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn shorten_batch(
    service: &UrlService,
    entries: Vec<String>,
    owner: &str,
) -> Result<(), CliError> {
    let mut requests = Vec::with_capacity(entries.len());
    for entry in &entries {
        let (correlation_id, original_url) = Commands::parse_batch_entry(entry).ok_or_else(|| {
            CliError::ParseError(format!("expected CORRELATION_ID=URL, got '{}'", entry))
        })?;
        requests.push(BatchRequest {
            correlation_id,
            original_url,
        });
    }

    let results = service.create_batch(&requests, owner).await?;

    println!("{}", "Batch result:".bold().green());
    for (request, result) in requests.iter().zip(&results) {
        println!(
            "  {} {} -> {}",
            result.correlation_id.yellow(),
            result.code.cyan(),
            request.original_url.blue().underline()
        );
    }
    println!(
        "{} {} URLs, owner {}",
        "ℹ".bold().blue(),
        results.len().to_string().green(),
        owner.dimmed()
    );
    Ok(())
}
