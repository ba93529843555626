//! Lookup commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::UrlService;

pub async fn get_code(service: &UrlService, code: &str) -> Result<(), CliError> {
    match service.resolve(code).await? {
        Some(record) if record.is_deleted => {
            println!(
                "{} {} -> {} {}",
                "✗".bold().yellow(),
                record.code.cyan(),
                record.original_url.blue().underline(),
                "(deleted)".dimmed().red()
            );
            Ok(())
        }
        Some(record) => {
            println!(
                "{} {} -> {}",
                "✓".bold().green(),
                record.code.cyan(),
                record.original_url.blue().underline()
            );
            Ok(())
        }
        None => Err(CliError::CommandError(format!(
            "Short code not found: {}",
            code
        ))),
    }
}

pub async fn list_urls(service: &UrlService, owner: &str, json: bool) -> Result<(), CliError> {
    let records = service.user_urls(owner).await?;

    if json {
        let out = serde_json::to_string_pretty(&records)
            .map_err(|e| CliError::CommandError(format!("Failed to encode JSON: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No short URLs found for {}", "ℹ".bold().blue(), owner);
        return Ok(());
    }

    println!("{}", "Short URL list:".bold().green());
    println!();
    for record in &records {
        let mut line = format!(
            "{} -> {}",
            record.code.cyan(),
            record.original_url.blue().underline()
        );
        if record.is_deleted {
            line.push_str(&format!(" {}", "(deleted)".dimmed().red()));
        }
        println!("  {}", line);
    }
    println!();
    println!(
        "{} Total {} short URLs",
        "ℹ".bold().blue(),
        records.len().to_string().green()
    );
    Ok(())
}
