//! Delete command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::DeleteDispatcher;

/// Queue the delete and wait for the worker's answer before exiting
pub async fn delete_codes(
    dispatcher: &DeleteDispatcher,
    codes: Vec<String>,
    owner: &str,
) -> Result<(), CliError> {
    let requested = codes.len();
    let ticket = dispatcher.dispatch(codes, owner)?;
    println!("{} Delete request accepted", "ℹ".bold().blue());

    let flagged = ticket.wait().await?;
    println!(
        "{} Deleted {} of {} codes",
        "✓".bold().green(),
        flagged.to_string().cyan(),
        requested
    );
    if (flagged as usize) < requested {
        println!(
            "  {}",
            "Codes that do not exist, are already deleted or belong to another owner are skipped"
                .dimmed()
        );
    }
    Ok(())
}
