use crate::cli::HistoryCommand;
use crate::commands::Services;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub async fn handle_history(services: &Services, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { limit } => {
            let sessions = services.history.sessions(limit).await?;

            if sessions.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for session in sessions {
                let id_short = &session.id[..8];
                let title = if session.title.len() > 40 {
                    format!("{}...", &session.title[..37])
                } else {
                    session.title
                };
                let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    title,
                    session.metadata.message_count,
                    updated
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to inspect a conversation.",
                "coachlog history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let id = resolve_session_id(services, &id).await?;
            let Some(session) = services.history.session(&id).await? else {
                println!("{}", format!("No conversation found for {}", id).yellow());
                return Ok(());
            };

            println!();
            println!("{}", session.title.bold());
            println!(
                "{} messages, created {}, updated {}",
                session.metadata.message_count,
                session.created_at.format("%Y-%m-%d %H:%M"),
                session.updated_at.format("%Y-%m-%d %H:%M")
            );
            if !session.metadata.tags.is_empty() {
                let tags: Vec<&str> = session.metadata.tags.iter().map(|t| t.as_str()).collect();
                println!("tags: {}", tags.join(", "));
            }
            println!();

            for message in &session.messages {
                let speaker = match message.role {
                    crate::history::ChatRole::User => "You".green(),
                    crate::history::ChatRole::Assistant => "Coach".cyan(),
                };
                println!("{} {}", format!("{}:", speaker).bold(), message.text);
            }
            println!();
        }
        HistoryCommand::Delete { id } => {
            let id = resolve_session_id(services, &id).await?;
            services.history.delete_session(&id).await?;
            println!("{}", format!("Deleted conversation {}", id).green());
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                println!(
                    "{}",
                    "This deletes every stored conversation. Re-run with --yes to confirm."
                        .yellow()
                );
                return Ok(());
            }
            services.history.clear_all().await?;
            println!("{}", "Cleared all conversation history.".green());
        }
    }

    Ok(())
}

/// Expands an 8-char id prefix to the full session id when unambiguous.
async fn resolve_session_id(services: &Services, id: &str) -> Result<String> {
    if id.len() == 36 {
        return Ok(id.to_string());
    }

    let ids = services.history.index_ids().await?;
    let matches: Vec<&String> = ids.iter().filter(|full| full.starts_with(id)).collect();
    match matches.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Ok(id.to_string()),
        _ => {
            println!(
                "{}",
                format!("Prefix {} is ambiguous ({} matches).", id, matches.len()).yellow()
            );
            Ok(id.to_string())
        }
    }
}
