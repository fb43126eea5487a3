use crate::commands::Services;
use crate::error::Result;
use crate::history::ChatSession;
use crate::search::SearchIndex;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle the search command
///
/// The fuzzy index is the default path; `scan` switches to the exact
/// substring scan over the store, which is the canonical matching
/// semantics.
pub async fn handle_search(
    services: &Services,
    query: &str,
    limit: Option<usize>,
    scan: bool,
) -> Result<()> {
    let mut results = if scan {
        services.history.search_sessions(query).await?
    } else {
        let index = SearchIndex::new(services.history.clone(), services.config.clone());
        index.initialize().await;
        index.search(query).await
    };

    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if results.is_empty() {
        println!("{}", format!("No conversations match \"{}\".", query).yellow());
        return Ok(());
    }

    print_results(query, &results);
    Ok(())
}

fn print_results(query: &str, results: &[ChatSession]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Preview".bold(),
        "Last Updated".bold()
    ]);

    for session in results {
        let id_short = &session.id[..8];
        let preview: String = session
            .metadata
            .last_message_preview
            .chars()
            .take(48)
            .collect();
        let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            session.title,
            preview,
            updated
        ]);
    }

    println!(
        "\n{} conversations match \"{}\":",
        results.len(),
        query
    );
    table.printstd();
    println!();
}
