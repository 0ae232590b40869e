//! `parley history` and `parley clear` command handlers.

use console::style;

use parley_core::chat::TranscriptStore;
use parley_infra::sqlite::SqliteHistoryStore;
use parley_types::chat::MessageRole;

use crate::state::AppState;

/// Print the cached conversation history.
pub async fn show_history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let history = SqliteHistoryStore::new(state.db_pool.clone());
    let transcript = TranscriptStore::restore(history).await;

    if json {
        println!("{}", serde_json::to_string_pretty(transcript.messages())?);
        return Ok(());
    }

    if transcript.messages().is_empty() {
        println!("\n  {}\n", style("No conversation history.").dim());
        return Ok(());
    }

    println!();
    for message in transcript.messages() {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Agent").cyan().bold(),
        };
        println!("  {} {}", label, message.content);
    }
    println!();

    Ok(())
}

/// Delete the cached conversation history.
pub async fn clear_history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let history = SqliteHistoryStore::new(state.db_pool.clone());
    let mut transcript = TranscriptStore::restore(history).await;
    transcript.clear().await?;

    if json {
        println!("{}", serde_json::json!({"cleared": true}));
    } else {
        println!("\n  {}\n", style("History cleared.").dim());
    }

    Ok(())
}
