//! Main chat loop orchestration.
//!
//! Coordinates the conversation lifecycle: history restore, welcome
//! banner, input loop with streamed replies, and slash commands.

use std::io::Write;
use std::time::Instant;

use console::style;

use parley_core::chat::{ChatOrchestrator, SubmitOutcome, TranscriptStore, FALLBACK_REPLY};
use parley_infra::agent::HttpAgentClient;
use parley_infra::sqlite::SqliteHistoryStore;
use parley_types::chat::{MessageRole, StreamEvent};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let history = SqliteHistoryStore::new(state.db_pool.clone());
    let transcript = TranscriptStore::restore(history).await;
    let restored_count = transcript.messages().len();

    let client = HttpAgentClient::new(&state.endpoint);
    let orchestrator = ChatOrchestrator::new(client, transcript);

    print_welcome_banner(&state.endpoint, restored_count);

    let renderer = ChatRenderer::new();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let event = chat_input.read_line().await;
        match event {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                // Slash commands
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            commands::print_help();
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::History => {
                            let messages = orchestrator.messages().await;
                            println!();
                            for message in &messages {
                                let label = match message.role {
                                    MessageRole::User => style("You").green().bold(),
                                    MessageRole::Assistant => style("Agent").cyan().bold(),
                                };
                                match message.role {
                                    MessageRole::User => {
                                        println!("  {} {}", label, message.content);
                                    }
                                    MessageRole::Assistant => {
                                        let rendered = renderer.render_markdown(&message.content);
                                        println!("  {} {}", label, rendered.trim_end());
                                    }
                                }
                            }
                            println!();
                        }
                        ChatCommand::Clear => match orchestrator.clear().await {
                            Ok(()) => println!("\n  {}\n", style("History cleared.").dim()),
                            Err(e) => println!(
                                "\n  {} Failed to clear history: {e}\n",
                                style("!").red().bold()
                            ),
                        },
                        ChatCommand::Unknown(cmd_name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(cmd_name).dim()
                            );
                        }
                    }
                    continue;
                }

                // Send to the agent
                let spinner = indicatif::ProgressBar::new_spinner();
                spinner.set_style(
                    indicatif::ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .unwrap(),
                );
                spinner.set_message("thinking...");
                spinner.enable_steady_tick(std::time::Duration::from_millis(80));

                let start_time = Instant::now();
                let mut first_fragment_received = false;

                let outcome = orchestrator
                    .submit(&text, |event| {
                        if let StreamEvent::Fragment { text } = event {
                            if !first_fragment_received {
                                spinner.finish_and_clear();
                                first_fragment_received = true;
                                print!("\n  {} ", style("Agent").cyan().bold());
                                let _ = std::io::stdout().flush();
                            }
                            renderer.print_streaming_fragment(text);
                        }
                    })
                    .await;

                if !first_fragment_received {
                    spinner.finish_and_clear();
                }

                match outcome {
                    SubmitOutcome::Replied => {
                        let response_ms = start_time.elapsed().as_millis() as u64;
                        println!();
                        renderer.print_stats_footer(response_ms);
                        println!();
                    }
                    SubmitOutcome::Failed => {
                        println!(
                            "\n  {} {}\n",
                            style("!").red().bold(),
                            style(FALLBACK_REPLY).dim()
                        );
                    }
                    SubmitOutcome::Busy | SubmitOutcome::Ignored => {}
                }
            }
        }
    }

    Ok(())
}
