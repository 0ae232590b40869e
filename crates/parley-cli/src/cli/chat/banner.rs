//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the agent endpoint, how many cached messages were restored,
/// and a hint about slash commands.
pub fn print_welcome_banner(endpoint: &str, restored_count: usize) {
    println!();
    println!("  {}", style("Refund Assistant").cyan().bold());
    println!("  {}", style(endpoint).dim());
    println!();
    if restored_count > 0 {
        println!(
            "  {}",
            style(format!("Restored {restored_count} cached messages")).dim()
        );
    }
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
