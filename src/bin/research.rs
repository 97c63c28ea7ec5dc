//! Research Pro - terminal research assistant
//!
//! Interactive loop over the research engine: banner, capability listing,
//! then read-eval-print until an exit word. Errors are reported inline and
//! never end the session.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopsmart_ai::config::Config;
use shopsmart_ai::providers::GeminiProvider;
use shopsmart_ai::research::{ResearchEngine, Toolbox};

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

fn print_banner() {
    println!();
    println!("{}", "╔══════════════════════════════════════════════════╗".cyan());
    println!(
        "{}{}{}",
        "║ ".cyan(),
        "🔬 RESEARCH PRO - AI Research Assistant          ".yellow().bold(),
        "║".cyan()
    );
    println!(
        "{}{}{}",
        "║ ".cyan(),
        "   Powered by Google Gemini                      ".green(),
        "║".cyan()
    );
    println!("{}", "╚══════════════════════════════════════════════════╝".cyan());
}

fn print_capabilities() {
    println!("\n{}", "═══ Available Capabilities ═══".magenta());
    println!("  {} {}", "🔍 Web Search".green(), "- Find information from Wikipedia".cyan());
    println!("  {} {}", "🦆 DuckDuckGo Search".green(), "- General web search".cyan());
    println!("  {} {}", "📅 Date & Time".green(), "- Get current date/time".cyan());
    println!("  {} {}", "💾 Save Research".green(), "- Export findings to files".cyan());
    println!("{}\n", "══════════════════════════════".magenta());
}

fn print_separator() {
    println!("{}", "─".repeat(70).blue());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopsmart_ai=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env()?;
    let model = Arc::new(GeminiProvider::new(&config)?);
    let mut engine = ResearchEngine::new(model, Toolbox::new());

    print_banner();
    print_capabilities();
    println!("{}", "✓ Research Pro is ready to assist you!".green());
    println!("{}\n", "Type 'exit', 'quit', or 'bye' to end the session.".yellow());
    print_separator();

    let stdin = io::stdin();
    let mut query_count = 0u32;

    loop {
        print!("\n{} {} ", "You".green().bold(), "→".white());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            println!("\n{}", "👋 Thank you for using Research Pro!".yellow());
            println!("{}\n", "Happy researching and learning!".green());
            break;
        }

        query_count += 1;
        println!("{}", format!("🤔 Processing query #{}...", query_count).yellow());

        match engine.run_turn(input).await {
            Ok(answer) => {
                println!("\n{}", "═══ Research Pro Response ═══".magenta());
                println!("{}", answer);
                println!("{}\n", "═════════════════════════════".magenta());
                println!("{}", "✓ Response complete!".green());
            }
            Err(e) => {
                println!("{}", format!("✗ Error: {}", e).red());
            }
        }
        print_separator();
    }

    Ok(())
}
