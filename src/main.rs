//! Emissary Runtime
//!
//! Entry point for the interactive agent: CLI args, the two fatal
//! startup checks (bridge health, model credentials), and the chat
//! REPL that feeds utterances into the session loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::Level;

use emissary::agent::{start_session, SessionOptions, UtteranceResult};
use emissary::bridge::BridgeHttpClient;
use emissary::config::{AgentConfig, ConfigParams, DEFAULT_BRIDGE_URL};
use emissary::console::{render_event, ConsoleGate, DisplayOptions};
use emissary::model::GeminiClient;

/// Emissary -- MCP Bridge Chat Agent
#[derive(Parser, Debug)]
#[command(
    name = "emissary",
    version,
    about = "Chat agent bridging Gemini with an MCP tool bridge"
)]
struct Cli {
    /// MCP Bridge URL including protocol and port
    #[arg(long, default_value = DEFAULT_BRIDGE_URL)]
    mcp_url: String,

    /// Override the port in the MCP Bridge URL
    #[arg(long)]
    mcp_port: Option<u16>,

    /// Hide JSON results from tool executions
    #[arg(long)]
    hide_json: bool,

    /// Maximum width for JSON output
    #[arg(long, default_value_t = 100)]
    json_width: usize,

    /// Cap on tool executions per utterance (uncapped when omitted)
    #[arg(long)]
    max_steps: Option<usize>,

    /// Gemini model identifier
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

async fn run(cli: Cli) -> Result<()> {
    // The single ambient read: credentials come from the environment
    // once, here, and travel inside the config from then on.
    let config = AgentConfig::resolve(ConfigParams {
        bridge_url: Some(cli.mcp_url),
        bridge_port: cli.mcp_port,
        gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
        gemini_model: cli.model,
        hide_json: cli.hide_json,
        json_width: Some(cli.json_width),
        max_steps: cli.max_steps,
    })?;

    println!("{}", "Emissary -- MCP Bridge Chat Agent".bold());
    if !config.show_json {
        println!("{}", "JSON result display is disabled".yellow());
    }
    println!("Connecting to MCP Bridge at {}...\n", config.bridge_url);

    let display = DisplayOptions {
        show_json: config.show_json,
        max_width: config.json_width,
    };

    let bridge = BridgeHttpClient::new(config.bridge_url.clone());
    let model = GeminiClient::new(&config);
    println!(
        "{} Gemini configured ({})",
        "✓".green().bold(),
        model.model()
    );

    let (mut session, summary) = start_session(SessionOptions {
        model: Box::new(model),
        bridge: Box::new(bridge),
        gate: Box::new(ConsoleGate),
        max_steps: config.max_steps,
        on_event: Some(Box::new(move |event| render_event(event, display))),
    })
    .await?;

    println!(
        "{} Connected to MCP Bridge: {} servers found",
        "✓".green().bold(),
        summary.server_count
    );
    if summary.discovered_tools == 0 {
        println!(
            "{} No tools found from any server.",
            "Warning:".yellow().bold()
        );
    } else {
        println!(
            "{} Found {} tools from {} servers",
            "✓".green().bold(),
            summary.discovered_tools,
            summary.discovered_servers
        );
    }

    println!("\n{}\n", "Starting chat session. Type 'exit' to quit.".bold());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?.trim().to_string();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match session.run_utterance(&input).await {
            UtteranceResult::Answered(_) => {}
            UtteranceResult::StepLimitExceeded { executed, .. } => {
                println!(
                    "\n{} Stopped after {} tool calls (step cap reached).",
                    "Note:".yellow().bold(),
                    executed
                );
            }
        }

        println!("\n{}\n", "-".repeat(50));
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Fatal:".red().bold(), e);
        std::process::exit(1);
    }
}
