use std::time::Duration;

use chrono::Local;
use clap::Parser;
use colored::*;
use event_countdown::{Countdown, EventTarget};
use figlet_rs::FIGfont;
use height_relay::Height;
use height_relay::api::CountdownApiClient;
use jsonrpsee::ws_client::WsClientBuilder;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

fn print_banner(target: &EventTarget) {
    let font = FIGfont::standard().unwrap();
    let figure = font.convert("Countdown").unwrap();

    println!("{}", "═══════════════════════════════════════════════════════════════════════════════".bright_magenta());
    println!("{}", figure.to_string().bright_cyan().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════════════════════".bright_magenta());
    println!("{}", target.name.bright_yellow().bold());
    println!("{}", target.description.bright_yellow());
    println!("{}", "═══════════════════════════════════════════════════════════════════════════════".bright_magenta());
    println!();
}

#[derive(Parser, Debug)]
#[command(name = "event-countdown")]
#[command(about = "Live countdown to a Handshake block height", long_about = None)]
struct Args {
    /// Relay to subscribe to
    #[arg(long, default_value = "ws://127.0.0.1:3000")]
    relay_url: String,

    /// Target block height, overriding the anniversary event
    #[arg(long)]
    target_height: Option<Height>,

    /// Event name to display with a custom target height
    #[arg(long)]
    event_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut target = EventTarget::handshake_anniversary();
    if let Some(height) = args.target_height {
        target.height = height;
        target.description.clear();
    }
    if let Some(name) = args.event_name {
        target.name = name;
    }

    print_banner(&target);

    // Placeholder until the first height arrives; never a height of 0.
    println!("{}", "⏳ connecting to relay...".bright_black());

    loop {
        match watch_relay(&args.relay_url, &target).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("relay connection lost: {e}");
                println!("{}", "⏳ reconnecting...".bright_black());
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Subscribes to the relay and renders every update until the connection
/// drops.
async fn watch_relay(
    url: &str,
    target: &EventTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = WsClientBuilder::default()
        .connection_timeout(Duration::from_secs(30))
        .build(url)
        .await?;

    let mut subscription = client.subscribe_heights().await?;

    while let Some(update) = subscription.next().await {
        render(target, update?.current_height);
    }

    Err("relay closed the subscription".into())
}

fn render(target: &EventTarget, current: Height) {
    let countdown = target.countdown(current);

    println!();
    println!(
        "{} {}",
        "current height:".bright_black(),
        current.to_string().bright_cyan().bold()
    );

    match countdown {
        Countdown::Upcoming { .. } => {
            let eta = countdown.estimated_at(Local::now());
            println!(
                "{} {} {}",
                target.name.bright_yellow(),
                countdown.blocks_text().bright_green().bold(),
                format!(
                    "({}, ~{})",
                    countdown.relative_text(),
                    eta.format("%Y-%m-%d %H:%M")
                )
                .bright_black()
            );
        }
        Countdown::Now => celebrate(target),
        Countdown::Passed { .. } => {
            println!(
                "{} {} {}",
                target.name.bright_yellow(),
                countdown.blocks_text().bright_magenta(),
                format!("({})", countdown.relative_text()).bright_black()
            );
        }
    }
}

fn celebrate(target: &EventTarget) {
    let font = FIGfont::standard().unwrap();
    let figure = font.convert("NOW !").unwrap();

    println!("{}", "🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊".bright_yellow());
    println!("{}", figure.to_string().bright_green().bold());
    println!("{}", format!("{} — right now!", target.name).bright_cyan().bold());
    println!("{}", "🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊🎉🎊".bright_yellow());
}
