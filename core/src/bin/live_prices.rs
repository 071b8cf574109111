//! Terminal renderer for the live-prices list.
//!
//! Draws the coin list every time the model publishes a change. Press Enter
//! to refresh, `q` then Enter to quit.
//!
//! Environment variables are documented in `coin_core::config`; command-line
//! flags override them. `RUST_LOG` controls logging (default: info).

use clap::Parser;
use coin_core::{CoinListModel, FetchConfig, PresentationState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

#[derive(Debug, Parser)]
#[command(name = "live-prices", about = "Top 50 coins by market cap")]
struct Cli {
    /// Markets endpoint base, e.g. http://127.0.0.1:3000
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Drop the current error once a fetch succeeds
    #[arg(long)]
    clear_error_on_success: bool,

    /// Cancel an in-flight fetch when a new refresh starts
    #[arg(long)]
    supersede: bool,
}

// A current-thread runtime keeps every state update on the rendering thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    coin_core::telemetry::init();
    let cli = Cli::parse();

    let mut config = FetchConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Some(std::time::Duration::from_secs(secs));
    }
    config.policy.clear_error_on_success |= cli.clear_error_on_success;
    config.policy.supersede_in_flight |= cli.supersede;
    tracing::info!(base_url = %config.base_url, policy = ?config.policy, "starting live prices");

    let service = config.build_service()?;
    let (model, initial) = CoinListModel::start(service, config.policy);
    let mut state = model.subscribe();
    let mut fetches = JoinSet::new();
    fetches.spawn(initial);

    render(&state.borrow_and_update());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&state.borrow_and_update());
            }
            line = lines.next_line() => match line? {
                None => break,
                Some(input) if input.trim().eq_ignore_ascii_case("q") => break,
                Some(_) => {
                    fetches.spawn(model.refresh());
                }
            },
            Some(joined) = fetches.join_next() => match joined {
                Ok(outcome) => tracing::debug!(?outcome, "fetch finished"),
                Err(e) => tracing::warn!(error = %e, "fetch task aborted"),
            },
        }
    }

    fetches.abort_all();
    Ok(())
}

fn render(state: &PresentationState) {
    println!();
    println!("Live Prices");
    if state.coins.is_empty() {
        println!("  (loading)");
    }
    for (rank, coin) in state.coins.iter().enumerate() {
        let change = coin
            .price_change_percentage_24h
            .map(|pct| format!("{pct:+.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:>3}. {:<6} {:<20} {:>14.2} {:>9}",
            rank + 1,
            coin.display_symbol(),
            coin.name,
            coin.current_price,
            change
        );
    }
    if let Some(error) = &state.error {
        println!("[Error] {error} (press Enter to retry)");
    }
}
