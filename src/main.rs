use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ict_paper_journal::analysis::{MarketAnalysis, SessionAnalyzer};
use ict_paper_journal::config::Config;
use ict_paper_journal::market::YahooClient;
use ict_paper_journal::models::Action;
use ict_paper_journal::trading::desk::MANUAL_REASONING;
use ict_paper_journal::trading::{
    AccountStatus, AttemptResult, DeskSnapshot, PaperDesk, RngRandomness, TradeIntent,
};

const USAGE: &str = "usage: ict-journal <analyze | signal | trade <BUY|SELL> [reasoning..] | status | reset>";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    let journal_file = cfg.journal_file();
    let journal_path = Path::new(&journal_file);
    let desk = open_desk(&cfg, journal_path)?;

    match command {
        "analyze" => {
            let analysis = analyze(&cfg).await;
            print_analysis(&analysis);
        }
        "signal" => {
            let analysis = analyze(&cfg).await;
            print_analysis(&analysis);
            match analysis.bias.to_action() {
                Some(action) => {
                    let intent = TradeIntent::new(&cfg.symbol, action, &analysis.reasoning);
                    let result = desk.attempt_trade(intent).await;
                    print_attempt(&result);
                }
                None => println!("No signal: bias is {}", analysis.bias),
            }
        }
        "trade" => {
            let action = args
                .get(1)
                .and_then(|s| Action::from_str_loose(s))
                .context(USAGE)?;
            let reasoning = if args.len() > 2 {
                args[2..].join(" ")
            } else {
                MANUAL_REASONING.to_string()
            };
            let result = desk
                .attempt_trade(TradeIntent::new(&cfg.symbol, action, &reasoning))
                .await;
            print_attempt(&result);
        }
        "status" => print_status(&desk.status().await),
        "reset" => {
            let ack = desk.reset().await;
            println!("{}", serde_json::to_string(&ack)?);
        }
        _ => anyhow::bail!(USAGE),
    }

    desk.snapshot().await.save_to_path(journal_path)?;
    info!("Journal saved to {}", journal_file);

    Ok(())
}

fn open_desk(cfg: &Config, journal_path: &Path) -> Result<PaperDesk> {
    let market = Box::new(YahooClient::new(cfg));
    let rng = Box::new(RngRandomness::from_entropy());

    let desk = match DeskSnapshot::load_from_path(journal_path)? {
        Some(snapshot) => {
            info!(
                "Loaded journal: {} trades, {} today",
                snapshot.history.len(),
                snapshot.trades_today
            );
            PaperDesk::restore(cfg, snapshot, market, rng)
        }
        None => PaperDesk::new(cfg, market, rng),
    };
    Ok(desk)
}

async fn analyze(cfg: &Config) -> MarketAnalysis {
    let mut market = YahooClient::new(cfg);
    SessionAnalyzer::new(cfg).analyze(&mut market, None).await
}

fn print_analysis(a: &MarketAnalysis) {
    println!("Symbol:        {}", a.symbol);
    println!("Price:         {:.2}", a.price);
    println!("Bias:          {}", a.bias);
    match &a.rdr {
        Some(r) => println!(
            "RDR:           H {:.2} / M {:.2} / L {:.2}",
            r.high, r.mid, r.low
        ),
        None => println!("RDR:           n/a"),
    }
    println!("Silver Bullet: {}", a.silver_bullet);
    println!("Reasoning:     {}", a.reasoning);
    println!();
}

fn print_attempt(result: &AttemptResult) {
    let status = serde_json::to_value(result.status())
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    match result.outcome() {
        Some(outcome) => println!("{} (PAPER): {} -> {}", status, result.detail(), outcome),
        None => println!("{}: {}", status, result.detail()),
    }
}

fn print_status(s: &AccountStatus) {
    println!("╔══════════════════════════════════════════════╗");
    println!("║            PAPER ACCOUNT STATUS              ║");
    println!("╚══════════════════════════════════════════════╝");
    println!("  Balance:      ${:.2}", s.balance);
    println!("  Daily P&L:    ${:+.2} (limit -${:.2})", s.daily_pnl, s.daily_limit);
    println!("  Trades today: {} / {}", s.trades_today, s.max_trades);
    println!("  State:        {}", s.trading_state);
    println!("  Win rate:     {:.1}% over {} trades", s.win_rate_percent, s.trade_count);
    if !s.recent_history.is_empty() {
        println!();
        println!("  Recent:");
        for t in &s.recent_history {
            println!("    {}  | {}", t.summary(), t.reasoning);
        }
    }
}
