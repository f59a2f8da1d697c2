use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDate};
use clap::Parser;
use prettytable::{format, row, Cell, Row, Table};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wheelhouse::application::chain_view::ChainSide;
use wheelhouse::application::chat::{pick_default_model, ConsoleCommand, ChatSession};
use wheelhouse::application::ledger::ContractSpec;
use wheelhouse::application::monitor::{group_thousands, money, MonitorReport};
use wheelhouse::cli::commands::{Cli, Commands};
use wheelhouse::config::{config_path, ledger_path, AdvisorConfig};
use wheelhouse::domain::entities::options_position::OptionsPosition;
use wheelhouse::domain::values::option_symbol::OptionSymbol;
use wheelhouse::domain::values::option_type::OptionType;
use wheelhouse::domain::values::position_status::PositionStatus;
use wheelhouse::domain::values::trade_action::TradeAction;
use wheelhouse::infrastructure::notify::smtp::SmtpNotifier;
use wheelhouse::{Advice, ChainReport, Wheelhouse};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AdvisorConfig::load(&config_path());

    let wh = match Wheelhouse::new(config, &ledger_path()) {
        Ok(wh) => wh,
        Err(e) => {
            eprintln!("Error initializing wheelhouse: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(wh, cli.command, cli.json).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt_f64(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn opt_u64(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

async fn run_command(wh: Wheelhouse, cmd: Commands, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Advise => {
            let advice = wh.advise(today()).await?;
            if json {
                print_json(&advice)?;
            } else {
                print_advice(&advice);
            }
        }
        Commands::Chain { band } => {
            let report = wh.chain(today(), band).await?;
            if json {
                print_json(&report)?;
            } else {
                print_chain(&report);
            }
        }
        Commands::Parse { symbol } => {
            let parsed: OptionSymbol = symbol.parse().map_err(|e: String| e)?;
            if json {
                print_json(&parsed)?;
            } else {
                let mut table = Table::new();
                table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
                table.set_titles(row!["Field", "Value"]);
                table.add_row(row!["Root", parsed.root]);
                table.add_row(row!["Expiration", parsed.expiration]);
                table.add_row(row!["Type", parsed.option_type]);
                table.add_row(row!["Strike", format!("{:.2}", parsed.strike)]);
                table.add_row(row!["Format", parsed.format]);
                table.add_row(row!["OCC", parsed.to_occ()]);
                table.printstd();
            }
        }
        Commands::Portfolio => {
            let summary = wh.portfolio_summary().await?;
            if json {
                print_json(&summary)?;
            } else {
                println!("\n{} portfolio", summary.symbol);
                println!("   Shares: {}", summary.shares);
                println!("   Cash: {}", money(summary.cash));
                println!("   Price: {}", money(summary.price));
                println!("   Total value: {}", money(summary.total_value));
                println!("\nOpen option positions:");
                print_positions(&summary.open_positions);
            }
        }
        Commands::Shares { quantity, price } => {
            let snapshot = wh.update_shares(quantity, price).await?;
            if json {
                print_json(&snapshot)?;
            } else {
                println!(
                    "Shares set to {} (snapshot #{}, value {})",
                    snapshot.shares,
                    snapshot.id,
                    money(snapshot.total_value)
                );
            }
        }
        Commands::Snapshot { price, notes } => {
            let snapshot = wh.snapshot(price, notes).await?;
            if json {
                print_json(&snapshot)?;
            } else {
                println!("Saved snapshot #{} (value {})", snapshot.id, money(snapshot.total_value));
            }
        }
        Commands::PositionAdd {
            code,
            option_type,
            strike,
            expiration,
            action,
            quantity,
            premium,
            notes,
        } => {
            let contract = match code {
                Some(code) => {
                    let parsed: OptionSymbol = code.parse().map_err(|e: String| e)?;
                    ContractSpec::from(parsed)
                }
                None => {
                    let option_type: OptionType = option_type
                        .ok_or("--type is required without --code")?
                        .parse()
                        .map_err(|e: String| e)?;
                    let expiration = expiration.ok_or("--expiration is required without --code")?;
                    ContractSpec {
                        symbol: wh.config().symbol.clone(),
                        option_type,
                        strike: strike.ok_or("--strike is required without --code")?,
                        expiration: NaiveDate::parse_from_str(&expiration, "%Y-%m-%d")?,
                    }
                }
            };
            let action: TradeAction = action.parse().map_err(|e: String| e)?;
            let position = wh.record_position(contract, action, quantity, premium, notes)?;
            if json {
                print_json(&position)?;
            } else {
                println!("Recorded position #{}", position.id);
                print_positions(std::slice::from_ref(&position));
            }
        }
        Commands::PositionUpdate { id, status, pnl, notes } => {
            let status: PositionStatus = status.parse().map_err(|e: String| e)?;
            wh.update_position(id, status, pnl, notes)?;
            println!("Position #{id} marked {status}");
        }
        Commands::PositionDelete { id } => {
            wh.delete_position(id)?;
            println!("Deleted position #{id}");
        }
        Commands::Positions { all, limit } => {
            let positions = wh.positions(all, limit)?;
            if json {
                print_json(&positions)?;
            } else {
                print_positions(&positions);
            }
        }
        Commands::Transactions { limit } => {
            let txs = wh.transactions(limit)?;
            if json {
                print_json(&txs)?;
            } else {
                let mut table = Table::new();
                table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
                table.set_titles(row!["ID", "Time", "Type", "Symbol", "Qty", "Price", "Strike", "Expiration", "Total"]);
                for t in &txs {
                    table.add_row(row![
                        t.id,
                        t.timestamp.format("%Y-%m-%d %H:%M"),
                        t.kind,
                        t.symbol,
                        t.quantity,
                        format!("{:.2}", t.price),
                        opt_f64(t.strike),
                        t.expiration.map(|d| d.to_string()).unwrap_or_default(),
                        format!("{:.2}", t.total_cost)
                    ]);
                }
                table.printstd();
            }
        }
        Commands::History { limit } => {
            let snapshots = wh.history(limit)?;
            if json {
                print_json(&snapshots)?;
            } else {
                let mut table = Table::new();
                table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
                table.set_titles(row!["ID", "Time", "Shares", "Cash", "Total Value", "Notes"]);
                for s in &snapshots {
                    table.add_row(row![
                        s.id,
                        s.timestamp.format("%Y-%m-%d %H:%M"),
                        s.shares,
                        money(s.cash),
                        money(s.total_value),
                        s.notes.as_deref().unwrap_or("")
                    ]);
                }
                table.printstd();
            }
        }
        Commands::Monitor { email } => {
            let report = wh.monitor(today()).await?;
            if json {
                print_json(&report)?;
            } else {
                print_monitor(&report);
            }
            if email {
                let notifier = SmtpNotifier::from_env()?;
                let sent = wh.send_alert(&report, &notifier, Local::now().naive_local()).await?;
                if sent {
                    println!("Alert e-mail sent.");
                } else {
                    println!("No alert conditions met; no e-mail sent.");
                }
            }
        }
        Commands::Chat => run_chat(wh.chat_session()).await?,
    }

    Ok(())
}

fn print_advice(advice: &Advice) {
    let c = &advice.conditions;
    println!("\nCurrent Market Conditions ({}):", c.symbol);
    println!("   Price: ${:.2}", c.price);
    match c.ma50 {
        Some(ma) => println!("   50-day MA: ${ma:.2}"),
        None => println!("   50-day MA: N/A"),
    }
    match c.rsi {
        Some(rsi) => println!("   RSI: {rsi:.2}"),
        None => println!("   RSI: N/A"),
    }
    println!("   Portfolio: {} shares, {} cash", c.shares, money(c.cash));
    println!(
        "   Options Filter: {}-{} weeks expiration ({} expirations found)\n",
        c.min_weeks,
        c.max_weeks,
        c.expirations.len()
    );

    let recs = &advice.run.recommendations;
    if recs.is_empty() {
        println!("No recommendations for current conditions.");
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row![
        "Strategy",
        "Action",
        "Expiration",
        "Strike",
        "Premium",
        "Qty",
        "Total",
        "Ann. Yield %",
        "Cash Req.",
        "Proj. Profit",
        "Rationale"
    ]);
    for r in recs {
        table.add_row(row![
            r.strategy,
            r.action,
            r.expiration,
            format!("{:.2}", r.strike),
            format!("{:.2}", r.premium),
            r.qty,
            opt_f64(r.total_premium.or(r.total_wheel_income)),
            opt_f64(r.annualized_yield_pct),
            opt_f64(r.required_cash),
            opt_f64(r.proj_profit),
            r.rationale
        ]);
    }
    table.printstd();
}

fn side_cells(side: &Option<ChainSide>) -> Vec<Cell> {
    match side {
        Some(s) => vec![
            Cell::new(&format!("{:.2}", s.last)),
            Cell::new(&format!("{:.2}", s.bid)),
            Cell::new(&format!("{:.2}", s.ask)),
            Cell::new(&opt_u64(s.volume)),
        ],
        None => (0..4).map(|_| Cell::new("")).collect(),
    }
}

fn print_chain(report: &ChainReport) {
    let c = &report.conditions;
    println!(
        "\nOPTIONS CHAIN {} (price ${:.2}, +/-{:.0}%, {}-{} weeks)",
        c.symbol,
        c.price,
        report.band * 100.0,
        c.min_weeks,
        c.max_weeks
    );

    for exp in &report.expirations {
        println!("\nExpiration: {}", exp.expiration);
        if exp.rows.is_empty() {
            println!("No calls/puts near the money for this expiration.");
            continue;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            "call_last", "call_bid", "call_ask", "call_vol", "call_rationale", "strike", "put_last", "put_bid",
            "put_ask", "put_vol", "put_rationale"
        ]);
        for r in &exp.rows {
            let mut cells = side_cells(&r.call);
            cells.push(Cell::new(r.call.as_ref().map(|s| s.rationale.as_str()).unwrap_or("")));
            cells.push(Cell::new(&format!("{:.2}", r.strike)));
            cells.extend(side_cells(&r.put));
            cells.push(Cell::new(r.put.as_ref().map(|s| s.rationale.as_str()).unwrap_or("")));
            table.add_row(Row::new(cells));
        }
        table.printstd();
    }
}

fn print_positions(positions: &[OptionsPosition]) {
    if positions.is_empty() {
        println!("No positions.");
        return;
    }
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["ID", "Symbol", "Action", "Type", "Strike", "Expiration", "Qty", "Premium", "Status", "P/L"]);
    for p in positions {
        table.add_row(row![
            p.id,
            p.symbol,
            p.action,
            p.option_type,
            format!("{:.2}", p.strike),
            p.expiration,
            p.quantity,
            format!("{:.2}", p.premium),
            p.status,
            opt_f64(p.profit_loss)
        ]);
    }
    table.printstd();
}

fn print_monitor(report: &MonitorReport) {
    let volume = match (report.volume, report.open_interest) {
        (Some(v), oi) => format!(
            "{} / {}",
            group_thousands(v as f64, 0),
            oi.map(|oi| group_thousands(oi as f64, 0)).unwrap_or_else(|| "N/A".into())
        ),
        (None, _) => "N/A".into(),
    };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row![format!("{} Current Price", report.symbol), money(report.price)]);
    table.add_row(row!["Days to Expiration", format!("{} days", report.dte)]);
    table.add_row(row!["Strike", money(report.strike)]);
    table.add_row(row!["Status (to strike)", report.status.distance]);
    table.add_row(row!["Call Premium (mid)", report.status.premium]);
    table.add_row(row!["Volume / OI", volume]);
    table.add_row(row!["Unrealized P/L on short calls", report.status.pnl]);
    table.add_row(row!["Roll Alert?", report.roll_advice]);
    table.add_row(row!["Email Alert?", if report.alert.should_alert { "YES" } else { "No" }]);
    if report.alert.should_alert {
        table.add_row(row!["Alert Reasons", report.alert.reasons.join("; ")]);
    }

    println!(
        "\n=== {} Covered Call Monitor - {} ===",
        report.symbol,
        Local::now().format("%Y-%m-%d %I:%M %p")
    );
    table.printstd();
}

fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line)?;
    Ok(if n == 0 { None } else { Some(line) })
}

async fn run_chat(mut chat: ChatSession) -> Result<(), Box<dyn std::error::Error>> {
    let models = chat.available_models().await;
    let model = pick_default_model(chat.model(), &models);
    chat.set_model(model);

    println!("{}", "=".repeat(60));
    println!("Advisor Chat");
    println!("Commands: 'exit'/'quit' to end, 'clear' to clear history, 'model' to change model");
    println!("API Key: {}", if chat.is_mock() { "Not set (mock mode)" } else { "Set" });
    println!("Model: {}", chat.model());
    println!("Available models: {}", models.join(", "));
    println!("{}\n", "=".repeat(60));

    while let Some(line) = read_line("You: ")? {
        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Exit => break,
            ConsoleCommand::Clear => {
                chat.clear_history();
                println!("Conversation history cleared.\n");
            }
            ConsoleCommand::Model => {
                println!("\nCurrent model: {}", chat.model());
                println!("Available models: {}", models.join(", "));
                let choice = read_line("Choose new model (press Enter to keep current): ")?.unwrap_or_default();
                let choice = choice.trim();
                if models.iter().any(|m| m == choice) {
                    chat.set_model(choice);
                    println!("Model changed to: {choice}");
                } else if !choice.is_empty() {
                    println!("Invalid model. Keeping current: {}", chat.model());
                }
                println!();
            }
            ConsoleCommand::Prompt(text) => {
                let reply = chat.prompt(&text).await;
                println!("Grok: {reply}\n");
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
