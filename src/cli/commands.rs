use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wheelhouse", about = "Options income advisor for a single stock position")]
pub struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Market conditions and strategy recommendations
    Advise,
    /// Near-the-money options chain for each expiration in the window
    Chain {
        /// Strike band around the price, as a fraction
        #[arg(long, default_value = "0.03")]
        band: f64,
    },
    /// Decode an option symbol (OCC or broker format)
    Parse {
        symbol: String,
    },
    /// Shares, cash, value, and open option positions
    Portfolio,
    /// Set the number of shares held
    Shares {
        quantity: u32,
        /// Price per share; defaults to the live price
        #[arg(long)]
        price: Option<f64>,
    },
    /// Save a portfolio snapshot
    Snapshot {
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record an option position
    PositionAdd {
        /// Option symbol, instead of --type/--strike/--expiration
        #[arg(long, conflicts_with_all = ["option_type", "strike", "expiration"])]
        code: Option<String>,
        /// call or put
        #[arg(long = "type")]
        option_type: Option<String>,
        #[arg(long)]
        strike: Option<f64>,
        /// Expiration date (YYYY-MM-DD)
        #[arg(long)]
        expiration: Option<String>,
        /// buy or sell
        #[arg(long, default_value = "sell")]
        action: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
        /// Premium per share
        #[arg(long)]
        premium: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change the status of an option position
    PositionUpdate {
        id: u64,
        /// open, closed, assigned, or expired
        status: String,
        #[arg(long)]
        pnl: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an option position
    PositionDelete {
        id: u64,
    },
    /// List option positions
    Positions {
        /// Include closed, assigned, and expired positions
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Recent transactions
    Transactions {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Portfolio snapshot history
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check the monitored covered call
    Monitor {
        /// E-mail an alert when a condition is met
        #[arg(long)]
        email: bool,
    },
    /// Chat with the advisor model
    Chat,
}
