pub mod cards;
pub mod demo;
pub mod export;
pub mod import;
pub mod init;
pub mod redeem;
pub mod report;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::{GiftError, Result};
use crate::fixtures;
use crate::reports::{DonationFilter, TimeWindow};
use crate::settings::{load_settings, resolve_data_dir, Settings};
use crate::store::Store;

/// Data directory and settings for one invocation.
pub struct Context {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn new(data_dir_flag: Option<&str>) -> Self {
        Self {
            data_dir: resolve_data_dir(data_dir_flag),
            settings: load_settings(),
        }
    }

    pub fn open(&self) -> Result<Store> {
        fixtures::load(&self.data_dir)
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        fixtures::save(&self.data_dir, store)
    }
}

pub(crate) fn parse_date_opt(raw: &Option<String>, flag: &str) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                GiftError::Other(format!("--{flag} must be a date in YYYY-MM-DD form, got {s:?}"))
            }),
    }
}

#[derive(Parser)]
#[command(
    name = "giftcards",
    version,
    about = "Track donated gift cards: intake, spends, donations and reports."
)]
pub struct Cli {
    /// Data directory holding ledger.json and donations.json (default from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and remember it in settings.
    Init,
    /// Write sample cards, transactions and donations to explore the tool.
    Demo {
        /// Overwrite existing fixture files
        #[arg(long)]
        force: bool,
    },
    /// Show the data directory and record counts.
    Status,
    /// Register, list and inspect gift cards.
    Cards {
        #[command(subcommand)]
        command: CardsCommands,
    },
    /// Bulk-import cards from a CSV file (store,last4,amount,added_by,notes).
    Import {
        /// Path to the .csv file
        file: String,
        /// Also import rows that match an existing card
        #[arg(long = "include-duplicates")]
        include_duplicates: bool,
        /// Classify rows without importing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Import even if this exact file was imported before
        #[arg(long)]
        force: bool,
    },
    /// Write a CSV import template.
    Template {
        /// Output path (default: ./gift_card_import_template.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Record a purchase made with a card.
    Spend {
        /// Card ID (shown in `giftcards cards list`)
        card: u64,
        /// Amount spent
        #[arg(long)]
        amount: String,
        /// Volunteer recording the spend
        #[arg(long)]
        volunteer: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Give all or part of a card's balance to a recipient.
    Donate {
        /// Card ID (shown in `giftcards cards list`)
        card: u64,
        /// Partial amount; omit to donate the full remaining balance
        #[arg(long)]
        amount: Option<String>,
        /// Who receives the donation
        #[arg(long)]
        recipient: String,
        /// Volunteer recording the donation
        #[arg(long)]
        volunteer: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Inventory and donation reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export data to files.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum CardsCommands {
    /// Register a single card.
    Add {
        #[arg(long)]
        store: String,
        /// Last 4 digits of the card number
        #[arg(long)]
        last4: String,
        /// Card value in dollars
        #[arg(long)]
        amount: String,
        /// Volunteer who received the card
        #[arg(long = "added-by")]
        added_by: String,
        /// Date added: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Add even if a card with the same store and last 4 exists
        #[arg(long)]
        force: bool,
    },
    /// List cards, optionally filtered.
    List {
        /// Exact store name
        #[arg(long)]
        store: Option<String>,
        /// Leading digits of the last 4
        #[arg(long)]
        last4: Option<String>,
        /// Active, Used, Donated or Expired
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one card and its transactions.
    Show {
        id: u64,
    },
    /// Check whether a store and last 4 are already registered.
    Check {
        #[arg(long)]
        store: String,
        #[arg(long)]
        last4: String,
    },
    /// Suggest known store names.
    Stores {
        /// Part of a store name
        query: Option<String>,
    },
}

#[derive(clap::Args, Clone, Default)]
pub struct DonationArgs {
    /// Time window: 7d, 30d, 3m, or all for every donation
    #[arg(long, default_value = "3m")]
    pub window: Option<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Exact store name
    #[arg(long)]
    pub store: Option<String>,
    /// Part of the recipient name
    #[arg(long)]
    pub recipient: Option<String>,
}

impl DonationArgs {
    pub fn to_filter(&self) -> Result<DonationFilter> {
        let window = match &self.window {
            None => None,
            Some(w) if w.trim().eq_ignore_ascii_case("all") => None,
            Some(w) => Some(TimeWindow::parse(w).ok_or_else(|| {
                GiftError::Other(format!("Unknown window {w:?} (expected 7d, 30d, 3m or all)"))
            })?),
        };
        Ok(DonationFilter {
            window,
            start: parse_date_opt(&self.from_date, "from")?,
            end: parse_date_opt(&self.to_date, "to")?,
            store: self.store.clone(),
            recipient: self.recipient.clone(),
        })
    }
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Overview: totals, low-balance cards, recent activity.
    Dashboard,
    /// Per-store inventory breakdown.
    Inventory {
        /// Grocery, Fast Food, Clothing or Other
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page (10, 20 or 50)
        #[arg(long = "per-page", default_value = "10")]
        per_page: usize,
    },
    /// Totals rolled up by store category.
    Categories,
    /// Value distribution by store.
    Treemap {
        #[arg(long)]
        category: Option<String>,
    },
    /// Donation log.
    Donations {
        #[command(flatten)]
        filter: DonationArgs,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the donation log as CSV.
    Donations {
        #[command(flatten)]
        filter: DonationArgs,
        /// Output file (default: <data_dir>/exports/donations-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_donation_args_to_filter() {
        let args = DonationArgs {
            window: Some("30d".to_string()),
            from_date: Some("2024-06-01".to_string()),
            ..DonationArgs::default()
        };
        let f = args.to_filter().unwrap();
        assert_eq!(f.window, Some(TimeWindow::Last30Days));
        assert_eq!(f.start, NaiveDate::from_ymd_opt(2024, 6, 1));

        let bad = DonationArgs {
            window: Some("year".to_string()),
            ..DonationArgs::default()
        };
        assert!(bad.to_filter().is_err());
        let bad = DonationArgs {
            to_date: Some("June 1".to_string()),
            ..DonationArgs::default()
        };
        assert!(bad.to_filter().is_err());
    }

    #[test]
    fn test_donation_window_defaults_to_three_months() {
        let cli = Cli::try_parse_from(["giftcards", "report", "donations"]).unwrap();
        let Commands::Report { command: ReportCommands::Donations { filter } } = cli.command else {
            panic!("expected report donations");
        };
        assert_eq!(filter.to_filter().unwrap().window, Some(TimeWindow::Last3Months));

        let cli = Cli::try_parse_from(["giftcards", "export", "donations", "--window", "all"])
            .unwrap();
        let Commands::Export { command: ExportCommands::Donations { filter, .. } } = cli.command
        else {
            panic!("expected export donations");
        };
        assert_eq!(filter.to_filter().unwrap().window, None);
    }

    #[test]
    fn test_donate_amount_is_optional() {
        let cli = Cli::try_parse_from([
            "giftcards", "donate", "7", "--recipient", "Rivera family", "--volunteer", "Amy Brown",
        ])
        .unwrap();
        match cli.command {
            Commands::Donate { card, amount, .. } => {
                assert_eq!(card, 7);
                assert!(amount.is_none());
            }
            _ => panic!("expected donate"),
        }
    }
}
