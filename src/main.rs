mod categories;
mod cli;
mod duplicate;
mod error;
mod export;
mod fixtures;
mod fmt;
mod importer;
mod intake;
mod ledger;
mod models;
mod reports;
mod settings;
mod store;

use clap::{CommandFactory, Parser};
use env_logger::Env;

use cli::{CardsCommands, Cli, Commands, Context, ExportCommands, ReportCommands};

/// `GIFTCARDS_LOG` wins, then `RUST_LOG`, then the level picked by `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let fallback = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    env_logger::Builder::from_env(Env::new().filter_or("GIFTCARDS_LOG", fallback))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::new(cli.data_dir.as_deref());
    log::debug!("data dir {}", ctx.data_dir.display());

    let result = match cli.command {
        Commands::Init => cli::init::run(&ctx.data_dir),
        Commands::Demo { force } => cli::demo::run(&ctx.data_dir, force),
        Commands::Status => cli::status::run(&ctx),
        Commands::Cards { command } => match command {
            CardsCommands::Add {
                store,
                last4,
                amount,
                added_by,
                date,
                notes,
                force,
            } => cli::cards::add(
                &ctx,
                cli::cards::AddArgs {
                    store,
                    last4,
                    amount,
                    added_by,
                    date,
                    notes,
                    force,
                },
            ),
            CardsCommands::List { store, last4, status } => {
                cli::cards::list(&ctx, store, last4, status)
            }
            CardsCommands::Show { id } => cli::cards::show(&ctx, id),
            CardsCommands::Check { store, last4 } => cli::cards::check(&ctx, &store, &last4),
            CardsCommands::Stores { query } => cli::cards::stores(&ctx, query),
        },
        Commands::Import {
            file,
            include_duplicates,
            dry_run,
            force,
        } => cli::import::run(&ctx, &file, include_duplicates, dry_run, force),
        Commands::Template { output } => cli::import::template(output),
        Commands::Spend {
            card,
            amount,
            volunteer,
            notes,
        } => cli::redeem::spend(&ctx, card, amount, volunteer, notes),
        Commands::Donate {
            card,
            amount,
            recipient,
            volunteer,
            notes,
        } => cli::redeem::donate(&ctx, card, amount, recipient, volunteer, notes),
        Commands::Report { command } => match command {
            ReportCommands::Dashboard => cli::report::dashboard(&ctx),
            ReportCommands::Inventory {
                category,
                page,
                per_page,
            } => cli::report::inventory(&ctx, category, page, per_page),
            ReportCommands::Categories => cli::report::categories(&ctx),
            ReportCommands::Treemap { category } => cli::report::treemap(&ctx, category),
            ReportCommands::Donations { filter } => cli::report::donations(&ctx, &filter),
        },
        Commands::Export { command } => match command {
            ExportCommands::Donations { filter, output } => {
                cli::export::donations(&ctx, &filter, output)
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "giftcards", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
