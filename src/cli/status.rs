use crate::cli::Context;
use crate::error::Result;
use crate::fixtures;
use crate::fmt::when;
use crate::reports::inventory_summary;

pub fn run(ctx: &Context) -> Result<()> {
    let ledger_path = fixtures::ledger_path(&ctx.data_dir);

    println!("Data dir:     {}", ctx.data_dir.display());
    println!("Ledger:       {}", ledger_path.display());
    println!("Volunteers:   {}", ctx.settings.volunteers.join(", "));
    println!("Low balance:  under {}", ctx.settings.low_balance_threshold);

    if !ledger_path.exists() {
        println!();
        println!("Ledger not found. Run `giftcards init` or `giftcards demo` to set up.");
        return Ok(());
    }

    let store = ctx.open()?;
    let summary = inventory_summary(&store);

    println!();
    println!("Cards:         {} ({} active)", summary.total_cards, summary.active_cards);
    println!("Remaining:     {}", summary.total_remaining);
    println!("Transactions:  {}", store.transactions().len());
    println!("Donations:     {} seeded", store.donations().len());
    match store.imports().last() {
        Some(last) => println!("Last import:   {} on {}", last.filename, when(&last.imported_at)),
        None => println!("Last import:   (none)"),
    }
    Ok(())
}
