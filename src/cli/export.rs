use std::path::PathBuf;

use crate::cli::{Context, DonationArgs};
use crate::error::Result;
use crate::export::export_donations;
use crate::reports::{donation_log, donation_total, filter_donations};

pub fn donations(ctx: &Context, args: &DonationArgs, output: Option<String>) -> Result<()> {
    let filter = args.to_filter()?;
    let store = ctx.open()?;
    let now = chrono::Local::now().naive_local();
    let entries = filter_donations(&donation_log(&store), &filter, now);

    let output = output.map(PathBuf::from);
    let path = export_donations(&entries, &ctx.data_dir.join("exports"), output.as_deref())?;
    println!(
        "Exported {} donations ({}) to {}",
        entries.len(),
        donation_total(&entries),
        path.display()
    );
    Ok(())
}
