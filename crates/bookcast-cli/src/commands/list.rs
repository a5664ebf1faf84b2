//! Booking listing command.

use anyhow::Result;
use bookcast_core::config::{DEFAULT_DATA_FILE, DEFAULT_MAX_BOOKINGS};
use bookcast_core::BookingStore;
use bookcast_db::BookingFile;
use clap::Args;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct ListArgs {
    /// File holding the persisted bookings
    #[arg(long, env = "BOOKCAST_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Maximum number of bookings retained
    #[arg(long, env = "BOOKCAST_MAX_BOOKINGS", default_value_t = DEFAULT_MAX_BOOKINGS)]
    pub max_bookings: usize,

    /// Only show unconfirmed bookings
    #[arg(long)]
    pub pending: bool,
}

pub async fn execute(args: ListArgs) -> Result<()> {
    let store =
        BookingStore::try_open(BookingFile::new(&args.data_file), args.max_bookings).await?;

    let bookings: Vec<_> = store
        .snapshot()
        .into_iter()
        .filter(|b| !args.pending || !b.is_confirmed)
        .collect();

    output::print_bookings_table(&bookings);
    Ok(())
}
