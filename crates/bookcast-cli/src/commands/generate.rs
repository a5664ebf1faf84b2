//! Offline booking generation command.

use anyhow::Result;
use bookcast_core::config::{DEFAULT_DATA_FILE, DEFAULT_MAX_BOOKINGS};
use bookcast_core::{generator, BookingStore};
use bookcast_db::BookingFile;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of bookings to generate
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,

    /// File holding the persisted bookings
    #[arg(long, env = "BOOKCAST_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Maximum number of bookings retained
    #[arg(long, env = "BOOKCAST_MAX_BOOKINGS", default_value_t = DEFAULT_MAX_BOOKINGS)]
    pub max_bookings: usize,
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    anyhow::ensure!(args.max_bookings > 0, "max bookings must be at least 1");

    let mut store = BookingStore::open(BookingFile::new(&args.data_file), args.max_bookings).await;

    let mut created = 0;
    for _ in 0..args.count {
        if let Ok(booking) = store.insert_newest(generator::generate_booking()).await {
            created += 1;
            println!(
                "{} {} party of {} ({})",
                "✓".green().bold(),
                booking.venue_name.cyan(),
                booking.party_size,
                booking.id.dimmed()
            );
        }
    }

    println!();
    println!(
        "Generated {} booking(s); {} now holds {} of {}.",
        created,
        args.data_file.display(),
        store.len(),
        store.capacity()
    );
    Ok(())
}
