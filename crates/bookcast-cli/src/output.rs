//! Terminal output formatting.

use bookcast_core::booking::format_time;
use bookcast_core::Booking;
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

/// Print bookings as a table, newest first.
pub fn print_bookings_table(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("{}", "No bookings found.".dimmed());
        return;
    }

    println!(
        "{:<24} {:<20} {:>5}  {:<26} {:<10}",
        "ID", "Venue", "Party", "Time", "Status"
    );
    println!("{}", "─".repeat(90));

    for booking in bookings {
        let status = if booking.is_confirmed {
            "confirmed".green()
        } else {
            "pending".yellow()
        };

        println!(
            "{:<24} {} {:>5}  {:<26} {:<10}",
            truncate(&booking.id, 24),
            pad(&truncate(&booking.venue_name, 20), 20),
            booking.party_size,
            format_time(&booking.time),
            status
        );
    }

    let confirmed = bookings.iter().filter(|b| b.is_confirmed).count();
    println!();
    println!(
        "{} bookings, {} confirmed",
        bookings.len().to_string().bold(),
        confirmed.to_string().green()
    );
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width + 1 > max_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push('…');
    result
}

/// Pad to a display width; `{:<n}` counts chars, not columns.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}
