//! Date validation command.

use crate::cli::icons::{error, success};
use crate::forms::{parse_date, DATE_FORMAT_HINT};

pub fn cmd_validate_date(value: &str) -> anyhow::Result<()> {
    match parse_date(value) {
        Some(date) => {
            println!("{} {} ({})", success(), value, date.format("%A %-d %B %Y"));
            Ok(())
        }
        None => {
            eprintln!("{} {}", error(), value);
            anyhow::bail!("{}", DATE_FORMAT_HINT)
        }
    }
}
