pub mod config;
pub mod error;
pub mod init;
pub mod media;
pub mod menu;
pub mod signal;
pub mod tools;

pub use error::{MediaError, Result};
pub use media::{ConcatOutcome, MediaOps, TileSpec, TimeRange, TrimOutcome};

use console::{Term, style};

pub fn pause(term: &Term) -> anyhow::Result<()> {
    println!("\n{}", style("按 Enter 繼續...").dim());
    term.read_line()?;
    Ok(())
}
