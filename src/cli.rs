use std::io::{BufRead, Write};

use clap::Parser;
use color_eyre::eyre::Result;

use crate::constants::tree::{MAX_TIERS, MIN_TIERS};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Number of tiers in the tree (asked for on startup when omitted)
    #[arg(short, long, value_name = "COUNT", value_parser = parse_tiers)]
    pub tiers: Option<usize>,
}

pub fn parse_tiers(raw: &str) -> Result<usize, String> {
    let raw = raw.trim();
    let tiers: usize = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    if !(MIN_TIERS..=MAX_TIERS).contains(&tiers) {
        return Err(format!("tier count must be between {MIN_TIERS} and {MAX_TIERS}, got {tiers}"));
    }
    Ok(tiers)
}

/// Asks for the tier count on `output` and reads one line from `input`.
///
/// Invalid answers are reported and replaced with the smallest valid tier count.
pub fn prompt_tiers(input: &mut impl BufRead, output: &mut impl Write) -> Result<usize> {
    writeln!(output, "Enter the number of tiers: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    match parse_tiers(&line) {
        Ok(tiers) => Ok(tiers),
        Err(e) => {
            writeln!(output, "Error! {e}. Using {MIN_TIERS} tiers.")?;
            log::warn!("Invalid tier count {:?}: {e}", line.trim());
            Ok(MIN_TIERS)
        },
    }
}
