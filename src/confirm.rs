use crate::errors::Result;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "Do you want to proceed with the above changes? (y/n): ";

/// Asks the operator whether to go ahead with the previewed changes.
///
/// Blocks until one line is read. End of input counts as an empty answer.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

/// Only a lone `y` (after trimming and lowercasing) proceeds. `yes` does not.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == "y"
}
