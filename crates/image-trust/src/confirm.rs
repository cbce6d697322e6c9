//! Operator confirmation for destructive operations.

use std::io::{BufRead, Write};

/// Read one answer from `input`; `y` or `yes` (any case) confirms.
///
/// Empty input, extra words, EOF and read errors all count as "no".
pub fn ask_confirm<R: BufRead>(mut input: R) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => return false,
        Ok(_) => {}
    }

    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(answer), None) => {
            answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        }
        _ => false,
    }
}

/// Print `message` followed by `(y/n)` and wait for an answer.
pub fn prompt_for_confirmation<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    message: &str,
) -> bool {
    if write!(output, "{message} (y/n) ").and_then(|_| output.flush()).is_err() {
        return false;
    }
    ask_confirm(input)
}
