//! Interactive terminal prompts.
//!
//! All prompt logic is written against `BufRead`/`Write` so it can be tested
//! without a terminal. EOF on the input stream behaves like accepting the
//! default.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Accepted yes tokens (English and German), compared lowercase.
const AFFIRMATIVE: &[&str] = &["y", "yes", "j", "ja"];
/// Accepted no tokens, compared lowercase.
const NEGATIVE: &[&str] = &["n", "no", "nein"];

/// Ask a yes/no question on the process's terminal.
pub fn confirm(question: &str, default: bool) -> io::Result<bool> {
    let stdin = io::stdin();
    confirm_with(stdin.lock(), io::stderr(), question, default)
}

/// Ask a yes/no question. Blank input yields the default; unrecognized input
/// re-prompts.
pub fn confirm_with<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    question: &str,
    default: bool,
) -> io::Result<bool> {
    let hint = if default { "[Y]/n" } else { "y/[N]" };
    loop {
        write!(output, "{question} ({hint}): ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(default);
        }
        let token = line.trim().to_lowercase();
        if token.is_empty() {
            return Ok(default);
        }
        if AFFIRMATIVE.contains(&token.as_str()) {
            return Ok(true);
        }
        if NEGATIVE.contains(&token.as_str()) {
            return Ok(false);
        }
        writeln!(output, "Please answer yes or no.")?;
    }
}

/// Present a numbered menu on the process's terminal.
pub fn select(
    description: &str,
    items: &[impl Display],
    allow_blank: bool,
) -> io::Result<Option<usize>> {
    let stdin = io::stdin();
    select_with(stdin.lock(), io::stderr(), description, items, allow_blank)
}

/// Present a numbered menu and read one selection.
///
/// Returns `None` on blank input when `allow_blank` is set (used to finish
/// repeated input-column selection) and on EOF. Out-of-range or
/// non-numeric input re-prompts.
pub fn select_with<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    description: &str,
    items: &[impl Display],
    allow_blank: bool,
) -> io::Result<Option<usize>> {
    if items.is_empty() {
        return Ok(None);
    }
    writeln!(output, "\n{description}")?;
    for (index, item) in items.iter().enumerate() {
        writeln!(output, "{index:>3} {item}")?;
    }
    loop {
        write!(output, "Your selection: ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let token = line.trim();
        if token.is_empty() && allow_blank {
            return Ok(None);
        }
        match token.parse::<usize>() {
            Ok(index) if index < items.len() => return Ok(Some(index)),
            _ => writeln!(output, "Please enter a number between 0 and {}.", items.len() - 1)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_confirm(input: &str, default: bool) -> bool {
        confirm_with(Cursor::new(input), Vec::new(), "Continue?", default).expect("confirm")
    }

    #[test]
    fn blank_input_yields_default() {
        assert!(run_confirm("\n", true));
        assert!(!run_confirm("\n", false));
    }

    #[test]
    fn eof_yields_default() {
        assert!(run_confirm("", true));
    }

    #[test]
    fn localized_tokens_are_accepted() {
        assert!(run_confirm("ja\n", false));
        assert!(run_confirm("Y\n", false));
        assert!(!run_confirm("nein\n", true));
        assert!(!run_confirm("No\n", true));
    }

    #[test]
    fn unrecognized_input_reprompts() {
        let mut output = Vec::new();
        let accepted = confirm_with(
            Cursor::new("vielleicht\nja\n"),
            &mut output,
            "Continue?",
            false,
        )
        .expect("confirm");
        assert!(accepted);
        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("Please answer yes or no."));
    }

    #[test]
    fn select_parses_index_and_reprompts_out_of_range() {
        let items = ["Genre", "Figur_L2"];
        let mut output = Vec::new();
        let choice = select_with(Cursor::new("7\n1\n"), &mut output, "Pick:", &items, false)
            .expect("select");
        assert_eq!(choice, Some(1));
    }

    #[test]
    fn select_blank_finishes_when_allowed() {
        let items = ["Genre"];
        let choice = select_with(Cursor::new("\n"), Vec::new(), "Pick:", &items, true)
            .expect("select");
        assert_eq!(choice, None);
    }
}
