use snafu::prelude::*;

/// Splits a command line into words.
///
/// Words are separated by spaces. Double quotes group text containing spaces
/// and a backslash takes the next character literally.
pub fn parse_args(input: &str) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    // Tracks `""` so an explicitly empty word is still emitted.
    let mut quoted_word = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => {
                in_quotes = !in_quotes;
                quoted_word = true;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() || quoted_word {
                    args.push(std::mem::take(&mut current));
                }
                quoted_word = false;
            }
            _ => current.push(ch),
        }
    }

    ensure!(!in_quotes, UnmatchedQuoteSnafu);
    if !current.is_empty() || quoted_word {
        args.push(current);
    }
    Ok(args)
}

#[derive(Debug, Snafu)]
pub enum ParseError {
    #[snafu(display("unmatched quote"))]
    UnmatchedQuote,
}
