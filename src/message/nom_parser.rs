//! Nom-based IRC line parser.
//!
//! Splits one protocol line into borrowed prefix, command and parameter
//! slices. Unlike a strict grammar check, this parser is total: every input,
//! however malformed, produces a [`ParsedLine`]. Missing pieces are left
//! empty and judged later by the classifier.

use nom::{
    bytes::complete::{take_till, take_while},
    character::complete::char,
    combinator::opt,
    error::context,
    sequence::preceded,
    IResult,
};

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    context("parsing message prefix", preceded(char(':'), take_till(|c| c == ' ')))(input)
}

/// Skip a run of separating spaces.
fn parse_spaces(input: &str) -> IResult<&str, &str> {
    take_while(|c| c == ' ')(input)
}

/// Parse the command token. May be empty if the line ends early.
fn parse_command(input: &str) -> IResult<&str, &str> {
    context("parsing IRC command", take_till(|c| c == ' '))(input)
}

/// Parse a complete IRC line into its components.
///
/// IRC message format:
/// ```text
/// [:prefix SPACE] <command> *(SPACE middle) [SPACE :trailing]
/// ```
///
/// Trailing CR/LF bytes are ignored.
pub fn parse_line(input: &str) -> ParsedLine<'_> {
    let line = input.trim_end_matches(['\r', '\n']);

    // None of these combinators can fail on complete input; the fallbacks
    // only keep the function total.
    let (rest, prefix) = opt(parse_prefix)(line).unwrap_or((line, None));
    let (rest, _) = parse_spaces(rest).unwrap_or((rest, ""));
    let (rest, command) = parse_command(rest).unwrap_or((rest, ""));

    let mut params: Vec<&str> = Vec::new();
    let mut rest = rest;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            // Trailing parameter - everything after `:` to end of line
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    ParsedLine {
        prefix,
        command,
        params,
    }
}

/// A parsed IRC line with borrowed string slices.
///
/// This is the intermediate representation produced by the nom parser.
/// It holds references into the original input string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name. Empty when the line carried none.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
}
