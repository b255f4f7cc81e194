use std::fmt;

use crate::error::{BenchError, Result};

/// One line of the interactive protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `Q l r`, or a bare `l r`. Bounds may be negative or unordered; the
    /// session sorts and clamps them.
    Query { l: i64, r: i64 },
    /// `U i v`: set position `i` to `v`.
    Update { index: usize, value: u64 },
    Exit,
}

impl Command {
    /// Parse one line. Blank lines give `None`.
    pub fn parse(line: &str) -> Option<Result<Command>> {
        let mut tokens = line.split_whitespace();
        let first = tokens.next()?;
        let invalid = || BenchError::Command(line.trim().to_string());
        Some(Self::parse_tokens(first, tokens).ok_or_else(invalid))
    }

    fn parse_tokens<'a>(first: &str, mut rest: impl Iterator<Item = &'a str>) -> Option<Command> {
        let command = match first {
            "exit" | "EXIT" | "Exit" => Command::Exit,
            "Q" | "q" => Command::Query {
                l: rest.next()?.parse().ok()?,
                r: rest.next()?.parse().ok()?,
            },
            "U" | "u" => Command::Update {
                index: rest.next()?.parse().ok()?,
                value: rest.next()?.parse().ok()?,
            },
            l => Command::Query {
                l: l.parse().ok()?,
                r: rest.next()?.parse().ok()?,
            },
        };
        rest.next().is_none().then_some(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query { l, r } => write!(f, "Q {l} {r}"),
            Command::Update { index, value } => write!(f, "U {index} {value}"),
            Command::Exit => write!(f, "exit"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(line: &str) -> Option<Command> {
        Command::parse(line).map(|c| c.unwrap())
    }

    #[test]
    fn forms() {
        assert_eq!(parse("Q 2 5"), Some(Command::Query { l: 2, r: 5 }));
        assert_eq!(parse("  q 5 2 "), Some(Command::Query { l: 5, r: 2 }));
        assert_eq!(parse("-3 7"), Some(Command::Query { l: -3, r: 7 }));
        assert_eq!(parse("U 3 0"), Some(Command::Update { index: 3, value: 0 }));
        assert_eq!(
            parse("u 9 9999"),
            Some(Command::Update {
                index: 9,
                value: 9999
            })
        );
        for exit in ["exit", "EXIT", "Exit", " exit "] {
            assert_eq!(parse(exit), Some(Command::Exit));
        }
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \t"), None);
    }

    #[test]
    fn invalid() {
        let missing = ["Q", "Q 1", "U 1", "7"];
        let malformed = ["Q a b", "U -1 4", "U 1 -4", "X 1 2"];
        let trailing = ["Q 1 2 3", "exit now"];
        for line in missing.into_iter().chain(malformed).chain(trailing) {
            assert!(
                matches!(Command::parse(line), Some(Err(BenchError::Command(_)))),
                "{line:?} should not parse"
            );
        }
    }

    #[test]
    fn display_parses_back() {
        for command in [
            Command::Query { l: 0, r: 9 },
            Command::Update {
                index: 4,
                value: 17,
            },
            Command::Exit,
        ] {
            assert_eq!(parse(&command.to_string()), Some(command));
        }
    }
}
