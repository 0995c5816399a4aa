//! Command-file parsing.
//!
//! One command per line, tag first:
//! ```text
//! # 1000     start a new run labelled 1000 on an empty tree
//! I 42       insert key 42
//! D 42       delete key 42
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::common::{Error, Result};

/// A single workload command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Close the current run and start a new one labelled with the given size.
    NewTree(u64),
    Insert(u64),
    Delete(u64),
}

impl Command {
    /// Parse one line.
    ///
    /// The tag is the first character. The key is the run of ASCII digits
    /// following it (after optional whitespace); anything after the digits
    /// is ignored.
    ///
    /// # Errors
    /// `Error::Parse` carrying `line_number` for an empty line, an unknown
    /// tag, a missing key or a key that does not fit in a `u64`.
    ///
    /// # Example
    /// ```
    /// use abtree::workload::Command;
    ///
    /// assert_eq!(Command::parse("I 42", 1).unwrap(), Command::Insert(42));
    /// assert_eq!(Command::parse("# 1000", 2).unwrap(), Command::NewTree(1000));
    /// assert!(Command::parse("X 1", 3).is_err());
    /// ```
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let parse_error = |message: String| Error::Parse {
            line: line_number,
            message,
        };

        let mut chars = line.chars();
        let tag = chars
            .next()
            .ok_or_else(|| parse_error("empty line".to_string()))?;

        let rest = chars.as_str().trim_start();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(parse_error(format!("missing key after '{}'", tag)));
        }
        let key: u64 = rest[..digits]
            .parse()
            .map_err(|_| parse_error(format!("key '{}' out of range", &rest[..digits])))?;

        match tag {
            '#' => Ok(Command::NewTree(key)),
            'I' => Ok(Command::Insert(key)),
            'D' => Ok(Command::Delete(key)),
            other => Err(parse_error(format!("unknown command tag '{}'", other))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NewTree(size) => write!(f, "# {}", size),
            Command::Insert(key) => write!(f, "I {}", key),
            Command::Delete(key) => write!(f, "D {}", key),
        }
    }
}

/// Iterates over the commands of a line-oriented source.
///
/// Blank lines are skipped. Line numbers in parse errors are 1-based.
pub struct CommandReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl CommandReader<BufReader<File>> {
    /// Open a command file.
    ///
    /// # Errors
    /// `Error::Io` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for CommandReader<R> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;

            match line {
                Err(e) => return Some(Err(e.into())),
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => return Some(Command::parse(&text, self.line_number)),
            }
        }
    }
}
