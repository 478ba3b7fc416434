use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::io::{BufRead, Write};
use std::iter::FromIterator;
use thiserror::Error;
use tracing::debug;

pub const DELIMITER: char = '|';
pub const MARKER: char = '#';
pub const PROMPT: &str = "Enter your input (end with an empty line):";
pub const LABEL: &str = "Processed output:";

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Cannot read a line from the input")]
    CannotReadInput(#[source] std::io::Error),
    #[error("Cannot write to the output")]
    CannotWriteOutput(#[source] std::io::Error),
}

/// Splits a line on [`DELIMITER`]. Empty segments are kept.
pub fn segments(line: &str) -> impl Iterator<Item = &str> {
    line.split(DELIMITER)
}

pub fn is_marked(segment: &str) -> bool {
    segment.starts_with(MARKER)
}

/// Unique marked segments, remembered in the order they were first seen.
#[derive(Debug, Default, Clone)]
pub struct MarkedSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl MarkedSet {
    pub fn new() -> MarkedSet {
        MarkedSet::default()
    }

    /// Returns true only when `segment` is marked and was not already present.
    pub fn insert(&mut self, segment: &str) -> bool {
        if !is_marked(segment) || self.seen.contains(segment) {
            return false;
        }
        self.seen.insert(segment.to_owned());
        self.order.push(segment.to_owned());
        true
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.seen.contains(segment)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn join(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MarkedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.order.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DELIMITER)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<'a> Extend<&'a str> for MarkedSet {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for segment in iter {
            self.insert(segment);
        }
    }
}

impl<'a> FromIterator<&'a str> for MarkedSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> MarkedSet {
        let mut marked = MarkedSet::new();
        marked.extend(iter);
        marked
    }
}

impl IntoIterator for MarkedSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

pub fn sift_lines<I, S>(lines: I) -> MarkedSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut marked = MarkedSet::new();
    for line in lines {
        marked.extend(segments(line.as_ref()));
    }
    marked
}

/// Reads lines up to the first empty one, which is dropped.
/// End of input ends collection the same way.
pub fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = vec![];
    for line in reader.lines() {
        let line = line.map_err(SiftError::CannotReadInput)?;
        if line.is_empty() {
            debug!(lines = lines.len(), "input terminated by an empty line");
            return Ok(lines);
        }
        lines.push(line);
    }
    debug!(lines = lines.len(), "input ended without an empty line");
    Ok(lines)
}

pub fn process<R: BufRead, W: Write>(input: R, mut output: W) -> Result<String> {
    writeln!(output, "{}", PROMPT).map_err(SiftError::CannotWriteOutput)?;
    output.flush().map_err(SiftError::CannotWriteOutput)?;

    let lines = collect_lines(input)?;
    let marked = sift_lines(&lines);
    debug!(marked = marked.len(), "sifted marked segments");
    let result = marked.join();

    writeln!(output, "{}", LABEL).map_err(SiftError::CannotWriteOutput)?;
    writeln!(output, "{}", result).map_err(SiftError::CannotWriteOutput)?;
    output.flush().map_err(SiftError::CannotWriteOutput)?;
    Ok(result)
}
