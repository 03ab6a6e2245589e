use std::{
    fs, io,
    path::{Path, PathBuf},
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::default_categories,
    times::{ExecutionTimes, fit_values},
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid line pattern")]
    Pattern(#[from] regex::Error),
}

/// How a line of the execution times log is turned into a record
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStrategy {
    /// Split on `" - "`, then read the token after every category label
    #[default]
    TokenSplit,
    /// Match the whole line against a fixed pattern built from the categories
    PatternMatch,
}

/// What [`ParseStrategy::TokenSplit`] does with a record of the wrong length
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortRecordPolicy {
    #[default]
    Drop,
    Pad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub strategy: ParseStrategy,
    pub categories: Vec<String>,
    pub skip_header: bool,
    pub short_records: ShortRecordPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strategy: ParseStrategy::default(),
            categories: default_categories(),
            skip_header: true,
            short_records: ShortRecordPolicy::default(),
        }
    }
}

/// Reads `path` and extracts the execution times it contains.
///
/// Only reading the file can fail; malformed lines are skipped.
pub fn parse(path: &Path, options: &ParseOptions) -> Result<ExecutionTimes, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParseError::NotFound {
            path: path.to_owned(),
        },
        _ => ParseError::Io {
            path: path.to_owned(),
            source,
        },
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    parse_str(&content, options)
}

pub fn parse_str(content: &str, options: &ParseOptions) -> Result<ExecutionTimes, ParseError> {
    let times = match options.strategy {
        ParseStrategy::TokenSplit => parse_token_split(content, options),
        ParseStrategy::PatternMatch => parse_pattern_match(content, &options.categories)?,
    };
    debug!("Parsed {} methods", times.len());
    Ok(times)
}

fn parse_token_split(content: &str, options: &ParseOptions) -> ExecutionTimes {
    let expected = options.categories.len();
    let mut times = ExecutionTimes::new();

    for line in content.lines().skip(usize::from(options.skip_header)) {
        let parts: Vec<&str> = line.trim().split(" - ").collect();
        if parts.len() < 2 {
            continue;
        }

        let method = parts[0].trim();
        if method.is_empty() {
            debug!("Skipping line without method name: {line:?}");
            continue;
        }

        // Values follow their labels: "Matrix: 32 Merge: 123 Primes: 28"
        let mut values: Vec<i64> = parts[1]
            .split_whitespace()
            .skip(1)
            .step_by(2)
            .map(|token| token.parse().unwrap_or(0))
            .collect();

        if values.len() != expected {
            match options.short_records {
                ShortRecordPolicy::Pad if !values.is_empty() => {
                    warn!(
                        "{method} has {} values instead of {expected}",
                        values.len()
                    );
                    fit_values(&mut values, expected);
                }
                _ => {
                    debug!(
                        "Dropping {method}: {} values instead of {expected}",
                        values.len()
                    );
                    continue;
                }
            }
        }
        times.insert(method, values);
    }
    times
}

fn line_pattern(categories: &[String]) -> Result<Regex, regex::Error> {
    let fields = categories
        .iter()
        .map(|category| format!(r"{}: (\d+)", regex::escape(category)))
        .collect::<Vec<_>>()
        .join(" ");
    Regex::new(&format!(r"^\s*(\w[\w\s-]*?) - {fields}\s*$"))
}

fn parse_pattern_match(content: &str, categories: &[String]) -> Result<ExecutionTimes, ParseError> {
    let re = line_pattern(categories)?;
    let mut times = ExecutionTimes::new();

    for line in content.lines() {
        let Some(cap) = re.captures(line) else {
            continue;
        };
        let values: Option<Vec<i64>> = cap
            .iter()
            .skip(2)
            .map(|m| m.and_then(|m| m.as_str().parse().ok()))
            .collect();
        match values {
            Some(values) => times.insert(cap[1].trim(), values),
            None => debug!("Dropping out of range values: {line:?}"),
        }
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOG: &str = "\
Method - Results
Round-Robin - Matrix: 32 Merge: 123 Primes: 28
Threads - Matrix: 40 Merge: 90 Primes: 31
Virtual Threads - Matrix: 25 Merge: 70 Primes: 19
";

    fn token_split() -> ParseOptions {
        ParseOptions::default()
    }

    fn pattern_match() -> ParseOptions {
        ParseOptions {
            strategy: ParseStrategy::PatternMatch,
            ..Default::default()
        }
    }

    fn entries(times: &ExecutionTimes) -> Vec<(String, Vec<i64>)> {
        times
            .iter()
            .map(|(m, v)| (m.to_owned(), v.to_vec()))
            .collect()
    }

    #[test]
    fn single_record() {
        let times = parse_str(
            "header\nRound-Robin - Matrix: 32 Merge: 123 Primes: 28\n",
            &token_split(),
        )
        .unwrap();
        assert_eq!(
            entries(&times),
            vec![("Round-Robin".to_owned(), vec![32, 123, 28])]
        );
    }

    #[test]
    fn both_strategies_agree_on_well_formed_log() {
        let expected = vec![
            ("Round-Robin".to_owned(), vec![32, 123, 28]),
            ("Threads".to_owned(), vec![40, 90, 31]),
            ("Virtual Threads".to_owned(), vec![25, 70, 19]),
        ];
        assert_eq!(entries(&parse_str(LOG, &token_split()).unwrap()), expected);
        assert_eq!(entries(&parse_str(LOG, &pattern_match()).unwrap()), expected);
    }

    #[test]
    fn token_split_drops_short_records() {
        let times = parse_str(
            "Method - Results\nThreads - Matrix: 40 Merge: 90\n",
            &token_split(),
        )
        .unwrap();
        assert!(times.is_empty());
    }

    #[test]
    fn token_split_keeps_other_records_when_dropping() {
        let log = "Method - Results\nThreads - Matrix: 40 Merge: 90\nRound-Robin - Matrix: 1 Merge: 2 Primes: 3\n";
        let times = parse_str(log, &token_split()).unwrap();
        assert_eq!(times.methods().collect::<Vec<_>>(), ["Round-Robin"]);
    }

    #[test]
    fn token_split_zeroes_unparsable_values() {
        let times = parse_str(
            "header\nThreads - Matrix: 40 Merge: n/a Primes: 12ms\n",
            &token_split(),
        )
        .unwrap();
        assert_eq!(times.get("Threads"), Some(&[40, 0, 0][..]));
    }

    #[test]
    fn token_split_pads_when_configured() {
        let options = ParseOptions {
            short_records: ShortRecordPolicy::Pad,
            ..Default::default()
        };
        let times = parse_str("header\nThreads - Matrix: 40 Merge: 90\n", &options).unwrap();
        assert_eq!(times.get("Threads"), Some(&[40, 90, 0][..]));
    }

    #[test]
    fn padding_never_turns_a_header_into_a_method() {
        let options = ParseOptions {
            short_records: ShortRecordPolicy::Pad,
            skip_header: false,
            ..Default::default()
        };
        let times = parse_str("Method - Results\n", &options).unwrap();
        assert!(times.is_empty());
    }

    #[test]
    fn token_split_skips_first_line_only_when_asked() {
        let line = "Round-Robin - Matrix: 32 Merge: 123 Primes: 28\n";
        assert!(parse_str(line, &token_split()).unwrap().is_empty());

        let options = ParseOptions {
            skip_header: false,
            ..Default::default()
        };
        assert_eq!(parse_str(line, &options).unwrap().len(), 1);
    }

    #[test]
    fn empty_and_header_only_input() {
        for content in ["", "Method - Results\n", "\n\n\n"] {
            assert!(parse_str(content, &token_split()).unwrap().is_empty());
            assert!(parse_str(content, &pattern_match()).unwrap().is_empty());
        }
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let log = "header\nno separator here\n\n - Matrix: 1 Merge: 2 Primes: 3\nThreads - Matrix: 1 Merge: 2 Primes: 3\n";
        let times = parse_str(log, &token_split()).unwrap();
        assert_eq!(times.methods().collect::<Vec<_>>(), ["Threads"]);
    }

    #[test]
    fn pattern_match_requires_the_full_shape() {
        let log = "\
Threads - Matrix: 40 Merge: 90
Round-Robin - Matrix: 32 Merge: x Primes: 28
Virtual Threads - Matrix: 25 Merge: 70 Primes: 19 trailing
Fibers - Matrix: 1 Merge: 2 Primes: 3
";
        let times = parse_str(log, &pattern_match()).unwrap();
        assert_eq!(entries(&times), vec![("Fibers".to_owned(), vec![1, 2, 3])]);
    }

    #[test]
    fn pattern_match_drops_overflowing_values() {
        let log = "Threads - Matrix: 99999999999999999999 Merge: 1 Primes: 2\n";
        assert!(parse_str(log, &pattern_match()).unwrap().is_empty());
    }

    #[test]
    fn custom_categories() {
        let options = ParseOptions {
            categories: vec!["Sort".to_owned(), "Hash (x2)".to_owned()],
            ..Default::default()
        };
        let log = "header\nThreads - Sort: 5 Hash (x2): 7\n";
        assert_eq!(
            parse_str(log, &options).unwrap().get("Threads"),
            Some(&[5, 0][..]),
            "token split reads every second token"
        );

        let options = ParseOptions {
            strategy: ParseStrategy::PatternMatch,
            ..options
        };
        assert_eq!(
            parse_str(log, &options).unwrap().get("Threads"),
            Some(&[5, 7][..])
        );
    }

    #[test]
    fn missing_file_is_reported_by_path() {
        let err = parse(Path::new("does/not/exist.txt"), &token_split()).unwrap_err();
        assert!(matches!(err, ParseError::NotFound { .. }));
        assert_eq!(err.to_string(), "input file not found: does/not/exist.txt");
    }
}
