//! Date, time and timestamp matchers.
//!
//! Formats are written as Java-style patterns (`yyyy-MM-dd'T'HH:mm:ss`) and
//! converted to `chrono` strftime syntax before parsing.

use crate::mismatch::Mismatch;
use crate::path::DocPath;
use crate::render::value_of;
use chrono::format::{parse, Item, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

const DEFAULT_DATE: &str = "%Y-%m-%d";
const DEFAULT_TIME: &str = "%H:%M:%S";
const LOCAL_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

fn pattern_letter(letter: char, count: usize) -> Option<&'static str> {
    let converted = match (letter, count) {
        ('y', 2) => "%y",
        ('y', _) | ('u', _) => "%Y",
        ('M', 1) | ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', _) => "%d",
        ('D', _) => "%j",
        ('H', _) => "%H",
        ('h', _) => "%I",
        ('m', _) => "%M",
        ('s', _) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('S', _) => "%f",
        ('a', _) => "%p",
        ('E', 4..) => "%A",
        ('E', _) => "%a",
        ('Z', _) | ('X', 1) | ('X', 2) | ('x', _) => "%z",
        ('X', _) => "%:z",
        _ => return None,
    };
    Some(converted)
}

/// Convert a Java-style date pattern to strftime syntax. Returns `None` for
/// unsupported pattern letters or an unterminated quote.
pub fn to_chrono_format(java: &str) -> Option<String> {
    let chars: Vec<char> = java.chars().collect();
    let mut output = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            // '' is a literal quote
            if chars.get(i + 1) == Some(&'\'') {
                output.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match chars.get(j) {
                    None => return None,
                    Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                        output.push('\'');
                        j += 2;
                    }
                    Some('\'') => break,
                    Some('%') => {
                        output.push_str("%%");
                        j += 1;
                    }
                    Some(&literal) => {
                        output.push(literal);
                        j += 1;
                    }
                }
            }
            i = j + 1;
        } else if c.is_ascii_alphabetic() {
            let mut count = 1;
            while chars.get(i + count) == Some(&c) {
                count += 1;
            }
            output.push_str(pattern_letter(c, count)?);
            i += count;
        } else {
            if c == '%' {
                output.push_str("%%");
            } else {
                output.push(c);
            }
            i += 1;
        }
    }

    if StrftimeItems::new(&output).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(output)
}

// Leap year used to check month and day when the pattern has no year
const YEARLESS_REFERENCE: i64 = 2000;

/// Parse `text` fully against a strftime pattern. Trailing residue and
/// impossible dates fail; missing components do not. A day and month
/// without a year must exist in some year, so `02/29` passes and `02/30`
/// does not.
fn conforms(text: &str, pattern: &str) -> Result<(), String> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new(pattern)).map_err(|e| e.to_string())?;
    match parsed.to_naive_date() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => check_yearless(parsed, pattern),
        Err(e) => Err(e.to_string()),
    }
}

fn check_yearless(mut parsed: Parsed, pattern: &str) -> Result<(), String> {
    // Weekdays are tied to a real year, so they are not checked here
    let yearless = !["%Y", "%y", "%a", "%A"].iter().any(|spec| pattern.contains(spec));
    if !yearless || parsed.set_year(YEARLESS_REFERENCE).is_err() {
        return Ok(());
    }
    match parsed.to_naive_date() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn temporal_match(
    path: &DocPath,
    kind: &str,
    format: Option<&str>,
    actual: &Value,
    check: impl Fn(&str, Option<&str>) -> Result<(), String>,
) -> Option<Mismatch> {
    let described = format.unwrap_or("default");
    let error = match actual {
        Value::String(s) => match check(s, format) {
            Ok(()) => return None,
            Err(error) => error,
        },
        other => format!("{} is not a string", value_of(other)),
    };
    Some(
        Mismatch::new(
            path.to_string(),
            format!(
                "Expected {} to match a {} of '{}': {}",
                value_of(actual),
                kind,
                described,
                error
            ),
        )
        .with_actual(actual.clone()),
    )
}

fn with_format(text: &str, format: Option<&str>, default: &str) -> Result<(), String> {
    match format {
        Some(java) => {
            let pattern = to_chrono_format(java).ok_or_else(|| format!("invalid format '{java}'"))?;
            conforms(text, &pattern)
        }
        None => conforms(text, default),
    }
}

pub(super) fn date(path: &DocPath, format: Option<&str>, actual: &Value) -> Option<Mismatch> {
    temporal_match(path, "date", format, actual, |text, format| {
        with_format(text, format, DEFAULT_DATE)
    })
}

pub(super) fn time(path: &DocPath, format: Option<&str>, actual: &Value) -> Option<Mismatch> {
    temporal_match(path, "time", format, actual, |text, format| {
        with_format(text, format, DEFAULT_TIME)
    })
}

/// Without a format, RFC 3339 and zone-less ISO timestamps are accepted.
pub(super) fn timestamp(path: &DocPath, format: Option<&str>, actual: &Value) -> Option<Mismatch> {
    temporal_match(path, "timestamp", format, actual, |text, format| match format {
        Some(_) => with_format(text, format, LOCAL_TIMESTAMP),
        None => DateTime::parse_from_rfc3339(text)
            .map(|_| ())
            .or_else(|_| NaiveDateTime::parse_from_str(text, LOCAL_TIMESTAMP).map(|_| ()))
            .map_err(|e| e.to_string()),
    })
}
