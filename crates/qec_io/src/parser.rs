//! Parsers for the text formats exchanged with the experiment tooling.
//!
//! Two formats are understood:
//!
//! * bit-row files, one `0`/`1` string per line. Rows may be wrapped in
//!   single or double quotes and followed by a comma, so list literals
//!   copied from scripts parse unchanged. `#` starts a comment.
//! * histogram files, either a dict literal such as
//!   `{'000 0000111': 12, '000 1010101': 9}` or one `key: count` entry per
//!   line. Repeated keys are summed.

use anyhow::{Result, anyhow, bail};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, one_of, space0, u64 as count},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
};
use qec_common::Histogram;
use qec_core::bit_utils::BitString;

fn is_bit(c: char) -> bool {
    c == '0' || c == '1'
}

fn is_key_char(c: char) -> bool {
    is_bit(c) || c == ' '
}

fn quote(input: &str) -> IResult<&str, char> {
    one_of("'\"")(input)
}

/// `0110011`, `'0110011'` or `"0110011",`
fn bit_row(input: &str) -> IResult<&str, &str> {
    delimited(
        space0,
        delimited(opt(quote), take_while1(is_bit), opt(quote)),
        tuple((space0, opt(char(',')), space0)),
    )(input)
}

fn quoted_key(input: &str) -> IResult<&str, &str> {
    delimited(quote, take_while1(is_key_char), quote)(input)
}

fn bare_key(input: &str) -> IResult<&str, &str> {
    take_while1(is_key_char)(input)
}

fn entry(input: &str) -> IResult<&str, (&str, u64)> {
    separated_pair(
        preceded(multispace0, alt((quoted_key, bare_key))),
        delimited(multispace0, char(':'), multispace0),
        count,
    )(input)
}

fn dict(input: &str) -> IResult<&str, Vec<(&str, u64)>> {
    delimited(
        preceded(multispace0, char('{')),
        terminated(
            separated_list0(preceded(multispace0, char(',')), entry),
            opt(preceded(multispace0, char(','))),
        ),
        preceded(multispace0, char('}')),
    )(input)
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

/// Parses a bit-row file into rows, skipping blank and comment lines.
pub fn parse_bit_rows(input: &str, context: &str) -> Result<Vec<BitString>> {
    let mut rows = Vec::new();
    for (n, line) in input.lines().enumerate() {
        let line = strip_comment(line);
        if line.is_empty() {
            continue;
        }
        let (_, row) = all_consuming(bit_row)(line).map_err(|e| {
            anyhow!(
                "{} line {}: expected a row of 0/1 characters, found {:?} ({})",
                context,
                n + 1,
                line,
                e
            )
        })?;
        rows.push(BitString::parse(row, context)?);
    }
    Ok(rows)
}

fn insert(histogram: &mut Histogram, key: &str, value: u64) -> Result<()> {
    let key = key.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        bail!("histogram entry with an empty key");
    }
    *histogram.entry(key).or_insert(0) += value;
    Ok(())
}

/// Parses a histogram in dict-literal or line form.
pub fn parse_histogram(input: &str) -> Result<Histogram> {
    let mut histogram = Histogram::new();

    if input.trim_start().starts_with('{') {
        let (_, entries) = all_consuming(terminated(dict, multispace0))(input)
            .map_err(|e| anyhow!("malformed histogram dict: {}", e))?;
        for (key, value) in entries {
            insert(&mut histogram, key, value)?;
        }
        return Ok(histogram);
    }

    for (n, line) in input.lines().enumerate() {
        let line = strip_comment(line);
        if line.is_empty() {
            continue;
        }
        let (_, (key, value)) = all_consuming(terminated(entry, space0))(line).map_err(|e| {
            anyhow!("histogram line {}: expected `key: count`, found {:?} ({})", n + 1, line, e)
        })?;
        insert(&mut histogram, key, value)?;
    }
    Ok(histogram)
}

/// Renders a histogram in line form, one `key: count` per line in key
/// order.
pub fn format_histogram(histogram: &Histogram) -> String {
    histogram
        .iter()
        .map(|(key, count)| format!("{}: {}\n", key, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_rows_accept_quotes_commas_and_comments() {
        let text = "# Steane parity check matrix\n\
                    '0001111',\n\
                    \"0110011\"  # second row\n\
                    \n\
                    1010101\n";
        let rows = parse_bit_rows(text, "matrix").unwrap();
        let rendered: Vec<String> = rows.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["0001111", "0110011", "1010101"]);
    }

    #[test]
    fn bit_rows_reject_other_characters() {
        let err = parse_bit_rows("0001111\n0120011\n", "matrix").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn dict_histogram_parses() {
        let text = "{'000 0000000': 3, '001 0000000' : 2,\n '000 1111111': 5,}";
        let hist = parse_histogram(text).unwrap();
        assert_eq!(hist.len(), 3);
        assert_eq!(hist.get("001 0000000"), Some(&2));
        assert_eq!(hist.values().sum::<u64>(), 10);
    }

    #[test]
    fn line_histogram_parses_and_sums_repeats() {
        let text = "# shots\n000 0000000: 3\n\"000 0000000\": 4\n1 1: 1\n";
        let hist = parse_histogram(text).unwrap();
        assert_eq!(hist.get("000 0000000"), Some(&7));
        assert_eq!(hist.get("1 1"), Some(&1));
    }

    #[test]
    fn malformed_histograms_fail() {
        assert!(parse_histogram("{'000': x}").is_err());
        assert!(parse_histogram("000 111 12").is_err());
        assert!(parse_histogram("'  ': 4").is_err());
    }

    #[test]
    fn line_format_reads_back() {
        let mut hist = Histogram::new();
        hist.insert("10 0000111".to_string(), 4);
        hist.insert("00 0000000".to_string(), 6);
        let text = format_histogram(&hist);
        assert_eq!(text, "00 0000000: 6\n10 0000111: 4\n");
        assert_eq!(parse_histogram(&text).unwrap(), hist);
    }
}
