//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{LexbloomArgs, OutputFormat};
use crate::error::Result;
use crate::report::{HumanReport, JsonReport, ReportSink};

/// Result structure for bit array sizing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SizeResult {
    pub unique_count: usize,
    pub target_false_positive_rate: f64,
    pub hash_function_count: usize,
    pub bit_array_size: usize,
    pub false_positive_rate_estimate: f64,
    pub refined_bit_array_size: Option<usize>,
}

/// Result structure for a single-corpus lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResult {
    pub corpus: String,
    pub unique_count: usize,
    pub bit_array_size: usize,
    pub bits_set: usize,
    pub matches: Vec<WordMatch>,
}

/// Lookup result for one word.
#[derive(Debug, Serialize, Deserialize)]
pub struct WordMatch {
    pub word: String,
    pub possibly_present: bool,
}

/// Create the report sink matching the selected output format, on stdout.
pub fn report_sink(args: &LexbloomArgs) -> Box<dyn ReportSink> {
    let stdout = io::stdout();
    match args.output_format {
        OutputFormat::Human => Box::new(HumanReport::new(stdout)),
        OutputFormat::Json => Box::new(JsonReport::new(stdout).pretty(args.pretty)),
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &LexbloomArgs) -> Result<()> {
    let mut out = io::stdout().lock();
    match args.output_format {
        OutputFormat::Human => output_human(&mut out, message, result, args),
        OutputFormat::Json => output_json(&mut out, result, args),
    }
}

/// Output in human-readable format.
fn output_human<W: Write, T: Serialize>(
    out: &mut W,
    message: &str,
    result: &T,
    args: &LexbloomArgs,
) -> Result<()> {
    if args.verbosity() > 0 {
        writeln!(out, "{message}")?;
    }
    let value = serde_json::to_value(result)?;
    write_value(out, &value, 0)?;
    Ok(())
}

fn write_value<W: Write>(out: &mut W, value: &Value, indent: usize) -> Result<()> {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(out, "{pad}{key}:")?;
                        write_value(out, value, indent + 1)?;
                    }
                    _ => writeln!(out, "{pad}{key}: {}", scalar(value))?,
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(out, "{pad}-")?;
                        write_value(out, item, indent + 1)?;
                    }
                    _ => writeln!(out, "{pad}- {}", scalar(item))?,
                }
            }
        }
        _ => writeln!(out, "{pad}{}", scalar(value))?,
    }
    Ok(())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Output in JSON format.
fn output_json<W: Write, T: Serialize>(out: &mut W, result: &T, args: &LexbloomArgs) -> Result<()> {
    if args.pretty {
        serde_json::to_writer_pretty(&mut *out, result)?;
    } else {
        serde_json::to_writer(&mut *out, result)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_human_output() {
        let args = LexbloomArgs::parse_from(["lexbloom", "size", "3"]);
        let result = QueryResult {
            corpus: "tiny".to_string(),
            unique_count: 3,
            bit_array_size: 19,
            bits_set: 3,
            matches: vec![WordMatch {
                word: "a".to_string(),
                possibly_present: true,
            }],
        };

        let mut out = Vec::new();
        output_human(&mut out, "Lookup", &result, &args).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Lookup\n"));
        assert!(text.contains("corpus: tiny\n"));
        assert!(text.contains("bit_array_size: 19\n"));
        assert!(text.contains("matches:\n  -\n    possibly_present: true\n    word: a\n"));
    }

    #[test]
    fn test_json_output() {
        let args = LexbloomArgs::parse_from(["lexbloom", "-f", "json", "size", "3"]);
        let result = SizeResult {
            unique_count: 3,
            target_false_positive_rate: 0.05,
            hash_function_count: 4,
            bit_array_size: 19,
            false_positive_rate_estimate: 0.05,
            refined_bit_array_size: None,
        };

        let mut out = Vec::new();
        output_json(&mut out, &result, &args).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["bit_array_size"], 19);
        assert!(value["refined_bit_array_size"].is_null());
    }
}
