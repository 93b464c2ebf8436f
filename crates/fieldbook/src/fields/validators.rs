//! Validators attached to synthesized fields.
//!
//! `InputRequired` and `Optional` are gates: they decide whether a blank
//! submission is an error or simply "no value", and in both cases stop the
//! chain. The remaining validators only ever see a non-blank, successfully
//! coerced value.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::attributes::Value;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone)]
pub enum Validator {
    InputRequired {
        message: Option<String>,
    },
    Optional,
    /// Character count for text, selection count for multi-selects.
    /// `None` bounds are open.
    Length {
        min: Option<usize>,
        max: Option<usize>,
        message: Option<String>,
    },
    NumberRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
        message: Option<String>,
    },
    /// Values before `min` fail. Timestamps compare against midnight of `min`.
    DateRange {
        min: NaiveDate,
    },
    /// Matched at the start of the raw string.
    Regexp(Regex),
}

impl Validator {
    pub fn required() -> Self {
        Validator::InputRequired { message: None }
    }

    pub fn is_gate(&self) -> bool {
        matches!(self, Validator::InputRequired { .. } | Validator::Optional)
    }

    /// Checks a coerced value. Gates always pass here; see [`Validator::is_gate`].
    ///
    /// `raw` is the filtered submitted string, used by pattern matching.
    pub fn check(&self, value: Option<&Value>, raw: Option<&str>) -> Result<(), String> {
        match self {
            Validator::InputRequired { .. } | Validator::Optional => Ok(()),
            Validator::Length { min, max, message } => {
                let length = value.and_then(Value::length).unwrap_or(0);
                let too_short = min.is_some_and(|min| length < min);
                let too_long = max.is_some_and(|max| length > max);
                if too_short || too_long {
                    Err(message
                        .clone()
                        .unwrap_or_else(|| default_length_message(*min, *max)))
                } else {
                    Ok(())
                }
            }
            Validator::NumberRange { min, max, message } => {
                let number = value.and_then(Value::as_decimal);
                let ok = match number {
                    None => false,
                    Some(n) => min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max),
                };
                if ok {
                    Ok(())
                } else {
                    Err(message
                        .clone()
                        .unwrap_or_else(|| default_range_message(*min, *max)))
                }
            }
            Validator::DateRange { min } => {
                let before = match value {
                    Some(Value::Date(date)) => date < min,
                    Some(Value::DateTime(ts)) => *ts < min.and_time(chrono::NaiveTime::MIN),
                    _ => false,
                };
                if before {
                    Err(format!("Date must be greater than or equal to {}.", min))
                } else {
                    Ok(())
                }
            }
            Validator::Regexp(regex) => {
                if regex.is_match(raw.unwrap_or("")) {
                    Ok(())
                } else {
                    Err("Invalid input.".to_string())
                }
            }
        }
    }
}

/// Compiles `pattern` so that it must match from the start of the input.
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}

fn default_length_message(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), None) => format!("Field must be at least {} characters long.", min),
        (None, Some(max)) => format!("Field cannot be longer than {} characters.", max),
        (Some(min), Some(max)) => {
            format!("Field must be between {} and {} characters long.", min, max)
        }
        (None, None) => "Invalid length.".to_string(),
    }
}

fn default_range_message(min: Option<Decimal>, max: Option<Decimal>) -> String {
    match (min, max) {
        (Some(min), None) => format!("Number must be at least {}.", min),
        (None, Some(max)) => format!("Number must be at most {}.", max),
        (Some(min), Some(max)) => format!("Number must be between {} and {}.", min, max),
        (None, None) => "Not a valid number.".to_string(),
    }
}
