//! Parsing of raw telemetry lines into validated sample vectors.
//!
//! One line carries one 9-axis sample: accelerometer, gyroscope and
//! magnetometer, three axes each. The parser scans the line for numeric
//! tokens and accepts it only when exactly nine are present, so label text,
//! units and delimiters between the numbers never matter.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Number of components in one sample (three sensors, three axes each).
pub const SAMPLE_WIDTH: usize = 9;

/// Signed decimal token: fraction with or without integer part, or integer.
const TOKEN_PATTERN: &str = r"[-+]?(?:\d+\.\d+|\.\d+|\d+)";

/// Digit-comma-digit sequence rewritten when comma is the decimal separator.
const DECIMAL_COMMA_PATTERN: &str = r"(\d),(\d)";

/// One validated 9-axis sample, components in arrival order:
/// accelerometer x/y/z, gyroscope x/y/z, magnetometer x/y/z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleVector([f64; SAMPLE_WIDTH]);

impl SampleVector {
    /// Create a sample from its nine components.
    pub fn new(components: [f64; SAMPLE_WIDTH]) -> Self {
        Self(components)
    }

    /// All nine components in arrival order.
    pub fn components(&self) -> &[f64; SAMPLE_WIDTH] {
        &self.0
    }

    /// Accelerometer triple (components 0..3).
    pub fn accel(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Gyroscope triple (components 3..6).
    pub fn gyro(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Magnetometer triple (components 6..9).
    pub fn mag(&self) -> [f64; 3] {
        [self.0[6], self.0[7], self.0[8]]
    }
}

/// Why a raw line was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The numeric scan found a token count other than nine.
    MalformedRecord { found: usize },
    /// A scanned token failed floating-point conversion.
    InvalidNumber { token: String },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedRecord { found } => {
                write!(f, "expected {SAMPLE_WIDTH} numeric tokens, found {found}")
            }
            ParseError::InvalidNumber { token } => {
                write!(f, "token {token:?} is not a valid number")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Extracts sample vectors from raw telemetry lines.
///
/// Holds the compiled token pattern, so construct once and reuse. With
/// `decimal_comma` set, every digit-comma-digit sequence is rewritten to a
/// decimal point before the scan (for firmware that formats floats in a
/// comma locale). That rewrite is the only place in the codebase where a
/// decimal separator is translated; the flag assumes comma is not doubling
/// as the sole field separator, which would be ambiguous.
#[derive(Debug, Clone)]
pub struct LineParser {
    tokens: Regex,
    decimal_comma: Option<Regex>,
}

impl LineParser {
    /// Create a parser; `decimal_comma` enables the separator rewrite.
    pub fn new(decimal_comma: bool) -> Self {
        // Both patterns are fixed at compile time.
        let tokens = Regex::new(TOKEN_PATTERN).expect("invalid token pattern");
        let decimal_comma = decimal_comma
            .then(|| Regex::new(DECIMAL_COMMA_PATTERN).expect("invalid separator pattern"));
        Self {
            tokens,
            decimal_comma,
        }
    }

    /// Parse one raw line into a sample vector.
    ///
    /// Scans left to right for numeric tokens; the tokens become the nine
    /// components in scan order. Any other token count is a
    /// [`ParseError::MalformedRecord`].
    pub fn parse(&self, raw: &str) -> Result<SampleVector, ParseError> {
        let scanned: Cow<'_, str> = match &self.decimal_comma {
            Some(pattern) => pattern.replace_all(raw, "${1}.${2}"),
            None => Cow::Borrowed(raw),
        };

        let mut components = [0.0; SAMPLE_WIDTH];
        let mut found = 0;
        for token in self.tokens.find_iter(&scanned) {
            if found < SAMPLE_WIDTH {
                components[found] =
                    token
                        .as_str()
                        .parse::<f64>()
                        .map_err(|_| ParseError::InvalidNumber {
                            token: token.as_str().to_string(),
                        })?;
            }
            found += 1;
        }

        if found != SAMPLE_WIDTH {
            return Err(ParseError::MalformedRecord { found });
        }
        Ok(SampleVector::new(components))
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(false)
    }
}
