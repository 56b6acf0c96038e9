//! Form input validation.
//!
//! Validators never fail: an empty string means the value is valid, anything
//! else is the message to show next to the input.

use configs::{ValidationConfig, DEFAULT_MAX_CHAR};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_FLOAT_MAX: f64 = 9_999_999_999.0;
pub const FLOAT_MESSAGE: &str = "Not a float (e.g. 1.23) or value to small/big";

const STRICT_CHARS: &str = "a-zA-Z0-9";
const EXTRA_CHARS: &str = ":,.-_";

static STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]*$").expect("strict pattern"));
static NO_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9:,.\-_]*$").expect("no-space pattern"));
static WITH_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9:,.\-_ ]*$").expect("with-space pattern"));
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?$").expect("float pattern")
});

/// Rules for [`Validator::alnum`]. `min`/`max` of `None` or `0` use the
/// defaults (0 and the configured `max_char`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlnumRules {
    /// Only ASCII letters and digits.
    pub strict: bool,
    /// Allow `:,.-_` but no space.
    pub no_space: bool,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl AlnumRules {
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    max_char: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self { max_char: DEFAULT_MAX_CHAR }
    }
}

impl Validator {
    pub fn new(cfg: &ValidationConfig) -> Self {
        Self { max_char: cfg.max_char }
    }

    pub fn alnum(&self, value: &str, rules: &AlnumRules) -> String {
        let (pattern, message) = if rules.strict {
            (&*STRICT, format!("Allowed characters: {STRICT_CHARS}"))
        } else if rules.no_space {
            (&*NO_SPACE, format!("Allowed characters: {STRICT_CHARS}{EXTRA_CHARS}"))
        } else {
            (&*WITH_SPACE, format!("Allowed characters: Space and {STRICT_CHARS}{EXTRA_CHARS} "))
        };
        if !pattern.is_match(value) {
            return message;
        }
        let len = value.chars().count();
        let min = rules.min.unwrap_or(0);
        if len < min {
            return format!("Min length: {min} characters");
        }
        let max = rules.max.filter(|m| *m > 0).unwrap_or(self.max_char);
        if len > max {
            return format!("Max length: {max} characters");
        }
        String::new()
    }

    /// Non-negative float no larger than `max` (default 9 999 999 999).
    pub fn float(&self, value: &str, max: Option<f64>) -> String {
        let max = max.filter(|m| *m != 0.0).unwrap_or(DEFAULT_FLOAT_MAX);
        if is_float_in_range(value, 0.0, max) {
            String::new()
        } else {
            FLOAT_MESSAGE.to_string()
        }
    }
}

fn is_float_in_range(value: &str, min: f64, max: f64) -> bool {
    if matches!(value, "" | "." | "-" | "+") || !FLOAT.is_match(value) {
        return false;
    }
    match value.parse::<f64>() {
        Ok(v) => v >= min && v <= max,
        Err(_) => false,
    }
}

/// [`Validator::alnum`] with the default `max_char`.
pub fn validate_alnum(value: &str, rules: &AlnumRules) -> String {
    Validator::default().alnum(value, rules)
}

/// [`Validator::float`] with the default limits.
pub fn validate_float(value: &str, max: Option<f64>) -> String {
    Validator::default().float(value, max)
}
