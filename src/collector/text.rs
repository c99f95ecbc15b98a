use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::{Collector, validate};
use crate::error::ScreenError;
use crate::state::LoanInputs;

/// A number-like run (digits, possibly glued to letters, separators or a
/// leading sign/currency) or a word. Candidates are checked against
/// [`NUMBER`] afterwards so that `5k` or `1e3` are rejected, not truncated.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<num>-?\$?[0-9.][0-9A-Za-z.,]*)|(?P<word>[A-Za-z][A-Za-z0-9]*)")
        .expect("token pattern is valid")
});

/// A whole amount: optional sign and `$`, plain or comma-grouped digits,
/// optional decimals.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?\$?((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)$")
        .expect("number pattern is valid")
});

/// Reads income and debt out of a line of text.
///
/// Accepts labeled forms (`income=5000 debt=1000`, `debt: 1000, income: 5000`)
/// and positional ones (`5000 1000`, `$5,000 and $1,200.50`). Labels win;
/// without them the text must hold exactly two numbers, income then debt.
pub struct TextCollector {
    text: String,
}

impl TextCollector {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Collector for TextCollector {
    async fn collect(&self) -> Result<LoanInputs, ScreenError> {
        parse_inputs(&self.text)
    }
}

/// A number found in the text and the label word before it, if any.
#[derive(Debug, PartialEq)]
struct Token {
    label: Option<&'static str>,
    value: f64,
}

pub fn parse_inputs(text: &str) -> Result<LoanInputs, ScreenError> {
    let tokens = tokenize(text)?;

    let labeled = |name: &str| -> Vec<f64> {
        tokens
            .iter()
            .filter(|t| t.label == Some(name))
            .map(|t| t.value)
            .collect()
    };
    let incomes = labeled("income");
    let debts = labeled("debt");
    let unlabeled: Vec<f64> = tokens
        .iter()
        .filter(|t| t.label.is_none())
        .map(|t| t.value)
        .collect();

    for (name, values) in [("income", &incomes), ("debt", &debts)] {
        if values.len() > 1 {
            return Err(ScreenError::InvalidInput(format!(
                "{name} given more than once"
            )));
        }
    }

    let (income, debt) = match (incomes.first(), debts.first()) {
        (Some(&i), Some(&d)) => (i, d),
        (Some(&i), None) => (i, single(&unlabeled, "debt")?),
        (None, Some(&d)) => (single(&unlabeled, "income")?, d),
        (None, None) => match unlabeled.as_slice() {
            [] => return Err(missing("income")),
            [_] => return Err(missing("debt")),
            [i, d] => (*i, *d),
            more => {
                return Err(ScreenError::InvalidInput(format!(
                    "expected two numbers (income, debt), found {}",
                    more.len()
                )));
            }
        },
    };

    validate(income, debt)
}

fn missing(what: &str) -> ScreenError {
    ScreenError::InvalidInput(format!("no {what} value found"))
}

/// The one unlabeled number that fills the remaining slot.
fn single(unlabeled: &[f64], what: &str) -> Result<f64, ScreenError> {
    match unlabeled {
        [] => Err(missing(what)),
        [v] => Ok(*v),
        _ => Err(ScreenError::InvalidInput(format!(
            "cannot tell which number is the {what}; label it, e.g. {what}=1000"
        ))),
    }
}

/// Split text into numbers, remembering the closest preceding label word.
fn tokenize(text: &str) -> Result<Vec<Token>, ScreenError> {
    let mut tokens = Vec::new();
    let mut label: Option<&'static str> = None;

    for caps in TOKEN.captures_iter(text) {
        if let Some(word) = caps.name("word") {
            let word = word.as_str();
            if word.chars().any(|c| c.is_ascii_digit()) {
                return Err(malformed(word));
            }
            label = canonical_label(&word.to_lowercase()).or(label);
            continue;
        }

        let Some(num) = caps.name("num") else {
            continue;
        };
        // Sentence punctuation after a number is not part of it.
        let candidate = num.as_str().trim_end_matches(['.', ',']);
        if !candidate.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }

        for value in parse_amounts(candidate)? {
            tokens.push(Token {
                label: label.take(),
                value,
            });
        }
    }

    Ok(tokens)
}

/// One amount, or a comma-separated list of them (`5000,1000`).
fn parse_amounts(candidate: &str) -> Result<Vec<f64>, ScreenError> {
    if let Some(value) = parse_amount(candidate) {
        return Ok(vec![value]);
    }
    if candidate.contains(',') {
        return candidate
            .split(',')
            .map(|part| parse_amount(part).ok_or_else(|| malformed(candidate)))
            .collect();
    }
    Err(malformed(candidate))
}

/// A single well-formed amount, or `None`.
pub(super) fn parse_amount(text: &str) -> Option<f64> {
    let caps = NUMBER.captures(text)?;
    let digits = caps.get(2)?.as_str().replace(',', "");
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits
    };
    let value: f64 = digits.parse().ok()?;
    Some(if caps.get(1).is_some() { -value } else { value })
}

fn malformed(text: &str) -> ScreenError {
    ScreenError::InvalidInput(format!("malformed number: {text:?}"))
}

fn canonical_label(word: &str) -> Option<&'static str> {
    match word {
        "income" | "salary" | "earn" | "earnings" | "make" => Some("income"),
        "debt" | "debts" | "payments" | "owe" => Some("debt"),
        _ => None,
    }
}
