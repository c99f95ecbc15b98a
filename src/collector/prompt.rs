use async_trait::async_trait;
use std::io::{self, BufRead, Write};

use super::{Collector, validate};
use crate::error::ScreenError;
use crate::state::LoanInputs;

/// Asks for each number at the terminal, re-prompting until it parses.
pub struct PromptCollector;

impl PromptCollector {
    fn read_line(prompt: &str) -> Result<String, ScreenError> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Err(ScreenError::InvalidInput(
                "input closed before both values were given".to_string(),
            ));
        }
        Ok(input.trim().to_string())
    }

    fn ask(prompt: &str) -> Result<f64, ScreenError> {
        loop {
            let line = Self::read_line(prompt)?;
            match parse_amount(&line) {
                Some(value) => return Ok(value),
                None => println!("  please enter a number, e.g. 5000 or $5,000.00"),
            }
        }
    }
}

/// Parse a single amount, tolerating `$`, thousands separators and spaces.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    super::text::parse_amount(&cleaned)
}

#[async_trait]
impl Collector for PromptCollector {
    async fn collect(&self) -> Result<LoanInputs, ScreenError> {
        println!("Hello! Let's check where you stand.");
        let (income, debt) = tokio::task::spawn_blocking(|| {
            let income = Self::ask("Total gross monthly income: ")?;
            let debt = Self::ask("Total monthly debt payments: ")?;
            Ok::<_, ScreenError>((income, debt))
        })
        .await
        .map_err(|e| ScreenError::Io(io::Error::other(e)))??;
        validate(income, debt)
    }
}
