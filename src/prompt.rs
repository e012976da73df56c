use std::io::{BufRead, IsTerminal};

use crate::{Error, Result};

/// Source of answers to yes/no questions.
pub trait Prompt {
    fn ask(&mut self, message: &str) -> Result<String>;

    /// Only an answer of `Y` or `y` confirms.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(matches!(self.ask(message)?.trim(), "Y" | "y"))
    }
}

/// Asks through `inquire` when attached to a terminal, otherwise reads one
/// line from stdin.
#[derive(Debug, Default)]
pub struct Terminal;

impl Prompt for Terminal {
    fn ask(&mut self, message: &str) -> Result<String> {
        if std::io::stdin().is_terminal() {
            return Ok(inquire::Text::new(message).prompt()?);
        }

        println!("{message}");
        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| Error::io("read answer", e))?;

        Ok(answer)
    }
}
