pub use clap::Parser;

use std::{collections::HashMap, rc::Rc};

use crate::{Error, Result};

#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Args {
    /// Command to execute, see `templateman help` for the list of commands
    pub command: Option<String>,

    /// Arguments and options passed to the command
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

type Handler<T> = Rc<dyn Fn(&mut T, &[String])>;

/// Options a command accepts: each flag consumes a fixed number of the
/// tokens that follow it and hands them to its handler.
pub struct OptionSpec<T> {
    options: HashMap<String, (usize, Handler<T>)>,
}

impl<T> Default for OptionSpec<T> {
    fn default() -> Self {
        Self {
            options: HashMap::new(),
        }
    }
}

impl<T> OptionSpec<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under every alias in `flags`.
    #[must_use]
    pub fn option(
        mut self,
        flags: &[&str],
        arity: usize,
        handler: impl Fn(&mut T, &[String]) + 'static,
    ) -> Self {
        let handler: Handler<T> = Rc::new(handler);
        for flag in flags {
            self.options
                .insert((*flag).to_owned(), (arity, Rc::clone(&handler)));
        }
        self
    }
}

/// Applies the options in `tokens` to `target`.
///
/// The whole list is checked before any handler runs, so on error `target`
/// is left as it was.
///
/// # Errors
///
/// [`Error::UnknownOption`] if a token where a flag is expected is not in
/// `spec`, [`Error::MissingOptionValues`] if a flag is followed by fewer
/// tokens than its arity.
pub fn parse_args<T>(tokens: &[String], spec: &OptionSpec<T>, target: &mut T) -> Result<()> {
    let mut calls = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let flag = &tokens[i];
        let (arity, handler) = spec
            .options
            .get(flag)
            .ok_or_else(|| Error::UnknownOption(flag.clone()))?;

        let start = i + 1;
        let end = start + arity;
        if tokens.len() < end {
            return Err(Error::MissingOptionValues(flag.clone()));
        }

        calls.push((handler, &tokens[start..end]));
        i = end;
    }

    for (handler, values) in calls {
        handler(target, values);
    }

    Ok(())
}
