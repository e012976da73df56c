mod manage;
mod run;

use std::{collections::BTreeMap, io::Write};

pub use manage::{install_template, remove_template, write_template_list, Removal};
pub use run::run_template;

use crate::{config::TemplateDirs, prompt::Prompt, Error, Result};

/// What a command works with besides its arguments.
pub struct Session {
    pub dirs: TemplateDirs,
    pub prompt: Box<dyn Prompt>,
}

pub type Handler = fn(&CommandRegistry, &mut Session, &[String]) -> Result<()>;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub about: &'static str,
    pub handler: Handler,
}

/// Commands by keyword. Built once at startup and only read afterwards.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command the binary offers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(Command {
                name: "help",
                usage: "",
                about: "Print this message",
                handler: help,
            })
            .register(Command {
                name: "install",
                usage: "<path> [--force|-f]",
                about: "Copy a template script into the template directory",
                handler: manage::install,
            })
            .register(Command {
                name: "list",
                usage: "",
                about: "List installed templates",
                handler: manage::list,
            })
            .register(Command {
                name: "remove",
                usage: "<name>",
                about: "Delete an installed template after confirmation",
                handler: manage::remove,
            })
            .register(Command {
                name: "run",
                usage: "<template> [--name|-n NAME] [--author|-a AUTHOR] [--output-directory|-o DIR]",
                about: "Run an installed template or a script file",
                handler: run::run,
            });
        registry
    }

    /// # Panics
    ///
    /// If a command with the same name is already registered.
    pub fn register(&mut self, command: Command) -> &mut Self {
        let previous = self.commands.insert(command.name, command);
        assert!(previous.is_none(), "Command registered twice");
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Runs the command called `name` with `args`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] when no command is called `name`, otherwise
    /// whatever the command returns.
    pub fn exec(&self, name: &str, session: &mut Session, args: &[String]) -> Result<()> {
        let command = self
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_owned()))?;

        (command.handler)(self, session, args)
    }

    /// Writes the usage text listing every command.
    ///
    /// # Errors
    ///
    /// Fails if `out` can't be written to.
    pub fn write_usage(&self, mut out: impl Write) -> std::io::Result<()> {
        writeln!(out, "Usage: templateman <COMMAND> [ARGS]...")?;
        writeln!(out)?;
        writeln!(out, "Commands:")?;

        for command in self.iter() {
            writeln!(out, "    {:<10}{}", command.name, command.about)?;
            if !command.usage.is_empty() {
                writeln!(out, "    {:<10}  {} {}", "", command.name, command.usage)?;
            }
        }

        Ok(())
    }
}

fn help(registry: &CommandRegistry, _: &mut Session, _: &[String]) -> Result<()> {
    registry
        .write_usage(std::io::stdout().lock())
        .map_err(|e| Error::io("print help", e))
}
