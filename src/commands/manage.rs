use std::{io::Write, path::Path};

use super::{CommandRegistry, Session};
use crate::{
    args::{parse_args, OptionSpec},
    config::TemplateDirs,
    info,
    prompt::Prompt,
    trace, warn, Error, Result,
};

/// Copies the script at `source` into storage, named after its file stem.
/// Returns the installed name.
///
/// # Errors
///
/// Fails if `source` is missing or not a file, if storage can't be
/// resolved or created, or if a template of the same name exists and
/// `overwrite` is `false`.
pub fn install_template(dirs: &TemplateDirs, source: &str, overwrite: bool) -> Result<String> {
    let storage = dirs.create_storage_dir()?;
    let source = dirs.working_dir().join(source);

    if !source.exists() {
        return Err(Error::SourceMissing(source));
    }
    if !source.is_file() {
        return Err(Error::SourceNotFile(source));
    }

    let name = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| Error::SourceNotFile(source.clone()))?;
    let target = storage.join(&name);

    if target.exists() && !overwrite {
        return Err(Error::AlreadyInstalled(name));
    }

    trace!("Copying {} to {}", source.display(), target.display());
    std::fs::copy(&source, &target)
        .map_err(|e| Error::io(format!("install '{}'", source.display()), e))?;

    Ok(name)
}

/// Writes the storage directory header followed by one line per installed
/// template.
///
/// # Errors
///
/// Fails if storage can't be resolved, created or read, or `out` can't be
/// written to.
pub fn write_template_list(dirs: &TemplateDirs, mut out: impl Write) -> Result<()> {
    let storage = dirs.create_storage_dir()?;
    let templates = dirs.installed_templates()?;
    let write_err = |e: std::io::Error| Error::io("print templates", e);

    writeln!(
        out,
        "Installed templates (at '{}'):",
        dirs.display_path(storage)
    )
    .map_err(write_err)?;

    for template in templates {
        writeln!(out, "    {}", template.name).map_err(write_err)?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Kept,
}

/// Deletes the installed template `name` if `prompt` confirms it.
///
/// # Errors
///
/// Fails if storage can't be resolved, `name` isn't installed, the prompt
/// fails or the file can't be removed.
pub fn remove_template(dirs: &TemplateDirs, name: &str, prompt: &mut dyn Prompt) -> Result<Removal> {
    let path = dirs.template_path(name)?;

    if !is_template_name(name) || !path.is_file() {
        return Err(Error::NotInstalled(name.to_owned()));
    }

    if !prompt.confirm(&format!("Remove template '{name}'? [y/N]"))? {
        return Ok(Removal::Kept);
    }

    TemplateDirs::remove_path(&path)?;
    Ok(Removal::Removed)
}

fn is_template_name(name: &str) -> bool {
    Path::new(name).file_name().is_some_and(|file| file == name)
}

pub(super) fn install(_: &CommandRegistry, session: &mut Session, args: &[String]) -> Result<()> {
    let (source, rest) = args.split_first().ok_or(Error::MissingArgument("install"))?;

    let options = OptionSpec::new().option(&["--force", "-f"], 0, |force: &mut bool, _| {
        *force = true;
    });
    let mut overwrite = false;
    parse_args(rest, &options, &mut overwrite)?;

    let name = install_template(&session.dirs, source, overwrite)?;
    info!("Installed template '{name}'");

    Ok(())
}

pub(super) fn list(_: &CommandRegistry, session: &mut Session, _: &[String]) -> Result<()> {
    write_template_list(&session.dirs, std::io::stdout().lock())
}

pub(super) fn remove(_: &CommandRegistry, session: &mut Session, args: &[String]) -> Result<()> {
    let (name, rest) = args.split_first().ok_or(Error::MissingArgument("remove"))?;
    parse_args(rest, &OptionSpec::new(), &mut ())?;

    match remove_template(&session.dirs, name, session.prompt.as_mut())? {
        Removal::Removed => info!("Removed template '{name}'"),
        Removal::Kept => warn!("Template '{name}' was not removed"),
    }

    Ok(())
}
