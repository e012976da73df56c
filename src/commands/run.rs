use std::sync::Arc;

use super::{CommandRegistry, Session};
use crate::{
    args::{parse_args, OptionSpec},
    config::TemplateDirs,
    context::{TemplateContext, TemplateContextBuilder},
    executor::Executor,
    resolve::{resolve, Resolved},
    trace, Error, Result,
};

fn options() -> OptionSpec<TemplateContextBuilder> {
    OptionSpec::new()
        .option(&["--name", "-n"], 1, |ctx: &mut TemplateContextBuilder, v| {
            ctx.name(v[0].as_str());
        })
        .option(&["--author", "-a"], 1, |ctx: &mut TemplateContextBuilder, v| {
            ctx.author(v[0].as_str());
        })
        .option(
            &["--output-directory", "-o"],
            1,
            |ctx: &mut TemplateContextBuilder, v| {
                ctx.output_directory(v[0].as_str());
            },
        )
}

/// Builds the context from `option_tokens`, then finds and runs the template
/// `identifier` names.
///
/// # Errors
///
/// Usage errors from the options, [`Error::TemplateNotFound`] when nothing
/// matches `identifier`, and whatever the template fails with.
pub fn run_template(dirs: &TemplateDirs, identifier: &str, option_tokens: &[String]) -> Result<()> {
    let mut builder = TemplateContext::builder();
    builder.working_directory(dirs.working_dir());
    parse_args(option_tokens, &options(), &mut builder)?;
    let context = builder.build()?;

    let resolved = resolve(identifier, dirs.working_dir(), dirs.storage());
    match &resolved {
        Resolved::Installed(path) => trace!("Using installed template {}", path.display()),
        Resolved::Local(path) => trace!("Using script {}", path.display()),
    }

    Executor::new(Arc::new(context)).run_file(resolved.path())
}

pub(super) fn run(_: &CommandRegistry, session: &mut Session, args: &[String]) -> Result<()> {
    let (identifier, rest) = args.split_first().ok_or(Error::MissingArgument("run"))?;

    run_template(&session.dirs, identifier, rest)
}
