use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use templateman::{
    abort::Running,
    args::Args,
    commands::{CommandRegistry, Session},
    config::TemplateDirs,
    prompt::Terminal,
    trace,
};

fn app(args: &Args, running: &Running) -> Result<()> {
    let registry = CommandRegistry::builtin();
    running.start();

    let Some(ref command) = args.command else {
        registry.write_usage(std::io::stdout().lock())?;
        return Ok(());
    };

    trace!("Dispatching '{command}' with {:?}", args.args);

    let mut session = Session {
        dirs: TemplateDirs::default_paths()?,
        prompt: Box::new(Terminal),
    };

    registry.exec(command, &mut session, &args.args)?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let running = Running::default();

    match app(&args, &running) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            running.abort(e);
            ExitCode::FAILURE
        }
    }
}
