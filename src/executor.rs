//! Runs template scripts.
//!
//! Templates are [Rhai](https://rhai.rs) scripts. They see the invocation's
//! [`TemplateContext`] as the `template_info` map (plus `working_dir`) and
//! call the helpers registered here for their side effects:
//!
//! ```rhai
//! require_arguments("name");
//!
//! let root = path_join(template_info.output_directory, template_info.name);
//! create_directory(root);
//! write_file(path_join(root, "README.md"), "# " + template_info.name);
//!
//! let git = run_command(["git", "init"], root);
//! if git.code != 0 {
//!     abort(git.output);
//! }
//! ```

use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, Position, Scope, INT};
use std::{fs::File, io::Read, path::Path, sync::Arc};

use crate::{
    context::{path_join, CommandOutput, TemplateContext, ARGUMENTS},
    trace, Error, Result,
};

type ScriptResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// Raised by a failing helper. Stops the script and is reported without
/// being turned into a script fault. Carried by `ErrorTerminated`, which
/// `try`/`catch` in the template can't intercept.
#[derive(Debug, Clone)]
struct Abort(String);

fn script<T>(result: Result<T>) -> ScriptResult<T> {
    result.map_err(|err| {
        EvalAltResult::ErrorTerminated(Dynamic::from(Abort(err.to_string())), Position::NONE)
            .into()
    })
}

fn strings(values: Array) -> Result<Vec<String>> {
    values
        .into_iter()
        .map(|value| {
            value
                .into_string()
                .map_err(|found| Error::Aborted(format!("Expected a string, found {found}")))
        })
        .collect()
}

fn command_map(output: CommandOutput) -> Map {
    let mut map = Map::new();
    map.insert("code".into(), Dynamic::from(INT::from(output.code)));
    map.insert("output".into(), output.output.into());
    map
}

pub struct Executor {
    engine: Engine,
    context: Arc<TemplateContext>,
}

impl Executor {
    #[must_use]
    pub fn new(context: Arc<TemplateContext>) -> Self {
        let mut engine = Engine::new();
        register_helpers(&mut engine, &context);

        Self { engine, context }
    }

    /// Sends what the template prints to `callback` instead of stdout.
    #[must_use]
    pub fn on_print(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.engine.on_print(callback);
        self
    }

    /// Loads the script at `path` and runs it.
    ///
    /// # Errors
    ///
    /// [`Error::TemplateNotFound`] or [`Error::TemplateUnreadable`] when the
    /// file can't be loaded, otherwise whatever [`Executor::run_source`]
    /// returns.
    pub fn run_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::TemplateNotFound(path.to_owned()));
        }

        trace!("Opening {}", path.display());
        let mut file = File::open(path).map_err(|source| Error::TemplateUnreadable {
            path: path.to_owned(),
            source,
        })?;

        let mut code = String::new();
        file.read_to_string(&mut code)
            .map_err(|e| Error::io(format!("read '{}'", path.display()), e))?;

        self.run_source(&path.display().to_string(), &code)
    }

    /// Compiles and runs `code`. `name` identifies the script in messages.
    ///
    /// # Errors
    ///
    /// [`Error::Aborted`] when a helper failed or the template called
    /// `abort`, [`Error::Execution`] for any other fault.
    pub fn run_source(&self, name: &str, code: &str) -> Result<()> {
        let mut ast = self.engine.compile(code).map_err(|err| Error::Execution {
            kind: "SyntaxError",
            message: err.to_string(),
        })?;
        ast.set_source(name);

        trace!("Executing {name}");
        let mut scope = self.scope();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| fault(&err))?;

        trace!("Finished {name}");
        Ok(())
    }

    fn scope(&self) -> Scope<'static> {
        let mut info = Map::new();
        for name in ARGUMENTS {
            let value = match self.context.argument(name) {
                Ok(Some(value)) => value.into(),
                _ => Dynamic::UNIT,
            };
            info.insert(name.into(), value);
        }

        let mut scope = Scope::new();
        scope.push_constant("template_info", info);
        scope.push_constant(
            "working_dir",
            self.context.working_directory().display().to_string(),
        );
        scope
    }
}

fn register_helpers(engine: &mut Engine, context: &Arc<TemplateContext>) {
    let ctx = Arc::clone(context);
    engine.register_fn("require_arguments", move |name: &str| {
        script(ctx.require_arguments(&[name]))
    });
    let ctx = Arc::clone(context);
    engine.register_fn("require_arguments", move |a: &str, b: &str| {
        script(ctx.require_arguments(&[a, b]))
    });
    let ctx = Arc::clone(context);
    engine.register_fn("require_arguments", move |a: &str, b: &str, c: &str| {
        script(ctx.require_arguments(&[a, b, c]))
    });
    let ctx = Arc::clone(context);
    engine.register_fn("require_arguments", move |names: Array| {
        script(strings(names).and_then(|names| ctx.require_arguments(&names)))
    });

    let ctx = Arc::clone(context);
    engine.register_fn("create_directory", move |path: &str| {
        script(ctx.create_directory(path, false))
    });
    let ctx = Arc::clone(context);
    engine.register_fn("create_directory", move |path: &str, recursive: bool| {
        script(ctx.create_directory(path, recursive))
    });

    let ctx = Arc::clone(context);
    engine.register_fn("create_file", move |path: &str| script(ctx.create_file(path)));

    let ctx = Arc::clone(context);
    engine.register_fn("write_file", move |path: &str, contents: &str| {
        script(ctx.write_file(path, contents))
    });

    let ctx = Arc::clone(context);
    engine.register_fn("copy_item", move |src: &str, dst: &str| {
        script(ctx.copy_item(src, dst))
    });

    let ctx = Arc::clone(context);
    engine.register_fn("run_command", move |argv: Array| {
        script(strings(argv).and_then(|argv| ctx.run_command(&argv, None)).map(command_map))
    });
    let ctx = Arc::clone(context);
    engine.register_fn("run_command", move |argv: Array, cwd: &str| {
        script(
            strings(argv)
                .and_then(|argv| ctx.run_command(&argv, Some(cwd)))
                .map(command_map),
        )
    });

    engine.register_fn("path_join", |base: &str, path: &str| path_join(base, path));

    engine.register_fn("abort", |message: &str| -> ScriptResult<()> {
        script(Err(Error::Aborted(message.to_owned())))
    });
}

/// Digs through function-call wrappers down to the error that was raised.
fn root(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => root(inner),
        _ => err,
    }
}

fn fault(err: &EvalAltResult) -> Error {
    let raised = root(err);

    if let EvalAltResult::ErrorTerminated(value, _) = raised {
        if let Some(Abort(message)) = value.clone().try_cast::<Abort>() {
            return Error::Aborted(message);
        }
    }

    if let EvalAltResult::ErrorRuntime(value, _) = raised {
        return Error::Execution {
            kind: "RuntimeError",
            message: value.to_string(),
        };
    }

    let kind = match raised {
        EvalAltResult::ErrorParsing(..) => "SyntaxError",
        EvalAltResult::ErrorVariableNotFound(..) => "VariableNotFound",
        EvalAltResult::ErrorPropertyNotFound(..) => "PropertyNotFound",
        EvalAltResult::ErrorFunctionNotFound(..) => "FunctionNotFound",
        EvalAltResult::ErrorMismatchDataType(..) | EvalAltResult::ErrorMismatchOutputType(..) => {
            "TypeError"
        }
        EvalAltResult::ErrorArithmetic(..) => "ArithmeticError",
        EvalAltResult::ErrorArrayBounds(..)
        | EvalAltResult::ErrorStringBounds(..)
        | EvalAltResult::ErrorIndexingType(..) => "IndexError",
        EvalAltResult::ErrorAssignmentToConstant(..) => "ConstantError",
        _ => "ScriptError",
    };

    Error::Execution {
        kind,
        message: err.to_string(),
    }
}
