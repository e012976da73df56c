//! Side effects a template may perform. Each failure is returned as an
//! [`Error`] that stops the template.

use fs_extra::dir::CopyOptions;
use std::{
    fs::{DirBuilder, OpenOptions},
    io::{Read, Seek, SeekFrom},
    path::Path,
    process::{Command, Stdio},
};

use super::TemplateContext;
use crate::{trace, Error, Result};

/// Exit status and interleaved stdout/stderr of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub output: String,
}

impl TemplateContext {
    pub fn require_arguments<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if self.argument(name)?.is_none() {
                return Err(Error::MissingTemplateArgument(name.to_owned()));
            }
        }

        Ok(())
    }

    pub fn create_directory(&self, path: &str, recursive: bool) -> Result<()> {
        let path = self.resolve(path);
        let action = || format!("create directory '{}'", path.display());

        // A recursive DirBuilder accepts existing directories
        if recursive && path.exists() {
            return Err(Error::io(
                action(),
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "File exists"),
            ));
        }

        DirBuilder::new()
            .recursive(recursive)
            .create(&path)
            .map_err(|e| Error::io(action(), e))
    }

    pub fn create_file(&self, path: &str) -> Result<()> {
        let path = self.resolve(path);

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map(|_| ())
            .map_err(|e| Error::io(format!("create file '{}'", path.display()), e))
    }

    pub fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let path = self.resolve(path);

        std::fs::write(&path, contents)
            .map_err(|e| Error::io(format!("write file '{}'", path.display()), e))
    }

    pub fn copy_item(&self, src: &str, dst: &str) -> Result<()> {
        let from = self.resolve(src);
        let mut to = self.resolve(dst);

        if from.is_dir() {
            if to.exists() {
                return Err(Error::io(
                    format!("copy '{}'", from.display()),
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("'{}' already exists", to.display()),
                    ),
                ));
            }

            let options = CopyOptions {
                copy_inside: true,
                ..CopyOptions::new()
            };

            return fs_extra::dir::copy(&from, &to, &options)
                .map(|_| ())
                .map_err(|source| Error::Copy { from, to, source });
        }

        if to.is_dir() {
            if let Some(file_name) = from.file_name() {
                to.push(file_name);
            }
        }

        std::fs::copy(&from, &to)
            .map(|_| ())
            .map_err(|e| Error::io(format!("copy '{}' to '{}'", from.display(), to.display()), e))
    }

    /// Runs `argv` to completion inside `cwd` (the working directory when
    /// `None`). A non-zero exit is reported through [`CommandOutput::code`],
    /// only a failure to start the process is an error.
    pub fn run_command<S: AsRef<str>>(&self, argv: &[S], cwd: Option<&str>) -> Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or(Error::EmptyCommand)?;
        let program = program.as_ref();
        let cwd = cwd.map_or_else(|| self.working_directory().to_owned(), |c| self.resolve(c));
        let action = || format!("run '{program}'");

        trace!("Running {program} in {}", cwd.display());

        // Both streams share one file so the output keeps its order
        let mut capture = tempfile::tempfile().map_err(|e| Error::io(action(), e))?;
        let stdout = capture.try_clone().map_err(|e| Error::io(action(), e))?;
        let stderr = capture.try_clone().map_err(|e| Error::io(action(), e))?;

        let status = Command::new(program)
            .args(args.iter().map(AsRef::as_ref))
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| Error::io(action(), e))?;

        let mut output = Vec::new();
        capture
            .seek(SeekFrom::Start(0))
            .and_then(|_| capture.read_to_end(&mut output))
            .map_err(|e| Error::io(action(), e))?;

        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            output: String::from_utf8_lossy(&output).into_owned(),
        })
    }
}

/// Joins `path` onto `base` the way the platform does.
#[must_use]
pub fn path_join(base: &str, path: &str) -> String {
    Path::new(base).join(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn context_in(dir: &TempDir) -> TemplateContext {
        TemplateContext::builder()
            .working_directory(dir.path())
            .name("Widget")
            .build()
            .unwrap()
    }

    #[test]
    fn required_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        context.require_arguments(&["name", "output_directory"]).unwrap();
        assert!(matches!(
            context.require_arguments(&["name", "author"]),
            Err(Error::MissingTemplateArgument(arg)) if arg == "author"
        ));
    }

    #[test]
    fn create_directory_fails_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        context.create_directory("project", false).unwrap();
        assert!(dir.path().join("project").is_dir());

        assert!(context.create_directory("project", false).is_err());
        assert!(context.create_directory("project", true).is_err());
    }

    #[test]
    fn create_directory_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        assert!(context.create_directory("a/b/c", false).is_err());
        context.create_directory("a/b/c", true).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn create_file_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        context.create_file("widget.h").unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("widget.h")).unwrap(), "");

        let err = context.create_file("widget.h").unwrap_err();
        assert!(err.to_string().contains("widget.h"));
    }

    #[test]
    fn copy_file_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        context.write_file("notes.txt", "hello").unwrap();
        context.create_directory("docs", false).unwrap();
        context.copy_item("notes.txt", "docs").unwrap();
        context.copy_item("notes.txt", "copy.txt").unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("docs/notes.txt")).unwrap(),
            "hello"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("copy.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        context.create_directory("skel/src", true).unwrap();
        context.write_file("skel/src/main.rs", "fn main() {}").unwrap();
        context.copy_item("skel", "project").unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("project/src/main.rs")).unwrap(),
            "fn main() {}"
        );
        assert!(context.copy_item("skel", "project").is_err());
    }

    #[test]
    fn copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        assert!(context.copy_item("missing", "copy").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn run_command_captures_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        let result = context
            .run_command(&["sh", "-c", "echo out; echo err >&2; exit 3"], None)
            .unwrap();

        assert_eq!(
            result,
            CommandOutput {
                code: 3,
                output: "out\nerr\n".to_owned()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn run_command_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);
        context.create_directory("sub", false).unwrap();

        let result = context.run_command(&["pwd"], Some("sub")).unwrap();
        let reported = std::path::PathBuf::from(result.output.trim());

        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().join("sub").canonicalize().unwrap()
        );
    }

    #[test]
    fn run_command_failures() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);

        assert!(matches!(
            context.run_command::<&str>(&[], None),
            Err(Error::EmptyCommand)
        ));
        assert!(context
            .run_command(&["templateman-no-such-program"], None)
            .is_err());
    }

    #[test]
    fn joins_paths() {
        assert_eq!(path_join("a", "b"), Path::new("a").join("b").display().to_string());
    }
}
