use derive_builder::Builder;
use directories::UserDirs;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::{trace, Error, Result};

/// Environment variable overriding where installed templates live.
pub const TEMPLATE_DIRECTORY_ENV_VAR: &str = "PY_TEMPLATES_DIR";

/// Name of the storage directory inside the user's home.
pub const DEFAULT_TEMPLATE_DIRECTORY: &str = ".py-templates";

#[derive(Builder, Debug, Clone)]
pub struct TemplateDirs {
    #[builder(setter(into))]
    working_dir: PathBuf,

    #[builder(default, setter(into, strip_option))]
    user_home: Option<PathBuf>,

    #[builder(default, setter(into, strip_option))]
    storage: Option<PathBuf>,
}

/// An installed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub path: PathBuf,
    pub name: String,
}

impl TemplateDirs {
    /// Create a new [`TemplateDirs`] builder
    #[must_use]
    pub fn builder() -> TemplateDirsBuilder {
        TemplateDirsBuilder::default()
    }

    /// Resolves the directories from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the current working directory is invalid.
    /// Not finding the user's home is not an error, it only leaves the
    /// storage directory unresolved.
    pub fn default_paths() -> anyhow::Result<Self> {
        let working_dir = std::env::current_dir()?;
        let user_home = Self::get_user_home();
        let storage = Self::storage_dir_from(
            std::env::var_os(TEMPLATE_DIRECTORY_ENV_VAR),
            user_home.as_deref(),
            &working_dir,
        );

        trace!("Working directory: {}", working_dir.display());
        trace!(
            "Template directory: {}",
            storage
                .as_deref()
                .map_or_else(|| "unresolved".to_owned(), |s| s.display().to_string())
        );

        Ok(Self {
            working_dir,
            user_home,
            storage,
        })
    }

    /// Returns the path for the user home `~/`, if it can be determined.
    #[must_use]
    pub fn get_user_home() -> Option<PathBuf> {
        UserDirs::new().map(|dirs| dirs.home_dir().to_owned())
    }

    /// Where installed templates live, in order:
    /// - `$PY_TEMPLATES_DIR` (relative to the working directory)
    /// - `~/.py-templates`
    #[must_use]
    pub fn storage_dir_from(
        env: Option<OsString>,
        home: Option<&Path>,
        working_dir: &Path,
    ) -> Option<PathBuf> {
        env.filter(|value| !value.is_empty())
            .map(|value| working_dir.join(value))
            .or_else(|| home.map(|home| home.join(DEFAULT_TEMPLATE_DIRECTORY)))
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The storage directory, if it could be resolved. It may not exist yet.
    #[must_use]
    pub fn storage(&self) -> Option<&Path> {
        self.storage.as_deref()
    }

    /// # Errors
    ///
    /// [`Error::Unresolved`] when there is no storage directory.
    pub fn require_storage(&self) -> Result<&Path> {
        self.storage().ok_or(Error::Unresolved)
    }

    /// Creates the storage directory if it is missing and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::Unresolved`] when there is no storage directory, or an IO
    /// error while creating it.
    pub fn create_storage_dir(&self) -> Result<&Path> {
        let storage = self.require_storage()?;

        if !storage.is_dir() {
            trace!("Creating template directory {}", storage.display());
            fs_extra::dir::create_all(storage, false).map_err(|source| Error::CreateStorage {
                path: storage.to_owned(),
                source,
            })?;
        }

        Ok(storage)
    }

    /// The path an installed template named `name` has, whether or not it
    /// exists.
    ///
    /// # Errors
    ///
    /// [`Error::Unresolved`] when there is no storage directory.
    pub fn template_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.require_storage()?.join(name))
    }

    /// Get a [`Vec`] of all templates inside the storage directory, sorted
    /// by name. Only files count as templates.
    ///
    /// # Errors
    ///
    /// This function will return an error if the storage directory is
    /// unresolved or can't be read.
    pub fn installed_templates(&self) -> Result<Vec<Template>> {
        let storage = self.require_storage()?;
        let mut res = Vec::new();

        for entry in WalkDir::new(storage)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| Error::Walk {
                path: storage.to_owned(),
                source,
            })?;

            if entry.file_type().is_file() {
                res.push(Template {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.into_path(),
                });
            }
        }

        Ok(res)
    }

    /// Shows `path` with the user's home collapsed to `~`.
    #[must_use]
    pub fn display_path(&self, path: &Path) -> String {
        match self.user_home.as_deref().map(|home| path.strip_prefix(home)) {
            Some(Ok(rest)) => Path::new("~").join(rest).display().to_string(),
            _ => path.display().to_string(),
        }
    }

    /// Removes a file, symlink or whole directory.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while inspecting or removing `path`.
    pub fn remove_path(path: &Path) -> Result<()> {
        let action = || format!("remove '{}'", path.display());
        let file_type = path
            .symlink_metadata()
            .map_err(|e| Error::io(action(), e))?
            .file_type();

        if file_type.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
        .map_err(|e| Error::io(action(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn storage_prefers_environment() {
        let storage = TemplateDirs::storage_dir_from(
            Some("templates".into()),
            Some(Path::new("/home/user")),
            Path::new("/work"),
        );

        assert_eq!(storage, Some(PathBuf::from("/work/templates")));
    }

    #[test]
    fn storage_falls_back_to_home() {
        let home = Some(Path::new("/home/user"));

        assert_eq!(
            TemplateDirs::storage_dir_from(None, home, Path::new("/work")),
            Some(PathBuf::from("/home/user/.py-templates"))
        );
        assert_eq!(
            TemplateDirs::storage_dir_from(Some(OsString::new()), home, Path::new("/work")),
            Some(PathBuf::from("/home/user/.py-templates"))
        );
    }

    #[test]
    fn unresolved_home_is_not_an_error() {
        assert_eq!(
            TemplateDirs::storage_dir_from(None, None, Path::new("/work")),
            None
        );

        let dirs = TemplateDirs::builder().working_dir("/work").build().unwrap();
        assert!(dirs.storage().is_none());
        assert!(matches!(dirs.require_storage(), Err(Error::Unresolved)));
        assert!(matches!(dirs.installed_templates(), Err(Error::Unresolved)));
    }

    #[test]
    fn lists_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = TemplateDirs::builder()
            .working_dir(dir.path())
            .storage(dir.path().join("store"))
            .build()
            .unwrap();

        let storage = dirs.create_storage_dir().unwrap().to_owned();
        std::fs::write(storage.join("zeta"), "").unwrap();
        std::fs::write(storage.join("alpha"), "").unwrap();
        std::fs::create_dir(storage.join("nested")).unwrap();

        let names = dirs
            .installed_templates()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect::<Vec<_>>();

        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn storage_errors_keep_their_cause() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();

        let dirs = TemplateDirs::builder()
            .working_dir(dir.path())
            .storage(blocked.clone())
            .build()
            .unwrap();
        assert!(matches!(
            dirs.create_storage_dir(),
            Err(Error::CreateStorage { ref path, .. }) if *path == blocked
        ));

        let dirs = TemplateDirs::builder()
            .working_dir(dir.path())
            .storage(dir.path().join("missing"))
            .build()
            .unwrap();
        match dirs.installed_templates() {
            Err(Error::Walk { source, .. }) => assert_eq!(
                source.io_error().map(std::io::Error::kind),
                Some(std::io::ErrorKind::NotFound)
            ),
            other => panic!("expected a walk error, got {other:?}"),
        }
    }

    #[test]
    fn collapses_home() {
        let dirs = TemplateDirs::builder()
            .working_dir("/work")
            .user_home("/home/user")
            .build()
            .unwrap();

        assert_eq!(
            dirs.display_path(Path::new("/home/user/.py-templates")),
            Path::new("~").join(".py-templates").display().to_string()
        );
        assert_eq!(dirs.display_path(Path::new("/srv/templates")), "/srv/templates");
    }

    #[test]
    fn removes_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        let tree = dir.path().join("tree");
        std::fs::write(&file, "").unwrap();
        std::fs::create_dir_all(tree.join("inner")).unwrap();

        TemplateDirs::remove_path(&file).unwrap();
        TemplateDirs::remove_path(&tree).unwrap();

        assert!(!file.exists());
        assert!(!tree.exists());
        assert!(TemplateDirs::remove_path(&file).is_err());
    }
}
