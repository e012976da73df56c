use std::path::{Component, Path, PathBuf};

/// Where a template identifier pointed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A template from the storage directory.
    Installed(PathBuf),
    /// A path relative to the working directory. It may not exist.
    Local(PathBuf),
}

impl Resolved {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Resolved::Installed(path) | Resolved::Local(path) => path,
        }
    }
}

/// Maps `identifier` to the script it names.
///
/// Identifiers with an extension are always paths. A bare name without one
/// refers to an installed template when `storage` holds a file with that
/// exact name, and falls back to a path otherwise.
#[must_use]
pub fn resolve(identifier: &str, working_dir: &Path, storage: Option<&Path>) -> Resolved {
    let as_path = Path::new(identifier);
    let local = Resolved::Local(working_dir.join(as_path));

    if as_path.extension().is_some() {
        return local;
    }

    let is_bare_name = matches!(
        as_path.components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    );

    match storage.map(|storage| storage.join(as_path)) {
        Some(installed) if is_bare_name && installed.is_file() => Resolved::Installed(installed),
        _ => local,
    }
}
