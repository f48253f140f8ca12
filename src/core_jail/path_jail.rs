use crate::core_error::JailError;
use log::{trace, warn};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Confines every path a session touches to a fixed root directory.
///
/// The root is canonicalized once, when the jail is built, so every later
/// comparison is made between canonical absolute paths.
#[derive(Debug, Clone)]
pub struct PathJail {
    root: PathBuf,
}

impl PathJail {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, JailError> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|source| JailError::Resolve {
            path: root.to_path_buf(),
            source,
        })?;

        if !canonical.is_dir() {
            return Err(JailError::NotADirectory(canonical));
        }

        Ok(Self { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `candidate` against `base` and rejects anything outside the root.
    pub fn resolve_within(&self, base: &Path, candidate: &str) -> Result<PathBuf, JailError> {
        let resolved = resolve(base, candidate)?;
        if !contains(&self.root, &resolved) {
            warn!(
                "Rejected path outside of root {:?}: {:?}",
                self.root, resolved
            );
            return Err(JailError::OutsideRoot(resolved));
        }
        Ok(resolved)
    }

    /// Like [`resolve_within`](Self::resolve_within), and the target must be an existing directory.
    pub fn resolve_dir(&self, base: &Path, candidate: &str) -> Result<PathBuf, JailError> {
        let resolved = self.resolve_within(base, candidate)?;
        match resolved.metadata() {
            Ok(meta) if meta.is_dir() => Ok(resolved),
            Ok(_) => Err(JailError::NotADirectory(resolved)),
            Err(_) => Err(JailError::NotFound(resolved)),
        }
    }

    /// Like [`resolve_within`](Self::resolve_within), and the target must be an existing regular file.
    pub fn resolve_file(&self, base: &Path, candidate: &str) -> Result<PathBuf, JailError> {
        let resolved = self.resolve_within(base, candidate)?;
        match resolved.metadata() {
            Ok(meta) if meta.is_file() => Ok(resolved),
            Ok(_) => Err(JailError::NotAFile(resolved)),
            Err(_) => Err(JailError::NotFound(resolved)),
        }
    }

    /// Parent of `dir`, refused when it would leave the root.
    pub fn parent_of(&self, dir: &Path) -> Result<PathBuf, JailError> {
        if dir == self.root {
            return Err(JailError::OutsideRoot(
                dir.parent().unwrap_or(dir).to_path_buf(),
            ));
        }
        self.resolve_dir(dir, "..")
    }
}

/// Joins `candidate` onto `base` and turns the result into a canonical absolute path.
///
/// `.` and `..` are folded lexically first, then the longest prefix that
/// exists on disk is canonicalized (following symlinks) and the remaining,
/// not yet existing components are appended back. An absolute `candidate`
/// replaces `base`.
pub fn resolve(base: &Path, candidate: &str) -> Result<PathBuf, JailError> {
    let joined = base.join(candidate);
    let normalized = normalize(&joined);
    trace!("Resolving {:?} -> {:?}", joined, normalized);
    canonicalize_existing(&normalized)
}

/// True when `path` is `root` itself or lies below it.
///
/// Comparison is per path component, so `/srv2` is not inside `/srv`.
pub fn contains(root: &Path, path: &Path) -> bool {
    path == root || path.starts_with(root)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping "/" is a no-op, so ".." never climbs above the filesystem root.
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn canonicalize_existing(path: &Path) -> Result<PathBuf, JailError> {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut canonical) => {
                for part in missing.iter().rev() {
                    canonical.push(part);
                }
                return Ok(canonical);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => match existing.file_name() {
                // A dangling symlink would be followed by a later create.
                Some(_) if existing.symlink_metadata().is_ok() => {
                    return Err(JailError::Resolve {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
                Some(name) => {
                    missing.push(name.to_os_string());
                    existing.pop();
                }
                None => {
                    return Err(JailError::Resolve {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            },
            Err(source) => {
                return Err(JailError::Resolve {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathJail) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("root/sub/deeper")).unwrap();
        fs::create_dir_all(tmp.path().join("root2")).unwrap();
        fs::write(tmp.path().join("root/file.txt"), b"hello").unwrap();
        let jail = PathJail::new(tmp.path().join("root")).unwrap();
        (tmp, jail)
    }

    #[test]
    fn test_contains_requires_component_boundary() {
        assert!(contains(Path::new("/srv"), Path::new("/srv")));
        assert!(contains(Path::new("/srv"), Path::new("/srv/a/b")));
        assert!(!contains(Path::new("/srv"), Path::new("/srv2")));
        assert!(!contains(Path::new("/srv"), Path::new("/srv2/a")));
        assert!(!contains(Path::new("/srv"), Path::new("/")));
    }

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_resolve_subdirectory() {
        let (_tmp, jail) = setup();
        let resolved = jail.resolve_dir(jail.root(), "sub/deeper").unwrap();
        assert_eq!(resolved, jail.root().join("sub").join("deeper"));
    }

    #[test]
    fn test_resolve_rejects_parent_of_root() {
        let (_tmp, jail) = setup();
        let err = jail.resolve_within(jail.root(), "..").unwrap_err();
        assert!(matches!(err, JailError::OutsideRoot(_)));
    }

    #[test]
    fn test_resolve_rejects_sibling_with_shared_prefix() {
        let (_tmp, jail) = setup();
        let err = jail.resolve_within(jail.root(), "../root2").unwrap_err();
        assert!(matches!(err, JailError::OutsideRoot(_)));
    }

    #[test]
    fn test_resolve_rejects_absolute_escape() {
        let (_tmp, jail) = setup();
        let err = jail.resolve_within(jail.root(), "/").unwrap_err();
        assert!(matches!(err, JailError::OutsideRoot(_)));
    }

    #[test]
    fn test_resolve_accepts_absolute_inside_root() {
        let (_tmp, jail) = setup();
        let target = jail.root().join("sub");
        let resolved = jail
            .resolve_dir(jail.root(), target.to_str().unwrap())
            .unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn test_resolve_keeps_missing_tail() {
        let (_tmp, jail) = setup();
        let resolved = jail.resolve_within(jail.root(), "sub/new.bin").unwrap();
        assert_eq!(resolved, jail.root().join("sub").join("new.bin"));
    }

    #[test]
    fn test_resolve_dir_rejects_file() {
        let (_tmp, jail) = setup();
        let err = jail.resolve_dir(jail.root(), "file.txt").unwrap_err();
        assert!(matches!(err, JailError::NotADirectory(_)));
    }

    #[test]
    fn test_resolve_file_rejects_missing() {
        let (_tmp, jail) = setup();
        let err = jail.resolve_file(jail.root(), "nope.txt").unwrap_err();
        assert!(matches!(err, JailError::NotFound(_)));
    }

    #[test]
    fn test_parent_of_root_is_refused() {
        let (_tmp, jail) = setup();
        assert!(jail.parent_of(jail.root()).is_err());

        let sub = jail.root().join("sub");
        assert_eq!(jail.parent_of(&sub).unwrap(), jail.root());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_rejected() {
        let (tmp, jail) = setup();
        std::os::unix::fs::symlink(tmp.path().join("root2"), jail.root().join("escape")).unwrap();
        let err = jail.resolve_dir(jail.root(), "escape").unwrap_err();
        assert!(matches!(err, JailError::OutsideRoot(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_rejected() {
        let (tmp, jail) = setup();
        std::os::unix::fs::symlink(tmp.path().join("outside.bin"), jail.root().join("trap")).unwrap();
        assert!(jail.resolve_within(jail.root(), "trap").is_err());
        assert!(jail.resolve_within(jail.root(), "trap/child").is_err());
    }
}
