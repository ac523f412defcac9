//! Companion executable resolution.
//!
//! The companion is bundled at a fixed location relative to the handler's own
//! executable. Resolution never looks at the working directory: the OS starts
//! URL handlers from arbitrary directories.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::{bundle, companion};
use crate::error::{Error, Result};

/// Capability for finding the companion executable.
pub trait CompanionLocator {
    /// Absolute path of the companion executable.
    ///
    /// Does not check that the file exists; a missing companion surfaces as a
    /// spawn failure.
    fn locate(&self) -> Result<PathBuf>;
}

/// Resolves the companion from the handler's installation directory.
///
/// - macOS bundle (`Ope.app/Contents/MacOS/<handler>`) →
///   `Ope.app/Contents/Resources/ope`
/// - anything else → `ope` (`ope.exe`) next to the handler
#[derive(Debug, Clone)]
pub struct BundleLocator {
    executable: Option<PathBuf>,
    override_path: Option<PathBuf>,
}

impl BundleLocator {
    /// Locator for the running process.
    pub fn current() -> Self {
        let executable = match std::env::current_exe() {
            Ok(path) => Some(fs::canonicalize(&path).unwrap_or(path)),
            Err(e) => {
                debug!("current_exe failed: {}", e);
                None
            }
        };
        Self {
            executable,
            override_path: None,
        }
    }

    /// Locator for a handler installed at `executable`.
    pub fn from_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(executable.into()),
            override_path: None,
        }
    }

    /// Use `path` instead of the bundled companion. Relative paths are
    /// resolved against the installation root.
    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path;
        self
    }

    /// Directory containing the handler executable.
    pub fn install_root(&self) -> Result<PathBuf> {
        let executable = self.executable.as_deref().ok_or_else(|| {
            Error::InstallRootUnavailable("cannot determine handler executable".to_string())
        })?;

        if !executable.is_absolute() {
            return Err(Error::InstallRootUnavailable(format!(
                "handler path is not absolute: {}",
                executable.display()
            )));
        }

        executable
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::InstallRootUnavailable(format!(
                    "handler path has no parent: {}",
                    executable.display()
                ))
            })
    }

    /// Path and existence of the companion, for diagnostics.
    pub fn report(&self) -> Result<LocateReport> {
        let install_root = self.install_root()?;
        let companion = self.locate()?;
        let exists = companion.is_file();
        Ok(LocateReport {
            install_root,
            companion,
            exists,
            overridden: self.override_path.is_some(),
        })
    }
}

impl CompanionLocator for BundleLocator {
    fn locate(&self) -> Result<PathBuf> {
        let root = self.install_root()?;

        let path = match &self.override_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root.join(path),
            None => bundled_companion(&root),
        };

        debug!("Companion resolved to {}", path.display());
        Ok(path)
    }
}

/// Companion location for a handler installed in `root`.
fn bundled_companion(root: &Path) -> PathBuf {
    match app_bundle_contents(root) {
        Some(contents) => contents
            .join(bundle::RESOURCES_DIR)
            .join(companion::file_name()),
        None => root.join(companion::file_name()),
    }
}

/// `…/Contents` if `root` is `…/Contents/MacOS`.
fn app_bundle_contents(root: &Path) -> Option<&Path> {
    if root.file_name()? != bundle::EXECUTABLE_DIR {
        return None;
    }
    let contents = root.parent()?;
    (contents.file_name()? == bundle::CONTENTS_DIR).then_some(contents)
}

/// Diagnostic view of companion resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocateReport {
    pub install_root: PathBuf,
    pub companion: PathBuf,
    pub exists: bool,
    pub overridden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(path: &str) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("C:{}", path.replace('/', "\\")))
        } else {
            PathBuf::from(path)
        }
    }

    #[test]
    fn test_app_bundle_layout() {
        let locator =
            BundleLocator::from_executable(abs("/Applications/Ope.app/Contents/MacOS/ope-handler"));
        assert_eq!(
            locator.locate().unwrap(),
            abs("/Applications/Ope.app/Contents/Resources").join(companion::file_name())
        );
    }

    #[test]
    fn test_flat_layout_uses_sibling() {
        let locator = BundleLocator::from_executable(abs("/opt/ope/bin/ope-handler"));
        assert_eq!(
            locator.locate().unwrap(),
            abs("/opt/ope/bin").join(companion::file_name())
        );
    }

    #[test]
    fn test_macos_dir_outside_bundle_is_flat() {
        let locator = BundleLocator::from_executable(abs("/srv/MacOS/ope-handler"));
        assert_eq!(
            locator.locate().unwrap(),
            abs("/srv/MacOS").join(companion::file_name())
        );
    }

    #[test]
    fn test_absolute_override_wins() {
        let locator = BundleLocator::from_executable(abs("/opt/ope/bin/ope-handler"))
            .with_override(Some(abs("/usr/local/bin/ope")));
        assert_eq!(locator.locate().unwrap(), abs("/usr/local/bin/ope"));
    }

    #[test]
    fn test_relative_override_is_relative_to_install_root() {
        let locator = BundleLocator::from_executable(abs("/opt/ope/bin/ope-handler"))
            .with_override(Some(PathBuf::from("../libexec/ope")));
        assert_eq!(
            locator.locate().unwrap(),
            abs("/opt/ope/bin").join("../libexec/ope")
        );
    }

    #[test]
    fn test_relative_executable_is_rejected() {
        let locator = BundleLocator::from_executable("ope-handler");
        assert!(matches!(
            locator.locate(),
            Err(Error::InstallRootUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_executable_is_rejected() {
        let locator = BundleLocator {
            executable: None,
            override_path: Some(abs("/usr/local/bin/ope")),
        };
        assert!(matches!(
            locator.install_root(),
            Err(Error::InstallRootUnavailable(_))
        ));
        assert!(locator.locate().is_err());
    }

    #[test]
    fn test_current_is_absolute() {
        let locator = BundleLocator::current();
        let companion = locator.locate().unwrap();
        assert!(companion.is_absolute());
    }

    #[test]
    fn test_report_flags_missing_companion() {
        let dir = tempfile::tempdir().unwrap();
        let locator = BundleLocator::from_executable(dir.path().join("ope-handler"));

        let report = locator.report().unwrap();
        assert_eq!(report.install_root, dir.path());
        assert!(!report.exists);
        assert!(!report.overridden);

        std::fs::write(dir.path().join(companion::file_name()), b"").unwrap();
        assert!(locator.report().unwrap().exists);
    }
}
