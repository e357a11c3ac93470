use crate::error::{AutoRstError, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Leading character that hides a path segment, and everything beneath it,
/// from generation.
pub const EXCLUSION_MARKER: char = '_';

pub fn is_excluded(name: &str) -> bool {
    name.starts_with(EXCLUSION_MARKER)
}

/// True when the last segment of `path` carries the exclusion marker.
pub fn is_excluded_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_excluded(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Eligible contents of one package directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageListing {
    pub modules: Vec<String>,
    pub subpackages: Vec<String>,
}

impl PackageListing {
    pub fn has_modules(&self) -> bool {
        !self.modules.is_empty()
    }

    /// Modules first, then `<subpackage>/index`, each group sorted.
    pub fn doc_references(&self) -> Vec<String> {
        self.modules
            .iter()
            .cloned()
            .chain(self.subpackages.iter().map(|dir| format!("{dir}/index")))
            .collect()
    }
}

pub struct PackageScanner {
    extension: String,
}

impl PackageScanner {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Module name for an eligible source file, `None` for anything else.
    pub fn module_name(&self, path: &Path) -> Result<Option<String>> {
        if is_excluded_path(path) {
            return Ok(None);
        }
        if path.extension() != Some(OsStr::new(&self.extension)) {
            return Ok(None);
        }

        let stem = path
            .file_stem()
            .ok_or_else(|| AutoRstError::path(format!("No module name in {}", path.display())))?;
        Ok(Some(utf8_segment(stem, path)?.to_string()))
    }

    pub fn list_package(&self, dir: &Path) -> Result<PackageListing> {
        let mut listing = PackageListing::default();

        for path in sorted_entries(dir)? {
            if path.is_dir() {
                if !is_excluded_path(&path) {
                    listing.subpackages.push(file_name(&path)?.to_string());
                }
            } else if path.is_file() {
                if let Some(module) = self.module_name(&path)? {
                    listing.modules.push(module);
                }
            }
        }

        Ok(listing)
    }
}

/// Immediate children of `dir`, sorted by file name.
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| -> Result<PathBuf> { Ok(entry?.into_path()) })
        .collect()
}

/// Last segment of `path`, which must be valid UTF-8 to become part of a
/// qualified name or reference.
pub fn file_name(path: &Path) -> Result<&str> {
    let name = path
        .file_name()
        .ok_or_else(|| AutoRstError::path(format!("No file name in {}", path.display())))?;
    utf8_segment(name, path)
}

fn utf8_segment<'a>(segment: &'a OsStr, path: &Path) -> Result<&'a str> {
    segment.to_str().ok_or_else(|| {
        AutoRstError::path(format!("Non UTF-8 path segment in {}", path.display()))
    })
}

/// Path of `dir` relative to `source_root`; empty for the root itself.
pub fn relative_path(dir: &Path, source_root: &Path) -> Result<PathBuf> {
    let relative = pathdiff::diff_paths(dir, source_root)
        .ok_or_else(|| AutoRstError::path("Failed to compute relative path"))?;

    Ok(relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Dotted name of a package: `base_package_name` followed by each segment of
/// `relative`.
pub fn package_qualname(base_package_name: &str, relative: &Path) -> Result<String> {
    let mut segments = vec![base_package_name];
    for component in relative.components() {
        segments.push(utf8_segment(component.as_os_str(), relative)?);
    }
    Ok(segments.join("."))
}

/// Basename of the source root as the caller spelled it. Roots such as `.`
/// or `pkg/..` have no basename and fall back to the resolved directory.
pub fn root_name(source_root: &Path) -> Result<String> {
    if source_root.file_name().is_some() {
        return file_name(source_root).map(str::to_string);
    }

    let resolved = fs::canonicalize(source_root)?;
    file_name(&resolved).map(str::to_string).map_err(|_| {
        AutoRstError::path(format!(
            "Source root has no usable name: {}",
            source_root.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_module_name() -> Result<()> {
        let scanner = PackageScanner::new("py");

        assert_eq!(scanner.module_name(Path::new("pkg/a.py"))?, Some("a".to_string()));
        assert_eq!(
            scanner.module_name(Path::new("pkg/my_module.py"))?,
            Some("my_module".to_string())
        );
        assert_eq!(scanner.module_name(Path::new("pkg/_private.py"))?, None);
        assert_eq!(scanner.module_name(Path::new("pkg/__init__.py"))?, None);
        assert_eq!(scanner.module_name(Path::new("pkg/readme.md"))?, None);
        assert_eq!(scanner.module_name(Path::new("pkg/noext"))?, None);
        Ok(())
    }

    #[test]
    fn test_list_package() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path();
        fs::write(dir.join("zeta.py"), "")?;
        fs::write(dir.join("alpha.py"), "")?;
        fs::write(dir.join("__init__.py"), "")?;
        fs::write(dir.join("notes.txt"), "")?;
        fs::create_dir_all(dir.join("nested"))?;
        fs::create_dir_all(dir.join("_hidden"))?;

        let listing = PackageScanner::new("py").list_package(dir)?;

        assert_eq!(listing.modules, vec!["alpha", "zeta"]);
        assert_eq!(listing.subpackages, vec!["nested"]);
        assert_eq!(
            listing.doc_references(),
            vec!["alpha", "zeta", "nested/index"]
        );
        Ok(())
    }

    #[test]
    fn test_list_package_without_modules() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("inner"))?;

        let listing = PackageScanner::new("py").list_package(temp_dir.path())?;
        assert!(!listing.has_modules());
        assert_eq!(listing.subpackages, vec!["inner"]);
        Ok(())
    }

    #[test]
    fn test_package_qualname() -> Result<()> {
        assert_eq!(package_qualname("pkg", Path::new(""))?, "pkg");
        assert_eq!(package_qualname("pkg", Path::new("sub"))?, "pkg.sub");
        assert_eq!(
            package_qualname("org.pkg", Path::new("sub/deeper"))?,
            "org.pkg.sub.deeper"
        );
        Ok(())
    }

    #[test]
    fn test_root_name_uses_given_spelling() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let pkg = temp_dir.path().join("pkg");
        fs::create_dir_all(pkg.join("sub"))?;

        assert_eq!(root_name(&pkg)?, "pkg");
        assert_eq!(root_name(&pkg.join("."))?, "pkg");
        assert_eq!(root_name(&pkg.join("sub/.."))?, "pkg");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_root_name_keeps_symlink_name() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("tianshou-1.0");
        fs::create_dir_all(&target)?;
        let link = temp_dir.path().join("tianshou");
        std::os::unix::fs::symlink(&target, &link)?;

        assert_eq!(root_name(&link)?, "tianshou");
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names() -> Result<()> {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path();
        fs::write(dir.join(OsStr::from_bytes(b"_hidden\xff.py")), "")?;
        fs::create_dir_all(dir.join(OsStr::from_bytes(b"_skip\xff")))?;
        fs::write(dir.join(OsStr::from_bytes(b"notes\xff.txt")), "")?;
        fs::write(dir.join("ok.py"), "")?;

        let scanner = PackageScanner::new("py");
        let listing = scanner.list_package(dir)?;
        assert_eq!(listing.modules, vec!["ok"]);
        assert!(listing.subpackages.is_empty());

        fs::write(dir.join(OsStr::from_bytes(b"bad\xff.py")), "")?;
        assert!(matches!(scanner.list_package(dir), Err(AutoRstError::Path(_))));
        Ok(())
    }

    #[test]
    fn test_sorted_entries() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path();
        fs::write(dir.join("b.py"), "")?;
        fs::write(dir.join("a.py"), "")?;
        fs::create_dir_all(dir.join("c/deeper"))?;

        let entries = sorted_entries(dir)?;
        assert_eq!(entries, vec![dir.join("a.py"), dir.join("b.py"), dir.join("c")]);
        Ok(())
    }

    #[test]
    fn test_relative_path_of_root_is_empty() -> Result<()> {
        let root = Path::new("/src/pkg");
        assert_eq!(relative_path(root, root)?, PathBuf::new());
        assert_eq!(relative_path(&root.join("a/b"), root)?, PathBuf::from("a/b"));
        Ok(())
    }

    #[test]
    fn test_exclusion() {
        assert!(is_excluded("_private"));
        assert!(is_excluded("__pycache__"));
        assert!(!is_excluded("public"));
        assert!(is_excluded_path(Path::new("a/_b")));
        assert!(!is_excluded_path(Path::new("_a/b")));
    }
}
