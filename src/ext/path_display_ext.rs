use std::path::{self, Path, PathBuf};

/// Renders a host path for log lines and error messages.
///
/// Prefers the canonical form, falls back to an absolute path when the file
/// does not exist yet, and to the path as given when even that fails.
pub fn lossy_path_display(path: &Path) -> String {
    path.canonicalize()
        .or_else(|_| path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub trait PathDisplayExt {
    fn lossy_display(&self) -> String;
}

impl PathDisplayExt for Path {
    fn lossy_display(&self) -> String {
        lossy_path_display(self)
    }
}

impl PathDisplayExt for PathBuf {
    fn lossy_display(&self) -> String {
        lossy_path_display(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_paths_are_canonicalized() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("sub");
        std::fs::create_dir(&nested).expect("Failed to create directory");

        let through_parent = nested.join("..").join("sub");
        assert_eq!(
            through_parent.lossy_display(),
            nested.canonicalize().unwrap().display().to_string()
        );
    }

    #[test]
    fn missing_relative_paths_become_absolute() {
        let shown = Path::new("does/not/exist.json").lossy_display();
        assert!(Path::new(&shown).is_absolute());
        assert!(shown.ends_with("exist.json"));
    }
}
