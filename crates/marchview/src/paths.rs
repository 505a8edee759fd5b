use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use renderer::{FRAGMENT_SHADER_FILE, VERTEX_SHADER_FILE};

/// Resolves the shader directory.
///
/// An explicit `--shaders` path must contain both sources or startup fails.
/// Otherwise `./shaders` is tried first, then a `shaders` directory next to
/// the executable so an installed binary finds its assets.
pub fn discover(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if has_shader_sources(dir) {
            return Ok(dir.to_path_buf());
        }
        bail!(
            "{} does not contain {VERTEX_SHADER_FILE} and {FRAGMENT_SHADER_FILE}",
            dir.display()
        );
    }

    let mut candidates = vec![PathBuf::from("shaders")];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("shaders"));
        }
    }
    for candidate in &candidates {
        if has_shader_sources(candidate) {
            return Ok(candidate.clone());
        }
    }
    bail!("no shader directory found; pass --shaders pointing at one")
}

fn has_shader_sources(dir: &Path) -> bool {
    dir.join(VERTEX_SHADER_FILE).is_file() && dir.join(FRAGMENT_SHADER_FILE).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn populate(dir: &Path) {
        fs::write(dir.join(VERTEX_SHADER_FILE), "@vertex fn vs_main() {}").unwrap();
        fs::write(dir.join(FRAGMENT_SHADER_FILE), "@fragment fn fs_main() {}").unwrap();
    }

    #[test]
    fn explicit_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        assert_eq!(discover(Some(dir.path())).unwrap(), dir.path());
    }

    #[test]
    fn explicit_directory_missing_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_SHADER_FILE), "@vertex fn vs_main() {}").unwrap();
        let err = discover(Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains(FRAGMENT_SHADER_FILE));
    }

    #[test]
    fn half_populated_directory_is_not_a_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FRAGMENT_SHADER_FILE), "@fragment fn fs_main() {}").unwrap();
        assert!(!has_shader_sources(dir.path()));
        populate(dir.path());
        assert!(has_shader_sources(dir.path()));
    }
}
