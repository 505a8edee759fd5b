use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File name of the full-screen triangle vertex shader.
pub const VERTEX_SHADER_FILE: &str = "fullscreen.wgsl";
/// File name of the fractal fragment shader.
pub const FRAGMENT_SHADER_FILE: &str = "fractal.wgsl";

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// Problems detectable before the sources ever reach the GPU.
#[derive(Debug, thiserror::Error)]
pub enum ShaderSourceError {
    #[error("shader {path} does not declare entry point `{entry}`")]
    MissingEntryPoint { path: PathBuf, entry: &'static str },
    #[error("shader {path} is empty")]
    Empty { path: PathBuf },
}

/// The two shader source files read once at startup.
#[derive(Debug, Clone)]
pub struct ShaderPair {
    pub vertex: String,
    pub fragment: String,
}

/// Reads and validates both shader sources from `dir`.
///
/// Validation is a cheap textual entry-point check; real compilation errors
/// still surface through `wgpu` when the modules are created, but this way
/// a wrong or truncated file fails with the offending path in the message.
pub fn load_shader_pair(dir: &Path) -> Result<ShaderPair> {
    let vertex = read_shader(&dir.join(VERTEX_SHADER_FILE), VERTEX_ENTRY)?;
    let fragment = read_shader(&dir.join(FRAGMENT_SHADER_FILE), FRAGMENT_ENTRY)?;
    Ok(ShaderPair { vertex, fragment })
}

fn read_shader(path: &Path, entry: &'static str) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read shader at {}", path.display()))?;
    validate_entry_point(&source, path, entry)?;
    Ok(source)
}

fn validate_entry_point(source: &str, path: &Path, entry: &'static str) -> Result<()> {
    if source.trim().is_empty() {
        return Err(ShaderSourceError::Empty {
            path: path.to_path_buf(),
        }
        .into());
    }
    let declares_entry = source
        .split("fn ")
        .skip(1)
        .any(|rest| rest.trim_start().starts_with(entry));
    if !declares_entry {
        return Err(ShaderSourceError::MissingEntryPoint {
            path: path.to_path_buf(),
            entry,
        }
        .into());
    }
    Ok(())
}

pub(crate) struct ShaderModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

pub(crate) fn create_modules(device: &wgpu::Device, pair: &ShaderPair) -> ShaderModules {
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&pair.vertex)),
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fractal fragment"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&pair.fragment)),
    });
    ShaderModules { vertex, fragment }
}

pub(crate) fn entry_points() -> (&'static str, &'static str) {
    (VERTEX_ENTRY, FRAGMENT_ENTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_shader_pair(dir.path()).unwrap_err();
        assert!(err.to_string().contains(VERTEX_SHADER_FILE));
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(VERTEX_SHADER_FILE),
            "@vertex fn vs_main() {}",
        )
        .unwrap();
        fs::write(
            dir.path().join(FRAGMENT_SHADER_FILE),
            "fn helper() -> f32 { return 1.0; }",
        )
        .unwrap();

        let err = load_shader_pair(dir.path()).unwrap_err();
        let source_err = err.downcast_ref::<ShaderSourceError>().unwrap();
        assert!(matches!(
            source_err,
            ShaderSourceError::MissingEntryPoint { entry: "fs_main", .. }
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_SHADER_FILE), "  \n").unwrap();
        fs::write(dir.path().join(FRAGMENT_SHADER_FILE), "@fragment fn fs_main() {}").unwrap();

        let err = load_shader_pair(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<ShaderSourceError>().is_some());
    }

    #[test]
    fn valid_pair_loads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(VERTEX_SHADER_FILE),
            "@vertex\nfn vs_main() {}",
        )
        .unwrap();
        fs::write(
            dir.path().join(FRAGMENT_SHADER_FILE),
            "@fragment\nfn fs_main() {}",
        )
        .unwrap();

        let pair = load_shader_pair(dir.path()).unwrap();
        assert!(pair.vertex.contains("vs_main"));
        assert!(pair.fragment.contains("fs_main"));
    }
}
