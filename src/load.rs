//! Reading models from disk. Parse errors carry the JSON path that failed.

use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::decl::Model;
use crate::error::LoadError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str_with_path(&src).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn load_model(path: &Path) -> Result<Model, LoadError> {
    let model = read_json::<Model>(path)?;
    tracing::debug!(
        path = %path.display(),
        declarations = model.declarations.len(),
        packages = model.packages.len(),
        "loaded model"
    );
    Ok(model)
}

/// Load and merge every model; later files win on name clashes.
pub fn load_models(paths: &[PathBuf]) -> Result<Model, LoadError> {
    let mut out = Model::new();
    for path in paths {
        out.merge(load_model(path)?);
    }
    Ok(out)
}

pub fn load_settings(path: &Path) -> Result<Settings, LoadError> {
    read_json(path)
}

/// Expand literal paths and quoted glob patterns into concrete files.
pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            let entries = glob::glob(pattern).map_err(|e| LoadError::Pattern(e.to_string()))?;
            for entry in entries {
                let p = entry.map_err(|e| LoadError::Pattern(e.to_string()))?;
                matched_any = true;
                out.push(p);
            }
            if !matched_any {
                return Err(LoadError::Pattern(format!("glob pattern matched no files: {pattern}")));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
