use anyhow::{Context, Result, bail};
use manarg_schema::ParserSchema;
use std::fs;
use std::path::{Path, PathBuf};

/// A schema file read from disk, with the path it was found at.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub path: PathBuf,
    pub schema: ParserSchema,
}

impl LoadedSchema {
    /// Program name used for error lines when the parser cannot be built.
    pub fn prog(&self) -> String {
        self.schema
            .prog
            .clone()
            .or_else(|| {
                self.path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "manarg".to_string())
    }
}

pub fn load_schema(schema_path: &Path) -> Result<LoadedSchema> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = resolve_against(&cwd, schema_path);

    if !path.exists() {
        bail!("schema not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let schema = ParserSchema::from_json(&contents)
        .with_context(|| format!("failed to parse schema: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        parameters = schema.parameters.len(),
        "loaded schema"
    );

    Ok(LoadedSchema { path, schema })
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
