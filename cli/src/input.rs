//! Input directory loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use walkdir::WalkDir;

use codesim_embeddings::SourceFile;

/// Seed file written when the input directory has no sources.
const EXAMPLE_FILENAME: &str = "example.py";

const EXAMPLE_CODE: &str = r#"def greet(name):
    """Say hello to someone."""
    return f"Hello, {name}!"

def add(a, b):
    """Add two numbers."""
    return a + b
"#;

/// Load every `.py` file directly under `dir`, in filename order.
///
/// The directory is created if absent and seeded with one example file when
/// it holds no sources, so a batch is never empty.
pub fn load_source_files(dir: &Path) -> Result<Vec<SourceFile>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create input directory {}", dir.display()))?;

    let mut files = read_sources(dir)?;
    if files.is_empty() {
        info!("No source files found; seeding {EXAMPLE_FILENAME}");
        fs::write(dir.join(EXAMPLE_FILENAME), EXAMPLE_CODE)
            .with_context(|| format!("failed to seed {}", dir.display()))?;
        files = read_sources(dir)?;
    }

    Ok(files)
}

fn read_sources(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "py") {
            continue;
        }

        let code = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        files.push(SourceFile::new(filename, code));
    }

    Ok(files)
}
