//! Managed source discovery

use std::path::Path;

use il2cpp_build_engine::{BuildError, OutputLayout};
use tracing::debug;
use walkdir::WalkDir;

/// Identifiers of every `.cs` file directly in `dir`, sorted by name
pub fn discover_sources(dir: &Path) -> Result<Vec<String>, BuildError> {
    let mut identifiers = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            BuildError::ConfigError(format!("cannot read source directory {:?}: {}", dir, e))
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "cs") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            identifiers.push(stem.to_string());
        }
    }

    debug!("Discovered sources in {:?}: {:?}", dir, identifiers);
    Ok(identifiers)
}

/// The identifiers to build: the requested ones, or everything discovered.
///
/// Every identifier must have a `<source_dir>/<identifier>.cs`.
pub fn select_sources(
    layout: &OutputLayout,
    requested: &[String],
) -> Result<Vec<String>, BuildError> {
    let identifiers = if requested.is_empty() {
        discover_sources(&layout.source_dir)?
    } else {
        requested
            .iter()
            .map(|id| id.trim().trim_end_matches(".cs").to_string())
            .filter(|id| !id.is_empty())
            .collect()
    };

    if identifiers.is_empty() {
        return Err(BuildError::ConfigError(format!(
            "no .cs sources found in {:?}",
            layout.source_dir
        )));
    }

    for id in &identifiers {
        let source = layout.source_file(id);
        if !source.is_file() {
            return Err(BuildError::ConfigError(format!("source file {:?} not found", source)));
        }
    }

    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_dir(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for f in files {
            std::fs::write(dir.path().join(f), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_discover_only_cs_files() {
        let dir = source_dir(&["Zeta.cs", "Alpha.cs", "notes.txt"]);
        std::fs::create_dir(dir.path().join("Nested.cs")).unwrap();

        assert_eq!(discover_sources(dir.path()).unwrap(), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_select_requested() {
        let dir = source_dir(&["Game.cs", "Tools.cs"]);
        let layout = OutputLayout::new(dir.path(), dir.path().join("build"));

        let ids = select_sources(&layout, &["Tools.cs".to_string()]).unwrap();
        assert_eq!(ids, vec!["Tools"]);
    }

    #[test]
    fn test_select_missing_source() {
        let dir = source_dir(&["Game.cs"]);
        let layout = OutputLayout::new(dir.path(), dir.path().join("build"));

        let err = select_sources(&layout, &["Missing".to_string()]).unwrap_err();
        assert!(matches!(err, BuildError::ConfigError(_)));
    }

    #[test]
    fn test_select_nothing_found() {
        let dir = source_dir(&[]);
        let layout = OutputLayout::new(dir.path(), dir.path().join("build"));
        assert!(select_sources(&layout, &[]).is_err());
    }
}
