//! Discovery of replay source files.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Collects the files in `dir` whose stem contains `prefix`, ordered by the
/// numeric index after the last `_` in the stem (`trip_data_1`, `trip_data_2`,
/// ...).
///
/// A matching stem without a parseable index fails fast, as does an empty
/// match set; both are configuration errors raised before any pipeline
/// starts.
pub fn collect_source_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let read_err = |source| ConfigError::DataDir {
        dir: dir.to_path_buf(),
        source,
    };

    let mut indexed = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !stem.contains(prefix) {
            continue;
        }

        let index = stem
            .rsplit('_')
            .next()
            .and_then(|suffix| suffix.parse::<u32>().ok())
            .ok_or_else(|| ConfigError::SourceFileName {
                prefix: prefix.to_string(),
                path: path.clone(),
            })?;
        indexed.push((index, path));
    }

    if indexed.is_empty() {
        return Err(ConfigError::NoSourceFiles {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, path)| path).collect())
}
