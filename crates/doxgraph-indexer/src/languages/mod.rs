//! Declaration sources for supported languages

pub mod cpp;

use crate::config::IndexerConfig;
use crate::error::IndexError;
use crate::extractor::{DeclarationSource, InputUnit};
use crate::parser_pool::FileType;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Get the declaration source for a file based on its extension
pub fn get_extractor(path: &Path) -> Option<Box<dyn DeclarationSource>> {
    match FileType::from_path(path)? {
        FileType::Cpp => Some(Box::new(cpp::CppExtractor)),
    }
}

/// Read and extract one file.
pub fn extract_file(path: &Path) -> Result<InputUnit, IndexError> {
    let extractor = get_extractor(path)
        .ok_or_else(|| IndexError::UnsupportedLanguage(path.display().to_string()))?;
    let content = std::fs::read(path).map_err(|e| IndexError::io(path, e))?;
    extractor.extract(path, &content)
}

/// Extract every file, keeping the given order.
pub fn extract_files(paths: &[PathBuf], config: &IndexerConfig) -> Result<Vec<InputUnit>, IndexError> {
    if config.parallel {
        paths.par_iter().map(|p| extract_file(p)).collect()
    } else {
        paths.iter().map(|p| extract_file(p)).collect()
    }
}
