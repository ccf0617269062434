//! Per-thread tree-sitter parsers
//!
//! Tree-sitter parsers are not `Sync`, so each worker thread (rayon or the
//! caller's own) lazily builds one parser per grammar and reuses it for
//! every file it handles.

use crate::error::IndexError;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Parser, Tree};

/// Grammars the pool can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Cpp,
}

impl FileType {
    /// Determine file type from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "h" | "hh" | "hpp" | "hxx" | "h++" | "c" | "cc" | "cpp" | "cxx" | "c++" | "ipp" => {
                Some(FileType::Cpp)
            }
            _ => None,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            FileType::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

/// A parsing request handed to the pool
#[derive(Debug)]
pub struct ParseRequest<'a> {
    pub file_type: FileType,
    pub content: &'a str,
    pub path: &'a Path,
}

#[derive(Debug)]
pub struct ParseResult {
    pub tree: Tree,
    pub path: PathBuf,
}

thread_local! {
    static CPP_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn failure(path: &Path, message: impl Into<String>) -> IndexError {
    IndexError::ParseFailed {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Parse on the calling thread, reusing its cached parser.
pub fn parse(request: ParseRequest<'_>) -> Result<ParseResult, IndexError> {
    let parser_cell = match request.file_type {
        FileType::Cpp => &CPP_PARSER,
    };

    parser_cell.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(&request.file_type.language())
                .map_err(|e| failure(request.path, format!("failed to set language: {}", e)))?;
            tracing::trace!("Created {:?} parser on {:?}", request.file_type, std::thread::current().id());
            *slot = Some(parser);
        }
        let parser = slot
            .as_mut()
            .ok_or_else(|| failure(request.path, "parser unavailable"))?;

        let tree = parser
            .parse(request.content, None)
            .ok_or_else(|| failure(request.path, "parser returned no tree"))?;
        Ok(ParseResult {
            tree,
            path: request.path.to_path_buf(),
        })
    })
}
