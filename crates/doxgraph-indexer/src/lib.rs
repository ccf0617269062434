//! Comment tokenizing, declaration association and documentation graph building

pub mod associator;
pub mod builder;
pub mod comment;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod languages;
pub mod parser_pool;
pub mod resolver;
pub mod scope;


pub use associator::{AssociatedUnit, Association, associate};
pub use builder::{BuildOutput, ModelBuilder};
pub use comment::{CommentBlock, Tag, TagEntry, tokenize, tokenize_raw};
pub use config::{CONFIG_FILE, ImplicitMembership, IndexerConfig, ScopeMode};
pub use coordinator::Coordinator;
pub use error::IndexError;
pub use extractor::{DeclarationSource, InputUnit, RawComment, UnitItem};
pub use languages::{extract_file, extract_files, get_extractor};
pub use resolver::resolve;
pub use scope::{ScopeFrame, ScopeTracker, ScopeViolation};
