pub mod config;
pub mod enrich;
pub mod error;
pub mod index;
pub mod indexer;
pub mod languages;
pub mod output;
pub mod pipeline;

pub use config::{MapConfig, RetryPolicy};
pub use enrich::{
    describe_with_retry, enrich_records, parse_response, ChatDescriber, Describer, EnrichResult,
    Enrichment, EnrichmentOutcome, FileSummary,
};
pub use error::{MapperError, Result};
pub use index::{CacheEntry, DeclaredType, FileRecord, FileStructure, RecordKind, SqliteCache};
pub use indexer::{hash_file, IgnoreMatcher, RepoWalker, WalkOutput, WalkStats};
pub use languages::{LanguageRegistry, LanguageStrategy};
pub use output::{load_snapshot, render_tree_map, save_snapshot, save_tree_map};
