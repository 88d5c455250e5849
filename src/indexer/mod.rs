pub mod hasher;
pub mod ignore_rules;
pub mod parser;
pub mod walker;

pub use hasher::{hash_bytes, hash_file, UNHASHABLE};
pub use ignore_rules::IgnoreMatcher;
pub use parser::{parse_source, ParsedFile};
pub use walker::{RepoWalker, WalkOutput, WalkStats};
