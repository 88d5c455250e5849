pub mod csharp;
pub mod doc_only;
pub mod extensions;
pub mod java;
pub mod javascript;
pub mod pattern;
pub mod python;

pub use extensions::SUPPORTED_LANGUAGES;
pub use pattern::{PatternGrammar, ScanEvent, ScanState};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::index::FileStructure;

/// Everything the extractors recover from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAnalysis {
    pub structure: FileStructure,
    pub description: String,
    pub imports: Vec<String>,
}

/// Extraction strategy for one language.
///
/// Every method has an empty default so a strategy only implements the
/// contracts its language actually supports.
pub trait LanguageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Declared types with their members, top-level functions, and constants
    fn extract_structure(&self, _source: &str) -> Result<FileStructure> {
        Ok(FileStructure::default())
    }

    /// Leading documentation; empty when absent or unsupported
    fn extract_doc(&self, _source: &str) -> String {
        String::new()
    }

    /// Import targets in source order
    fn extract_imports(&self, _source: &str) -> Vec<String> {
        Vec::new()
    }

    /// Runs all three extractors. Strategies that share work between them
    /// (e.g. a single parse) override this.
    fn analyze(&self, source: &str) -> Result<FileAnalysis> {
        Ok(FileAnalysis {
            structure: self.extract_structure(source)?,
            description: self.extract_doc(source),
            imports: self.extract_imports(source),
        })
    }
}

pub struct LanguageRegistry {
    strategies: HashMap<&'static str, Arc<dyn LanguageStrategy>>,
    extension_map: HashMap<&'static str, &'static str>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
            extension_map: SUPPORTED_LANGUAGES.iter().copied().collect(),
        };

        registry.register(Arc::new(python::PythonStrategy));
        registry.register(Arc::new(java::grammar()));
        registry.register(Arc::new(javascript::grammar(javascript::JAVASCRIPT)));
        registry.register(Arc::new(javascript::grammar(javascript::TYPESCRIPT)));
        registry.register(Arc::new(csharp::grammar()));
        registry.register(Arc::new(doc_only::cpp()));
        registry.register(Arc::new(doc_only::go()));
        registry.register(Arc::new(doc_only::php()));
        registry.register(Arc::new(doc_only::ruby()));

        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn LanguageStrategy>) {
        self.strategies.insert(strategy.name(), strategy);
    }

    /// Maps an extension (with or without the leading dot, any case) to a language tag
    pub fn classify(&self, extension: &str) -> Option<&'static str> {
        let ext = extension.to_ascii_lowercase();
        let key = if ext.starts_with('.') {
            ext
        } else {
            format!(".{}", ext)
        };
        self.extension_map.get(key.as_str()).copied()
    }

    /// Classifies a file by name. Multi-part suffixes (`.tfstate.backup`) and
    /// dotfiles (`.gitignore`) are tried before the last extension.
    pub fn classify_path(&self, path: &Path) -> Option<&'static str> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();

        name.char_indices()
            .filter(|(_, c)| *c == '.')
            .find_map(|(idx, _)| self.extension_map.get(&name[idx..]).copied())
    }

    pub fn strategy_for(&self, language: &str) -> Option<Arc<dyn LanguageStrategy>> {
        self.strategies.get(language).cloned()
    }

    /// Languages with a registered extraction strategy
    pub fn extracting_languages(&self) -> Vec<&str> {
        self.strategies.keys().copied().collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
