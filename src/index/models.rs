use std::path::Path;

use serde::{Deserialize, Serialize};

// =====================================================
// Structural Records
// =====================================================

/// Kind of filesystem node a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Directory,
    File,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Directory => "directory",
            RecordKind::File => "file",
        }
    }
}

/// A declared type (class) and the member functions found inside it, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl DeclaredType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}

/// Output of a structure extractor for a single file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStructure {
    pub declared_types: Vec<DeclaredType>,
    pub functions: Vec<String>,
    pub constants: Vec<String>,
}

impl FileStructure {
    /// Opens (or reopens) a type scope. A re-declared name keeps its position
    /// but loses the members collected so far.
    pub fn open_type(&mut self, name: &str) {
        match self.declared_types.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.members.clear(),
            None => self.declared_types.push(DeclaredType::new(name)),
        }
    }

    pub fn add_member(&mut self, type_name: &str, member: impl Into<String>) {
        if let Some(t) = self.declared_types.iter_mut().find(|t| t.name == type_name) {
            t.members.push(member.into());
        }
    }

    pub fn members_of(&self, type_name: &str) -> Option<&[String]> {
        self.declared_types
            .iter()
            .find(|t| t.name == type_name)
            .map(|t| t.members.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.declared_types.is_empty() && self.functions.is_empty() && self.constants.is_empty()
    }
}

/// One entry per traversed filesystem node.
///
/// Structural fields are `None` when they were never computed (directories,
/// unrecognized files) and `Some` (possibly empty) once extraction or a cache
/// hit supplied them. A cache hit only supplies `description`, `enrichment`,
/// `enriched_hash`, `imports` and `functions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub kind: RecordKind,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_types: Option<Vec<DeclaredType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<String>,
    /// Content hash the current enrichment was produced for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_hash: Option<String>,
}

impl FileRecord {
    fn bare(path: &Path, depth: usize, kind: RecordKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            name,
            path: path.to_string_lossy().to_string(),
            depth,
            kind,
            language: None,
            content_hash: None,
            declared_types: None,
            functions: None,
            constants: None,
            imports: None,
            description: None,
            enrichment: None,
            enriched_hash: None,
        }
    }

    pub fn directory(path: &Path, depth: usize) -> Self {
        Self::bare(path, depth, RecordKind::Directory)
    }

    pub fn file(path: &Path, depth: usize, language: Option<&str>) -> Self {
        let mut record = Self::bare(path, depth, RecordKind::File);
        record.language = language.map(str::to_string);
        record
    }

    pub fn is_file(&self) -> bool {
        self.kind == RecordKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == RecordKind::Directory
    }

    /// Fills the record from a fresh extraction run
    pub fn apply_extraction(
        &mut self,
        structure: FileStructure,
        description: String,
        imports: Vec<String>,
    ) {
        self.declared_types = Some(structure.declared_types);
        self.functions = Some(structure.functions);
        self.constants = Some(structure.constants);
        self.imports = Some(imports);
        self.description = Some(description);
    }

    /// Fills the record from a fresh cache entry
    pub fn apply_cache_entry(&mut self, entry: &CacheEntry) {
        self.description = Some(entry.description.clone());
        self.enrichment = (!entry.enrichment.is_empty()).then(|| entry.enrichment.clone());
        self.enriched_hash =
            (!entry.enriched_hash.is_empty()).then(|| entry.enriched_hash.clone());
        self.imports = Some(entry.imports.clone());
        self.functions = Some(entry.functions.clone());
    }

    pub fn imports_or_empty(&self) -> &[String] {
        self.imports.as_deref().unwrap_or(&[])
    }

    pub fn functions_or_empty(&self) -> &[String] {
        self.functions.as_deref().unwrap_or(&[])
    }

    pub fn constants_or_empty(&self) -> &[String] {
        self.constants.as_deref().unwrap_or(&[])
    }

    pub fn declared_types_or_empty(&self) -> &[DeclaredType] {
        self.declared_types.as_deref().unwrap_or(&[])
    }
}

// =====================================================
// Cache Rows
// =====================================================

/// One row of the incremental cache, keyed by absolute path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: String,
    pub hash: String,
    pub description: String,
    pub enrichment: String,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    /// Empty until a description was requested for this exact content
    pub enriched_hash: String,
}

impl CacheEntry {
    /// Builds the row that mirrors a record. Returns `None` for records that
    /// have no content hash and therefore cannot be cached.
    pub fn from_record(record: &FileRecord) -> Option<Self> {
        let hash = record.content_hash.as_ref().filter(|h| !h.is_empty())?;
        Some(Self {
            path: record.path.clone(),
            hash: hash.clone(),
            description: record.description.clone().unwrap_or_default(),
            enrichment: record.enrichment.clone().unwrap_or_default(),
            imports: record.imports.clone().unwrap_or_default(),
            functions: record.functions.clone().unwrap_or_default(),
            enriched_hash: record.enriched_hash.clone().unwrap_or_default(),
        })
    }

    /// An entry is authoritative only while its hash equals the current content hash
    pub fn is_fresh_for(&self, current_hash: &str) -> bool {
        !current_hash.is_empty() && self.hash == current_hash
    }
}
