use crate::index::FileRecord;

/// What the describer is told about one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub language: String,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub declared_types: Vec<String>,
    pub constants: Vec<String>,
}

impl FileSummary {
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            language: record.language.clone().unwrap_or_default(),
            imports: record.imports_or_empty().to_vec(),
            functions: record.functions_or_empty().to_vec(),
            declared_types: record
                .declared_types_or_empty()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            constants: record.constants_or_empty().to_vec(),
        }
    }

    pub fn system_prompt() -> &'static str {
        "You summarize source files for a repository map. Answer in exactly two lines:\n\
         Description: <one sentence describing the file's purpose>\n\
         Developer Consideration: \"<one short, concrete note for developers editing this file>\""
    }

    pub fn user_prompt(&self) -> String {
        let mut prompt = format!("File: {}\n", self.name);
        if !self.language.is_empty() {
            prompt.push_str(&format!("Language: {}\n", self.language));
        }
        push_list(&mut prompt, "Imports", &self.imports);
        push_list(&mut prompt, "Functions", &self.functions);
        push_list(&mut prompt, "Types", &self.declared_types);
        push_list(&mut prompt, "Constants", &self.constants);
        prompt
    }
}

fn push_list(prompt: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        prompt.push_str(&format!("{}: {}\n", label, items.join(", ")));
    }
}
