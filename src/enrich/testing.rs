use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::client::Describer;
use super::summary::FileSummary;
use crate::error::{MapperError, Result};

/// Replays canned responses in order and records which files were described
pub struct ScriptedDescriber {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    described: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedDescriber {
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            described: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn described(&self) -> Vec<String> {
        self.described.lock().unwrap().clone()
    }
}

impl Describer for ScriptedDescriber {
    async fn describe(&self, summary: &FileSummary, _model: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.described.lock().unwrap().push(summary.name.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(MapperError::Enrichment(reason)),
            None => Err(MapperError::Enrichment("script exhausted".to_string())),
        }
    }
}
