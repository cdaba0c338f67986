use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{validate_name, DocumentStore};
use crate::error::{Error, Result};

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, name: &str, text: &str) -> Self {
        self.docs
            .borrow_mut()
            .insert(name.to_string(), text.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.docs.borrow().get(name).cloned()
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        self.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })
    }

    fn write(&self, name: &str, text: &str) -> Result<()> {
        validate_name(name)?;
        self.docs
            .borrow_mut()
            .insert(name.to_string(), text.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
