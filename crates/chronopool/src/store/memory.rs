use std::io;

use crate::{
    PoolStore,
    mutex::{Mutex, lock},
};

/// A [`PoolStore`] that keeps the encoded pool in memory.
///
/// Useful for tests and for embedding the allocator where persistence is
/// handled elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates a store that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// A copy of the stored text, if any.
    pub fn contents(&self) -> Option<String> {
        lock(&self.contents).clone()
    }
}

impl PoolStore for MemoryStore {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *lock(&self.contents) = Some(contents.to_owned());
        Ok(())
    }
}
