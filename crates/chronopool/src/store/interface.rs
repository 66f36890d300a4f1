use std::io;

use crate::{Pool, Result, decode_ids, encode_ids};

/// A readable and writable text sink holding one persisted pool.
///
/// Implementations only move whole documents: every write replaces the
/// previous contents. The encoding is handled by the provided methods.
///
/// # Example
///
/// ```
/// use chronopool::{MemoryStore, Pool, PoolStore};
///
/// let store = MemoryStore::default();
/// store.save_pool(&Pool::from(vec![12, 10, 11])).unwrap();
/// assert_eq!(store.read().unwrap().as_deref(), Some("12\n10\n11"));
/// assert_eq!(store.load_pool().unwrap().as_slice(), [12, 10, 11]);
/// ```
pub trait PoolStore {
    /// Returns the stored text, or `None` if nothing was ever written.
    ///
    /// # Errors
    ///
    /// Any I/O failure other than the store not existing yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the stored text with `contents`.
    ///
    /// # Errors
    ///
    /// Any I/O failure while writing.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// `true` when the store is missing or holds no data.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    fn is_blank(&self) -> Result<bool> {
        Ok(self.read()?.is_none_or(|text| text.is_empty()))
    }

    /// Encodes and writes `pool`.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    fn save_pool(&self, pool: &Pool) -> Result<()> {
        self.write(&encode_ids(pool.as_slice()))?;
        Ok(())
    }

    /// Reads and decodes the stored pool.
    ///
    /// # Errors
    ///
    /// [`Error::Io`](crate::Error::Io) with [`io::ErrorKind::NotFound`] if
    /// nothing was stored, or [`Error::Parse`](crate::Error::Parse) for a
    /// corrupt line.
    fn load_pool(&self) -> Result<Pool> {
        let text = self.read()?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no pool has been stored yet")
        })?;
        Ok(Pool::from_ids(decode_ids(&text)?))
    }
}

impl<S: PoolStore + ?Sized> PoolStore for &S {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }
}
