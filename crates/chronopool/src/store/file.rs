use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::PoolStore;

/// Default file name of a persisted pool.
pub const DEFAULT_FILENAME: &str = "id_list.txt";

/// A [`PoolStore`] backed by a single text file.
///
/// Writes go to a sibling `<path>.tmp` file that is flushed, synced and then
/// renamed over `path`, so readers never observe a partially written pool.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_FILENAME)
    }
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl PoolStore for FileStore {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let tmp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Pool};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chronopool_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = scratch_dir("file_missing");
        let store = FileStore::new(dir.join(DEFAULT_FILENAME));

        assert!(store.read().unwrap().is_none());
        assert!(store.is_blank().unwrap());
        let err = store.load_pool().unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::NotFound));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = scratch_dir("file_overwrite");
        let path = dir.join(DEFAULT_FILENAME);
        let store = FileStore::new(&path);

        store.save_pool(&Pool::from(vec![1, 2, 3, 4])).unwrap();
        store.save_pool(&Pool::from(vec![9, 8])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "9\n8");
        assert!(!store.temp_path().exists());
        assert_eq!(store.load_pool().unwrap().as_slice(), [9, 8]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_file_is_blank() {
        let dir = scratch_dir("file_empty");
        let path = dir.join(DEFAULT_FILENAME);
        fs::write(&path, "").unwrap();

        let store = FileStore::new(&path);
        assert!(store.is_blank().unwrap());
        assert!(store.load_pool().unwrap().is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = scratch_dir("file_no_parent");
        let store = FileStore::new(dir.join("absent").join(DEFAULT_FILENAME));
        assert!(store.write("1").is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
