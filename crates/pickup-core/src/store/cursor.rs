//! CursorStore - 処理済みカーソルの永続化
//!
//! ファイルの中身は 10 進整数 1 つだけ。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::StoreError;
use super::atomic::write_atomic;
use crate::domain::Cursor;

#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cursor.
    ///
    /// A missing file, an empty file or anything but one non-negative integer
    /// (surrounding whitespace allowed) is `StoreError::CorruptCursor`.
    pub fn read(&self) -> Result<Cursor, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(self.corrupt("file does not exist"));
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let value = raw.trim();
        if value.is_empty() {
            return Err(self.corrupt("file is empty"));
        }
        value
            .parse::<u64>()
            .map(Cursor::new)
            .map_err(|_| self.corrupt(format!("{value:?} is not a non-negative integer")))
    }

    /// Overwrites the cursor atomically.
    pub fn write(&self, cursor: Cursor) -> Result<(), StoreError> {
        write_atomic(&self.path, cursor.to_string().as_bytes())?;
        info!(cursor = cursor.get(), "Updated last order");
        Ok(())
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::CorruptCursor {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store_with(content: Option<&str>) -> (TempDir, CursorStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_order.txt");
        if let Some(content) = content {
            fs::write(&path, content).unwrap();
        }
        (dir, CursorStore::new(path))
    }

    #[rstest]
    #[case::plain("10", 10)]
    #[case::trailing_newline("10\n", 10)]
    #[case::padded("  42  ", 42)]
    #[case::zero("0", 0)]
    fn reads_decimal_integer(#[case] content: &str, #[case] expected: u64) {
        let (_dir, store) = store_with(Some(content));
        assert_eq!(store.read().unwrap(), Cursor::new(expected));
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n")]
    #[case::negative("-1")]
    #[case::text("ten")]
    #[case::two_lines("10\n11")]
    fn rejects_corrupt_content(#[case] content: &str) {
        let (_dir, store) = store_with(Some(content));
        assert!(matches!(store.read(), Err(StoreError::CorruptCursor { .. })));
    }

    #[test]
    fn missing_file_is_corrupt() {
        let (_dir, store) = store_with(None);
        assert!(matches!(store.read(), Err(StoreError::CorruptCursor { .. })));
    }

    #[test]
    fn write_then_read_returns_the_value() {
        let (_dir, store) = store_with(Some("10"));
        store.write(Cursor::new(12)).unwrap();

        assert_eq!(store.read().unwrap(), Cursor::new(12));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "12");
    }
}
