use std::{io, marker::PhantomData, path::{Path, PathBuf}};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};

use crate::errors::ServiceError;

/// Generic JSON file-backed record list.
///
/// Nothing is cached: every `load` reads the whole file and every `save`
/// rewrites it. A missing file reads as an empty list.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target, so
/// readers see either the old or the new list, never a half-written one. There
/// is no fsync; a crash can still lose the last write.
///
/// `save` and `update` share an in-process mutex. Other processes writing the
/// same file are not coordinated with.
pub struct JsonFileStore<T> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), write_lock: Mutex::new(()), _records: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and deserialize the whole file.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ServiceError::Storage(format!("cannot read {}: {e}", self.file_path.display())))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Storage(format!("malformed {}: {e}", self.file_path.display())))
    }

    /// Serialize and replace the whole file, creating parent directories if needed.
    pub async fn save(&self, records: &[T]) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        self.write_file(records).await
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    // caller holds `write_lock`
    async fn write_file(&self, records: &[T]) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("cannot create {}: {e}", parent.display())))?;
        }
        let data = serde_json::to_vec(records).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot replace {}: {e}", self.file_path.display())))
    }

    /// Load, apply `f`, and persist the result. Nothing is written when `f` fails.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let out = f(&mut records)?;
        self.write_file(&records).await?;
        Ok(out)
    }
}
