//! In-memory collaborators for driving the editor without SQLite, disk or Telegram.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tourcore::content::{Catalog, Excursion, ExcursionId, FileRef};
use tourcore::storage::{ExcursionStore, FileGateway, IncomingFile, MediaSource};
use tourcore::{AppError, AppResult, EditorController};

/// Keeps the last saved copy of every excursion.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<HashMap<ExcursionId, Excursion>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryStore {
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn saved(&self, id: ExcursionId) -> Option<Excursion> {
        self.saved.lock().unwrap().get(&id).cloned()
    }
}

impl ExcursionStore for InMemoryStore {
    fn save(&self, excursion: &Excursion) -> AppResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Validation("database is read-only".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.saved.lock().unwrap().insert(excursion.id, excursion.clone());
        Ok(())
    }

    fn delete(&self, id: ExcursionId) -> AppResult<()> {
        self.saved.lock().unwrap().remove(&id);
        Ok(())
    }

    fn load_all(&self) -> AppResult<Vec<Excursion>> {
        Ok(self.saved.lock().unwrap().values().cloned().collect())
    }
}

/// Media store in a map; remembers every deletion.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    files: Mutex<HashMap<FileRef, Bytes>>,
    deleted: Mutex<Vec<FileRef>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
}

impl InMemoryGateway {
    /// Pretends `keys` were uploaded earlier.
    pub fn with_files(keys: &[&str]) -> Self {
        let gateway = Self::default();
        {
            let mut files = gateway.files.lock().unwrap();
            for key in keys {
                files.insert(FileRef::new(*key), Bytes::from_static(b"old"));
            }
        }
        gateway
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, file: &FileRef) -> bool {
        self.files.lock().unwrap().contains_key(file)
    }

    pub fn deleted(&self) -> Vec<FileRef> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn stored_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl FileGateway for InMemoryGateway {
    async fn upload(&self, bytes: Bytes, suggested_name: &str, directory: &str) -> AppResult<FileRef> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Media("quota exceeded".into()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = FileRef::new(format!("{}/{}-{}", directory, n, suggested_name));
        self.files.lock().unwrap().insert(reference.clone(), bytes);
        Ok(reference)
    }

    async fn fetch(&self, file: &FileRef) -> AppResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(file)
            .cloned()
            .ok_or_else(|| AppError::NotFound(file.to_string()))
    }

    async fn delete(&self, file: &FileRef) -> AppResult<()> {
        self.files.lock().unwrap().remove(file);
        self.deleted.lock().unwrap().push(file.clone());
        Ok(())
    }
}

/// Serves the handle itself as file content; handles starting with `broken`
/// fail to download.
#[derive(Debug, Default)]
pub struct ScriptedMediaSource;

#[async_trait]
impl MediaSource for ScriptedMediaSource {
    async fn download(&self, file: &IncomingFile) -> AppResult<Bytes> {
        if file.handle.starts_with("broken") {
            return Err(AppError::NotFound(file.handle.clone()));
        }
        Ok(Bytes::from(file.handle.clone()))
    }
}

pub struct Harness {
    pub controller: EditorController,
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<InMemoryGateway>,
}

impl Harness {
    pub fn new(excursions: Vec<Excursion>) -> Self {
        Self::with_gateway(excursions, InMemoryGateway::default())
    }

    pub fn with_gateway(excursions: Vec<Excursion>, gateway: InMemoryGateway) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let gateway = Arc::new(gateway);
        let controller = EditorController::new(
            Arc::new(Catalog::new(excursions)),
            store.clone(),
            gateway.clone(),
            Arc::new(ScriptedMediaSource),
        )
        .with_idle_timeout(None);
        Self {
            controller,
            store,
            gateway,
        }
    }
}
