//! In-memory task store.
//!
//! Records live for the life of the process; there is no persistence. The
//! store is capped: when an insert would exceed the cap, the oldest terminal
//! records are evicted first. Records still in flight are never evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::task::{TaskError, TaskRecord, TaskStatus, TaskStore, TaskUpdate};

/// Default cap on stored records.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// In-memory [`TaskStore`] implementation.
///
/// Interior mutability through a single `RwLock` so the store is safe to
/// share across the multi-threaded runtime; every operation takes the lock
/// for its full read-modify-write step.
pub struct MemoryTaskStore {
    records: RwLock<HashMap<String, TaskRecord>>,
    sequence: AtomicU64,
    max_records: usize,
}

impl MemoryTaskStore {
    /// Create a store with the default record cap.
    pub fn new() -> Self {
        Self::with_max_records(DEFAULT_MAX_RECORDS)
    }

    /// Create a store with an explicit record cap.
    pub fn with_max_records(max_records: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            max_records,
        }
    }

    /// Allocate the next task id: monotonic sequence plus a random suffix,
    /// so ids stay unique even across store re-creation in tests.
    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let suffix = Uuid::new_v4().simple().to_string();
        format!("task_{}_{}", seq, &suffix[..8])
    }

    /// Evict oldest terminal records until there is room for one insert.
    /// Must be called with the write lock held.
    fn evict_for_insert(&self, records: &mut HashMap<String, TaskRecord>) {
        while records.len() >= self.max_records {
            let oldest_terminal = records
                .values()
                .filter(|r| r.status.is_terminal())
                .min_by_key(|r| r.created_at)
                .map(|r| r.task_id.clone());

            match oldest_terminal {
                Some(id) => {
                    debug!(task_id = %id, "evicting terminal task record at capacity");
                    records.remove(&id);
                }
                // Everything left is in flight; allow growth past the cap
                // rather than dropping live work.
                None => break,
            }
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for MemoryTaskStore {
    fn create(&self) -> TaskRecord {
        let now = Utc::now();
        let record = TaskRecord {
            task_id: self.next_id(),
            status: TaskStatus::Pending,
            message: "Task accepted".to_string(),
            result: None,
            error: None,
            processing_method: None,
            graph_error: None,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.write().unwrap();
        self.evict_for_insert(&mut records);
        records.insert(record.task_id.clone(), record.clone());
        record
    }

    fn get(&self, id: &str) -> Option<TaskRecord> {
        self.records.read().unwrap().get(id).cloned()
    }

    fn update(&self, id: &str, update: TaskUpdate) -> Result<TaskRecord, TaskError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        if let Some(new_status) = update.status {
            if record.status.is_terminal() || new_status.rank() < record.status.rank() {
                return Err(TaskError::InvalidTransition {
                    task_id: id.to_string(),
                    from: record.status.as_str(),
                    to: new_status.as_str(),
                });
            }
            record.status = new_status;
        } else if record.status.is_terminal() {
            // Terminal records are immutable, field updates included.
            return Err(TaskError::InvalidTransition {
                task_id: id.to_string(),
                from: record.status.as_str(),
                to: record.status.as_str(),
            });
        }

        if let Some(message) = update.message {
            record.message = message;
        }
        if let Some(result) = update.result {
            record.result = Some(result);
        }
        if let Some(error) = update.error {
            record.error = Some(error);
        }
        if let Some(method) = update.processing_method {
            record.processing_method = Some(method);
        }
        if let Some(graph_error) = update.graph_error {
            record.graph_error = Some(graph_error);
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> bool {
        self.records.write().unwrap().remove(id).is_some()
    }

    fn list_all(&self) -> Vec<TaskRecord> {
        self.records.read().unwrap().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }
}
