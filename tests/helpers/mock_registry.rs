// ==========================================
// 内存版车辆台账 / 历史台账 - 用于集成测试
// ==========================================

use metro_induction::domain::{Depot, PlanSnapshot, Train};
use metro_induction::repository::{HistoryLedger, RepositoryError, RepositoryResult, TrainRegistry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ==========================================
// InMemoryRegistry
// ==========================================

pub struct InMemoryRegistry {
    trains: Mutex<Vec<Train>>,
    depots: Mutex<Vec<Depot>>,
    delay: Option<Duration>,
    offline: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new(trains: Vec<Train>, depots: Vec<Depot>) -> Self {
        Self {
            trains: Mutex::new(trains),
            depots: Mutex::new(depots),
            delay: None,
            offline: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    /// 每次读取前阻塞 delay（模拟慢台账）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn replace_trains(&self, trains: Vec<Train>) {
        *self.trains.lock().unwrap() = trains;
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn before_read(&self) -> RepositoryResult<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::RegistryUnavailable("registry offline".to_string()));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl TrainRegistry for InMemoryRegistry {
    fn list_trains(&self) -> RepositoryResult<Vec<Train>> {
        self.before_read()?;
        Ok(self.trains.lock().unwrap().clone())
    }

    fn list_depots(&self) -> RepositoryResult<Vec<Depot>> {
        self.before_read()?;
        Ok(self.depots.lock().unwrap().clone())
    }
}

// ==========================================
// InMemoryLedger
// ==========================================

#[derive(Default)]
pub struct InMemoryLedger {
    snapshots: Mutex<Vec<PlanSnapshot>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

impl HistoryLedger for InMemoryLedger {
    fn append(&self, snapshot: &PlanSnapshot) -> RepositoryResult<()> {
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.iter().any(|s| s.snapshot_id == snapshot.snapshot_id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "snapshot_id={}",
                snapshot.snapshot_id
            )));
        }
        snapshots.push(snapshot.clone());
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<PlanSnapshot>> {
        let snapshots = self.snapshots.lock().unwrap();
        Ok(snapshots.iter().rev().take(limit).cloned().collect())
    }
}
