use std::sync::atomic::{AtomicU64, Ordering};

use crate::units::ByteSize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStoreStatsSnapshot {
    pub reads: u64,
    pub hits: u64,
    pub misses: u64,
    pub read_errors: u64,
    pub writes: u64,
    pub write_errors: u64,
}

#[derive(Debug, Default)]
pub struct DiskStoreStats {
    reads: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    read_errors: AtomicU64,
    writes: AtomicU64,
    write_errors: AtomicU64,
}

impl DiskStoreStats {
    pub fn on_hit(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_miss(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A read that failed for a reason other than a missing file. Still a miss.
    pub fn on_read_error(&self) {
        self.on_miss();
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_write_ok(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_write_err(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiskStoreStatsSnapshot {
        DiskStoreStatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the memory tier, produced by its actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStoreStats {
    pub entries: usize,
    pub resident: ByteSize,
    pub budget: ByteSize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Entry count and total size of the files under the disk cache root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub entries: u64,
    pub total: ByteSize,
}
