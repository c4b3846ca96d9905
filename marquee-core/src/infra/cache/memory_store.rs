//! Size-aware LRU of decoded images.
//!
//! The LRU table is not safe for concurrent mutation, so it lives inside a
//! single actor task. [`MemoryStore`] is a cheap, cloneable handle that sends
//! commands over a channel; nothing else can reach the table. Commands are
//! applied strictly in the order they were sent.

use std::fmt;

use lru::LruCache;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::key::ImageCacheKey;
use super::stats::MemoryStoreStats;
use crate::image::DecodedImage;
use crate::units::ByteSize;

struct MemoryTable {
    entries: LruCache<ImageCacheKey, DecodedImage>,
    resident_bytes: u64,
    budget_bytes: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl MemoryTable {
    fn new(budget: ByteSize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            resident_bytes: 0,
            budget_bytes: budget.as_bytes(),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn get(&mut self, key: &ImageCacheKey) -> Option<DecodedImage> {
        match self.entries.get(key) {
            Some(image) => {
                self.hits += 1;
                Some(image.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn put(&mut self, key: ImageCacheKey, image: DecodedImage) {
        let size = image.byte_size() as u64;
        if let Some(previous) = self.entries.put(key, image) {
            self.resident_bytes = self
                .resident_bytes
                .saturating_sub(previous.byte_size() as u64);
        }
        self.resident_bytes = self.resident_bytes.saturating_add(size);
        self.trim_to_budget();
    }

    fn trim_to_budget(&mut self) {
        while self.resident_bytes > self.budget_bytes {
            let Some((key, image)) = self.entries.pop_lru() else {
                self.resident_bytes = 0;
                break;
            };
            self.resident_bytes = self
                .resident_bytes
                .saturating_sub(image.byte_size() as u64);
            self.evictions += 1;
            debug!(
                key = %key,
                bytes = image.byte_size(),
                "memory image cache evicted"
            );
        }
    }

    fn evict_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.resident_bytes = 0;
        self.evictions += count as u64;
        count
    }

    fn stats(&self) -> MemoryStoreStats {
        MemoryStoreStats {
            entries: self.entries.len(),
            resident: ByteSize::from_bytes(self.resident_bytes),
            budget: ByteSize::from_bytes(self.budget_bytes),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

enum MemoryCommand {
    Get {
        key: ImageCacheKey,
        reply: oneshot::Sender<Option<DecodedImage>>,
    },
    Put {
        key: ImageCacheKey,
        image: DecodedImage,
        reply: oneshot::Sender<()>,
    },
    EvictAll,
    Stats {
        reply: oneshot::Sender<MemoryStoreStats>,
    },
    Shutdown,
}

/// Handle to the memory tier actor.
#[derive(Clone)]
pub struct MemoryStore {
    commands: mpsc::UnboundedSender<MemoryCommand>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("running", &self.is_running())
            .finish()
    }
}

impl MemoryStore {
    /// Start the actor owning the table. Must be called within a Tokio
    /// runtime.
    pub fn spawn(budget: ByteSize) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_actor(MemoryTable::new(budget), receiver));
        info!(budget = %budget, "memory image cache started");
        Self { commands }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub async fn get(&self, key: &ImageCacheKey) -> Option<DecodedImage> {
        let (reply, response) = oneshot::channel();
        let command = MemoryCommand::Get {
            key: key.clone(),
            reply,
        };
        if self.commands.send(command).is_err() {
            return None;
        }
        response.await.ok().flatten()
    }

    /// Insert or replace `key`, evicting least recently used entries while
    /// over budget. Resolves once the table has applied the insert.
    pub async fn put(&self, key: ImageCacheKey, image: DecodedImage) {
        let (reply, applied) = oneshot::channel();
        let command = MemoryCommand::Put { key, image, reply };
        if let Err(mpsc::error::SendError(MemoryCommand::Put { key, .. })) =
            self.commands.send(command)
        {
            debug!(key = %key, "memory image cache stopped; dropping put");
            return;
        }
        let _ = applied.await;
    }

    /// Drop every entry. Handles already given to callers stay valid.
    ///
    /// Callable from any thread without awaiting; requests sent afterwards
    /// observe the empty table.
    pub fn evict_all(&self) {
        if self.commands.send(MemoryCommand::EvictAll).is_err() {
            debug!("memory image cache stopped; nothing to evict");
        }
    }

    pub async fn stats(&self) -> MemoryStoreStats {
        let (reply, response) = oneshot::channel();
        if self.commands.send(MemoryCommand::Stats { reply }).is_err() {
            return MemoryStoreStats::default();
        }
        response.await.unwrap_or_default()
    }

    /// Stop the actor. Later lookups miss and later inserts are dropped.
    pub fn shutdown(&self) {
        let _ = self.commands.send(MemoryCommand::Shutdown);
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

async fn run_actor(
    mut table: MemoryTable,
    mut commands: mpsc::UnboundedReceiver<MemoryCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            MemoryCommand::Get { key, reply } => {
                let _ = reply.send(table.get(&key));
            }
            MemoryCommand::Put { key, image, reply } => {
                table.put(key, image);
                let _ = reply.send(());
            }
            MemoryCommand::EvictAll => {
                let evicted = table.evict_all();
                info!(evicted, "memory image cache cleared on low memory");
            }
            MemoryCommand::Stats { reply } => {
                let _ = reply.send(table.stats());
            }
            MemoryCommand::Shutdown => {
                commands.close();
                break;
            }
        }
    }
    debug!("memory image cache actor stopped");
}
