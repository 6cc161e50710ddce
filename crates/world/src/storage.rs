use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::blocks;
use crate::chunk::{BlockId, Chunk, ChunkPos, ExternalBiomeId, WorldBounds};

/// World access used by every generation stage.
///
/// Chunk-local reads and writes go through [`Chunk`]; the world-absolute
/// helpers resolve the owning chunk first and silently ignore columns whose
/// chunk is not resident.
pub trait ChunkAccess {
    fn bounds(&self) -> WorldBounds;

    fn chunk(&self, pos: ChunkPos) -> Option<&Chunk>;

    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk>;

    fn min_y(&self) -> i32 {
        self.bounds().min_y
    }

    fn max_y(&self) -> i32 {
        self.bounds().max_y
    }

    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.chunk(ChunkPos::containing(x, z))
            .map(|chunk| chunk.block((x & 15) as usize, y, (z & 15) as usize))
            .unwrap_or(blocks::AIR)
    }

    fn set_block_at(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> bool {
        self.chunk_mut(ChunkPos::containing(x, z))
            .map(|chunk| chunk.set_block((x & 15) as usize, y, (z & 15) as usize, id))
            .unwrap_or(false)
    }

    fn set_biome_at(&mut self, x: i32, y: i32, z: i32, id: ExternalBiomeId) -> bool {
        self.chunk_mut(ChunkPos::containing(x, z))
            .map(|chunk| chunk.set_biome_id((x & 15) as usize, y, (z & 15) as usize, id))
            .unwrap_or(false)
    }
}

/// In-memory chunk arena with an LRU eviction policy.
/// Uses BTreeMap for deterministic iteration order.
pub struct ChunkStorage {
    chunks: BTreeMap<ChunkPos, Chunk>,
    lru: LruCache<ChunkPos, ()>,
    capacity: usize,
    bounds: WorldBounds,
}

impl ChunkStorage {
    /// Create a storage with the desired maximum chunk count.
    pub fn new(capacity: usize, bounds: WorldBounds) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunks: BTreeMap::new(),
            lru: LruCache::new(cap),
            capacity: cap.get(),
            bounds,
        }
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks are currently stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Obtain mutable access to a chunk, creating an empty one if necessary.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> &mut Chunk {
        if !self.chunks.contains_key(&pos) {
            self.evict_if_needed();
        }
        self.touch(pos);
        let bounds = self.bounds;
        self.chunks
            .entry(pos)
            .or_insert_with(|| Chunk::new(pos, bounds))
    }

    /// Attempt to fetch a chunk immutably.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Fetch a chunk mutably (without creating it).
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        if self.chunks.contains_key(&pos) {
            self.touch(pos);
        }
        self.chunks.get_mut(&pos)
    }

    /// Drop a chunk, returning it if it was resident.
    pub fn remove(&mut self, pos: ChunkPos) -> Option<Chunk> {
        self.lru.pop(&pos);
        self.chunks.remove(&pos)
    }

    /// Iterate over currently resident chunk positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    fn touch(&mut self, pos: ChunkPos) {
        self.lru.put(pos, ());
    }

    fn evict_if_needed(&mut self) {
        while self.chunks.len() >= self.capacity {
            if let Some((oldest, _)) = self.lru.pop_lru() {
                self.chunks.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

impl ChunkAccess for ChunkStorage {
    fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.get(pos)
    }

    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.get_mut(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(capacity: usize) -> ChunkStorage {
        ChunkStorage::new(capacity, WorldBounds::default())
    }

    #[test]
    fn storage_evicts_old_chunks() {
        let mut storage = storage(2);
        let a = ChunkPos::new(0, 0);
        let b = ChunkPos::new(1, 0);
        let c = ChunkPos::new(2, 0);
        storage.ensure_chunk(a);
        storage.ensure_chunk(b);
        assert_eq!(storage.len(), 2);
        storage.ensure_chunk(c);
        assert_eq!(storage.len(), 2);
        // `a` is the least recently used.
        assert!(storage.get(a).is_none());
        assert!(storage.get(b).is_some());
        assert!(storage.get(c).is_some());
    }

    #[test]
    fn iter_positions_is_sorted() {
        let mut storage = storage(8);
        storage.ensure_chunk(ChunkPos::new(1, 0));
        storage.ensure_chunk(ChunkPos::new(-1, 2));
        storage.ensure_chunk(ChunkPos::new(0, 0));
        let positions: Vec<_> = storage.iter_positions().collect();
        assert_eq!(
            positions,
            vec![
                ChunkPos::new(-1, 2),
                ChunkPos::new(0, 0),
                ChunkPos::new(1, 0)
            ]
        );
    }

    #[test]
    fn world_absolute_access_resolves_owning_chunk() {
        let mut storage = storage(4);
        storage.ensure_chunk(ChunkPos::new(-1, 0));
        assert!(storage.set_block_at(-1, 10, 5, blocks::STONE));
        assert_eq!(storage.block_at(-1, 10, 5), blocks::STONE);
        let chunk = storage.get(ChunkPos::new(-1, 0)).unwrap();
        assert_eq!(chunk.block(15, 10, 5), blocks::STONE);
    }

    #[test]
    fn writes_to_missing_chunks_are_ignored() {
        let mut storage = storage(4);
        assert!(!storage.set_block_at(100, 10, 100, blocks::STONE));
        assert_eq!(storage.block_at(100, 10, 100), blocks::AIR);
        assert!(storage.is_empty());
    }

    #[test]
    fn remove_forgets_chunk() {
        let mut storage = storage(4);
        let pos = ChunkPos::new(3, 3);
        storage.ensure_chunk(pos);
        assert!(storage.remove(pos).is_some());
        assert!(storage.get(pos).is_none());
        assert!(storage.remove(pos).is_none());
    }
}
