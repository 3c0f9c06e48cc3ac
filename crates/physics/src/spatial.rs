//! Chunked spatial store for world objects.
//!
//! Small objects live in exactly one bucket keyed by the chunk containing their
//! centre. Objects whose footprint exceeds one chunk on either axis live in an
//! overflow list and are returned by every query, so nothing spanning a chunk
//! boundary is ever missed.
//!
//! Queries return every object bucketed in a chunk near the rectangle; they do
//! not filter per object. Callers apply their own exact test.

use std::collections::HashMap;

use engine_core::{ObjectId, Rect, WorldObject, CHUNK_SIZE};

/// Integer chunk coordinates.
pub type ChunkKey = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Chunk(ChunkKey),
    Large,
}

/// Chunk key for a world position.
pub fn chunk_key(x: f32, y: f32) -> ChunkKey {
    (
        (x / CHUNK_SIZE).floor() as i32,
        (y / CHUNK_SIZE).floor() as i32,
    )
}

#[derive(Debug, Default)]
pub struct SpatialStore {
    chunks: HashMap<ChunkKey, Vec<WorldObject>>,
    large: Vec<WorldObject>,
    index: HashMap<ObjectId, Slot>,
}

impl SpatialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object. An object already stored under the same id is replaced.
    pub fn insert(&mut self, obj: WorldObject) {
        if self.index.contains_key(&obj.id) {
            log::debug!("Replacing object {:?} already in the store", obj.id);
            self.remove(obj.id);
        }

        if obj.is_large() {
            self.index.insert(obj.id, Slot::Large);
            self.large.push(obj);
        } else {
            let c = obj.center();
            let key = chunk_key(c.x, c.y);
            self.index.insert(obj.id, Slot::Chunk(key));
            self.chunks.entry(key).or_default().push(obj);
        }
    }

    /// Remove an object by id. Unknown ids are a silent no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<WorldObject> {
        let slot = self.index.remove(&id)?;
        match slot {
            Slot::Large => {
                let pos = self.large.iter().position(|o| o.id == id)?;
                Some(self.large.swap_remove(pos))
            }
            Slot::Chunk(key) => {
                let bucket = self.chunks.get_mut(&key)?;
                let pos = bucket.iter().position(|o| o.id == id)?;
                let obj = bucket.swap_remove(pos);
                if bucket.is_empty() {
                    self.chunks.remove(&key);
                }
                Some(obj)
            }
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        match self.index.get(&id)? {
            Slot::Large => self.large.iter().find(|o| o.id == id),
            Slot::Chunk(key) => self.chunks.get(key)?.iter().find(|o| o.id == id),
        }
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        match self.index.get(&id)? {
            Slot::Large => self.large.iter_mut().find(|o| o.id == id),
            Slot::Chunk(key) => self.chunks.get_mut(key)?.iter_mut().find(|o| o.id == id),
        }
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.large.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All large objects plus every object bucketed in a chunk overlapping
    /// `region` widened by half a chunk.
    pub fn query_region(&self, region: &Rect) -> Vec<&WorldObject> {
        let mut out: Vec<&WorldObject> = self.large.iter().collect();

        // A small object's centre is at most half a chunk from any point of its
        // footprint, so widening the search by that much catches straddlers.
        let search = region.expand(CHUNK_SIZE * 0.5);
        let (x0, y0) = chunk_key(search.left(), search.top());
        let (x1, y1) = chunk_key(search.right(), search.bottom());
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(bucket) = self.chunks.get(&(cx, cy)) {
                    out.extend(bucket.iter());
                }
            }
        }
        out
    }

    /// Every stored object, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.large.iter().chain(self.chunks.values().flatten())
    }
}
