//! # Chunk Streaming
//!
//! Keeps the resident chunks in step with a square window around the player.
//!
//! # Architecture
//! - `reconcile`: diffs the needed window against the loaded set. Unloads
//!   happen immediately; loads become generation requests for the worker
//!   pool, or are served from the cache of recently generated chunks.
//! - `drain`: merges at most a budget of finished chunks per tick into the
//!   terrain and uploads their meshes. Results for chunks that left the
//!   window while generating are dropped here without touching any state.
//! - `rebuild_dirty`: re-meshes resident chunks whose blocks changed, on the
//!   main thread, from the chunk's current blocks.
//!
//! # Chunk States
//! A coordinate is in at most one of `pending` (requested, not yet merged)
//! and `loaded` (blocks merged and mesh uploaded).

use std::{
    collections::{HashSet, VecDeque},
    num::NonZeroUsize,
};

use log::{debug, info, warn};
use lru::LruCache;

use crate::{
    core::{config::WorldConfig, error::StreamerError},
    engine_state::{
        buffer_state::{MeshBackend, MeshResource, MeshResourceTable},
        rendering::meshing::build_chunk_mesh,
        task_management::TaskManager,
        voxels::{
            chunk::{
                generation::{ChunkGenerator, GeneratedChunk},
                ChunkCoord, ChunkLayout,
            },
            tasks::chunk_generation_task::{ChunkGenerationResult, ChunkGenerationTask},
            terrain::Terrain,
        },
    },
};

/// Streams chunks in and out around a moving centre.
pub struct ChunkStreamer<B: MeshBackend> {
    layout: ChunkLayout,
    render_distance: i32,
    loads_per_frame: usize,
    generator: ChunkGenerator,
    task_manager: TaskManager<ChunkGenerationTask>,
    generated_cache: Option<LruCache<ChunkCoord, ChunkGenerationResult>>,
    cache_hits: VecDeque<ChunkGenerationResult>,
    center: Option<ChunkCoord>,
    needed: HashSet<ChunkCoord>,
    pending: HashSet<ChunkCoord>,
    loaded: HashSet<ChunkCoord>,
    meshes: MeshResourceTable<B>,
}

impl<B: MeshBackend> ChunkStreamer<B> {
    /// Creates a streamer and starts its generation workers.
    ///
    /// # Arguments
    /// * `config` - Window radius, merge budget, worker count and cache size
    /// * `generator` - Produces chunk content on the workers
    /// * `backend` - Uploads chunk meshes
    pub fn new(config: &WorldConfig, generator: ChunkGenerator, backend: B) -> Self {
        ChunkStreamer {
            layout: generator.layout(),
            render_distance: config.render_distance,
            loads_per_frame: config.loads_per_frame,
            generator,
            task_manager: TaskManager::new(config.generation_workers),
            generated_cache: NonZeroUsize::new(config.generated_cache_capacity).map(LruCache::new),
            cache_hits: VecDeque::new(),
            center: None,
            needed: HashSet::new(),
            pending: HashSet::new(),
            loaded: HashSet::new(),
            meshes: MeshResourceTable::new(backend),
        }
    }

    /// Updates the window around `center`.
    ///
    /// Chunks that left the window are unloaded right away: their blocks and
    /// bullet marks are removed from `terrain` and their meshes released.
    /// Chunks that entered it are requested, nearest first.
    ///
    /// # Returns
    /// The chunks that were unloaded, so entities spawned by them can be evicted.
    pub fn reconcile(&mut self, center: ChunkCoord, terrain: &mut Terrain) -> Vec<ChunkCoord> {
        if self.center != Some(center) {
            self.center = Some(center);
            self.needed = self.layout.window(center, self.render_distance).collect();
        }

        let mut unloaded: Vec<ChunkCoord> = self
            .loaded
            .iter()
            .filter(|coord| !self.needed.contains(coord))
            .copied()
            .collect();
        unloaded.sort();
        for coord in &unloaded {
            let removed = terrain.clear_chunk(*coord);
            self.meshes.release(*coord);
            self.loaded.remove(coord);
            debug!("Unloaded chunk {:?} ({} blocks)", coord, removed);
        }

        let needed = &self.needed;
        self.pending.retain(|coord| needed.contains(coord));
        self.cache_hits
            .retain(|result| needed.contains(&result.chunk.coord));

        let mut to_load: Vec<ChunkCoord> = self
            .needed
            .iter()
            .filter(|coord| !self.loaded.contains(coord) && !self.pending.contains(coord))
            .copied()
            .collect();
        to_load.sort_by_key(|coord| (coord.chebyshev_distance(center), *coord));

        for coord in to_load {
            self.pending.insert(coord);
            let cached = self
                .generated_cache
                .as_mut()
                .and_then(|cache| cache.get(&coord).cloned());
            match cached {
                Some(result) => {
                    debug!("Chunk {:?} served from cache", coord);
                    self.cache_hits.push_back(result);
                }
                None => {
                    debug!("Requesting chunk {:?}", coord);
                    self.task_manager
                        .publish_task(ChunkGenerationTask::new(self.generator.clone(), coord));
                }
            }
        }
        self.task_manager.process_queued_tasks();

        unloaded
    }

    /// Merges up to the configured budget of finished chunks.
    pub fn drain(&mut self, terrain: &mut Terrain) -> Result<Vec<GeneratedChunk>, StreamerError> {
        self.drain_with_budget(self.loads_per_frame, terrain)
    }

    /// Merges up to `budget` finished chunks into `terrain` and uploads their meshes.
    ///
    /// Results for chunks no longer in the window, or already loaded, are
    /// discarded without mutating anything.
    ///
    /// # Returns
    /// The merged chunks, whose pickups and enemies the caller should spawn.
    ///
    /// # Errors
    /// `StreamerError::WorkersDisconnected` when every generation worker is
    /// gone and there were no cache hits left to merge.
    pub fn drain_with_budget(
        &mut self,
        budget: usize,
        terrain: &mut Terrain,
    ) -> Result<Vec<GeneratedChunk>, StreamerError> {
        let mut results = Vec::new();
        while results.len() < budget {
            match self.cache_hits.pop_front() {
                Some(result) => results.push(result),
                None => break,
            }
        }

        if results.len() < budget {
            self.task_manager.process_queued_tasks();
            let generated = match self
                .task_manager
                .process_completed_tasks(budget - results.len())
            {
                Ok(generated) => generated,
                Err(err) if results.is_empty() => return Err(err),
                Err(err) => {
                    warn!("{}; merging {} cached chunk(s) first", err, results.len());
                    Vec::new()
                }
            };
            if let Some(cache) = self.generated_cache.as_mut() {
                for result in &generated {
                    cache.put(result.chunk.coord, result.clone());
                }
            }
            results.extend(generated);
        }

        let mut merged = Vec::with_capacity(results.len());
        for result in results {
            let coord = result.chunk.coord;
            if !self.needed.contains(&coord) || self.loaded.contains(&coord) {
                warn!("Discarding stale result for chunk {:?}", coord);
                continue;
            }
            terrain.insert_chunk(&result.chunk);
            self.meshes.replace(coord, &result.mesh);
            self.pending.remove(&coord);
            self.loaded.insert(coord);
            debug!(
                "Merged chunk {:?}: {} blocks, {} triangles",
                coord,
                result.chunk.blocks.len(),
                result.mesh.triangle_count()
            );
            merged.push(result.chunk);
        }

        if !merged.is_empty() && self.is_booted() && self.pending.is_empty() {
            info!("All {} chunks around {:?} are resident", self.loaded.len(), self.center);
        }
        Ok(merged)
    }

    /// Re-meshes every resident chunk whose blocks changed since the last call.
    ///
    /// Changed chunks are also dropped from the generation cache.
    ///
    /// # Returns
    /// The number of meshes rebuilt.
    pub fn rebuild_dirty(&mut self, terrain: &mut Terrain) -> usize {
        let mut rebuilt = 0;
        for coord in terrain.take_dirty_chunks() {
            if let Some(cache) = self.generated_cache.as_mut() {
                cache.pop(&coord);
            }
            if !self.loaded.contains(&coord) {
                continue;
            }
            let mesh = build_chunk_mesh(&terrain.chunk_blocks(coord));
            self.meshes.replace(coord, &mesh);
            rebuilt += 1;
            debug!("Rebuilt mesh for chunk {:?}", coord);
        }
        rebuilt
    }

    /// Returns true once every chunk in the window has a resident mesh.
    pub fn is_booted(&self) -> bool {
        !self.needed.is_empty() && self.needed.iter().all(|coord| self.meshes.contains(*coord))
    }

    /// Resident chunk meshes.
    pub fn meshes(&self) -> impl Iterator<Item = (ChunkCoord, &MeshResource<B::Handle>)> {
        self.meshes.iter()
    }

    pub fn mesh_table(&self) -> &MeshResourceTable<B> {
        &self.meshes
    }

    pub fn loaded_chunks(&self) -> &HashSet<ChunkCoord> {
        &self.loaded
    }

    pub fn needed_chunks(&self) -> &HashSet<ChunkCoord> {
        &self.needed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains(&coord)
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// Number of generated chunks held for fast reloads.
    pub fn cached_chunk_count(&self) -> usize {
        self.generated_cache.as_ref().map_or(0, |cache| cache.len())
    }
}
