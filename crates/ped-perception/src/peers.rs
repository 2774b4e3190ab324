//! Per-tick mutual visibility between pedestrians.
//!
//! Peer visibility is symmetric, so once `a` sees `b` there is no need to
//! ray-cast `b → a` in the same tick.  A [`VisibilityCache`] remembers every
//! pair found so far in one tick; it is built for exactly one tick and
//! thrown away afterwards.
//!
//! # Concurrency
//!
//! Each agent's set sits behind its own `Mutex`, and a query only ever holds
//! one of them at a time, so concurrent queries for different agents do not
//! contend.  [`PeerVisibility`] is the single-writer gate that (re)builds the
//! cache when the tick changes: the rebuild finishes under its lock, before
//! the `Arc` is handed to any query.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use ped_core::{AgentId, Tick, Vec2};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::VisibilityMap;

/// Minimal read-only view of a pedestrian for perception.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentView {
    pub id:       AgentId,
    pub position: Vec2,
}

impl AgentView {
    pub fn new(id: AgentId, position: Vec2) -> Self {
        Self { id, position }
    }
}

// ── VisibilityCache ───────────────────────────────────────────────────────────

/// Tick-scoped record of which peers each agent sees.
#[derive(Debug)]
pub struct VisibilityCache {
    tick:   Tick,
    agents: Vec<AgentView>,
    slots:  FxHashMap<AgentId, usize>,
    seen:   Vec<Mutex<FxHashSet<AgentId>>>,
}

fn lock(set: &Mutex<FxHashSet<AgentId>>) -> MutexGuard<'_, FxHashSet<AgentId>> {
    // A poisoned set still holds valid ids.
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl VisibilityCache {
    /// Empty cache for `tick` over the given alive agents.
    pub fn new(tick: Tick, agents: &[AgentView]) -> Self {
        let slots = agents.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
        let seen = agents.iter().map(|_| Mutex::new(FxHashSet::default())).collect();
        Self { tick, agents: agents.to_vec(), slots, seen }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn agents(&self) -> &[AgentView] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.slots.contains_key(&agent)
    }

    /// Every other agent that `agent` can see this tick.  Unknown agents
    /// see nobody.
    pub fn perceived_peers(&self, map: &VisibilityMap, agent: AgentId) -> BTreeSet<AgentId> {
        let mut peers = BTreeSet::new();
        let Some(&me) = self.slots.get(&agent) else {
            return peers;
        };
        let from = self.agents[me].position;

        for (other, view) in self.agents.iter().enumerate() {
            if other == me {
                continue;
            }

            if lock(&self.seen[other]).contains(&agent) {
                lock(&self.seen[me]).insert(view.id);
                peers.insert(view.id);
                continue;
            }

            if lock(&self.seen[me]).contains(&view.id) {
                lock(&self.seen[other]).insert(agent);
                peers.insert(view.id);
                continue;
            }

            if map.is_visible(from, view.position) {
                lock(&self.seen[me]).insert(view.id);
                lock(&self.seen[other]).insert(agent);
                peers.insert(view.id);
            }
        }
        peers
    }
}

// ── PeerVisibility ────────────────────────────────────────────────────────────

/// Hands out the cache for the current tick, rebuilding it on tick change
/// or after `invalidate`.
#[derive(Debug, Default)]
pub struct PeerVisibility {
    current: Mutex<Option<Arc<VisibilityCache>>>,
}

impl PeerVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache for `tick`.  A different stored tick (or none) is replaced
    /// by a fresh cache over `agents`.
    pub fn cache_for(&self, tick: Tick, agents: &[AgentView]) -> Arc<VisibilityCache> {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        match current.as_ref() {
            Some(cache) if cache.tick() == tick => Arc::clone(cache),
            _ => {
                let cache = Arc::new(VisibilityCache::new(tick, agents));
                *current = Some(Arc::clone(&cache));
                cache
            }
        }
    }

    /// Drop the stored cache so the next `cache_for` rebuilds even within
    /// the same tick.  Call whenever the agent set changes.
    pub fn invalidate(&self) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *current = None;
    }

    /// Tick of the stored cache, if any.
    pub fn current_tick(&self) -> Option<Tick> {
        let current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        current.as_ref().map(|c| c.tick())
    }
}
