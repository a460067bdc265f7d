//! # Version Chain Resolution
//!
//! Discovers every version record reachable from a starting point by
//! walking previous-version links in both directions. The chain is the
//! unit of activation: all entities found here compete for the single
//! active slot.
//!
//! ## Algorithm
//!
//! The previous-version pointers encode a graph implicitly — each record
//! holds one backward edge, and the forward edges only exist as "which
//! records point at me" queries. [`ChainGraph::build`] materializes both
//! directions once as an arena indexed by `VersionId`, then
//! [`ChainGraph::resolve`] runs a breadth-first traversal over it:
//!
//! ```text
//! frontier ← {seed}
//! while frontier not empty:
//!     take v; skip if visited
//!     record v's entity
//!     follow v.previous        (backward edge, may dangle)
//!     follow children(v)       (forward edges)
//! ```
//!
//! The visited set guarantees termination even on cyclic data; a
//! dangling backward edge is recorded rather than silently skipped, and
//! strict callers (activation) turn it into an error. The whole thing is
//! a connected-components computation over one arena built in a single
//! linear pass.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use grc_core::{EntityId, GrcError, VersionId};
use grc_store::Tables;

// ─── ChainResolution ─────────────────────────────────────────────────

/// The outcome of one chain traversal.
#[derive(Debug, Clone, Default)]
pub struct ChainResolution {
    /// Every entity owning a visited version record.
    pub entities: BTreeSet<EntityId>,
    /// Every version record visited.
    pub versions: BTreeSet<VersionId>,
    /// Targets of backward edges that point at no record. Non-empty
    /// means the chain is broken.
    pub dangling: Vec<VersionId>,
    /// Whether some visited record has more than one successor. Forks
    /// collapse into one chain; this flag lets callers surface the
    /// condition.
    pub forked: bool,
}

impl ChainResolution {
    /// Fail if the traversal crossed a dangling pointer.
    pub fn require_intact(&self) -> Result<(), GrcError> {
        if let Some(missing) = self.dangling.first() {
            return Err(GrcError::DataIntegrity(format!(
                "chain references missing version {missing}"
            )));
        }
        Ok(())
    }

    /// The chain members, failing on a broken chain.
    pub fn into_entities(self) -> Result<BTreeSet<EntityId>, GrcError> {
        self.require_intact()?;
        Ok(self.entities)
    }
}

// ─── ChainGraph ──────────────────────────────────────────────────────

/// In-memory arena of the version graph, built once per resolution.
///
/// Rebuilt on every call rather than cached: the store may gain records
/// between resolutions, and the build is a single linear pass.
#[derive(Debug)]
pub struct ChainGraph {
    /// Each record's owning entity and backward edge.
    nodes: HashMap<VersionId, (EntityId, Option<VersionId>)>,
    /// Forward adjacency: which records name this one as previous.
    children: HashMap<VersionId, Vec<VersionId>>,
    /// Seeds per entity: the version records each entity row owns.
    by_entity: HashMap<EntityId, Vec<VersionId>>,
}

impl ChainGraph {
    /// Materialize the version graph from the store.
    pub fn build(tables: &Tables) -> Self {
        let mut nodes = HashMap::new();
        let mut children: HashMap<VersionId, Vec<VersionId>> = HashMap::new();
        let mut by_entity: HashMap<EntityId, Vec<VersionId>> = HashMap::new();

        for record in tables.versions() {
            nodes.insert(record.id, (record.entity_id, record.previous));
            by_entity.entry(record.entity_id).or_default().push(record.id);
            if let Some(prev) = record.previous {
                children.entry(prev).or_default().push(record.id);
            }
        }

        Self {
            nodes,
            children,
            by_entity,
        }
    }

    /// Resolve the chain containing one version record.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::NotFound`] if the seed record does not exist.
    pub fn resolve(&self, seed: VersionId) -> Result<ChainResolution, GrcError> {
        if !self.nodes.contains_key(&seed) {
            return Err(GrcError::not_found("version", seed));
        }
        Ok(self.traverse([seed]))
    }

    /// Resolve the chain containing all of an entity's version records.
    ///
    /// An entity with no version records yields an empty resolution; the
    /// activation coordinator treats that as a singleton chain.
    pub fn resolve_entity(&self, entity_id: EntityId) -> ChainResolution {
        let seeds: Vec<VersionId> = self
            .by_entity
            .get(&entity_id)
            .cloned()
            .unwrap_or_default();
        self.traverse(seeds)
    }

    fn traverse(&self, seeds: impl IntoIterator<Item = VersionId>) -> ChainResolution {
        let mut resolution = ChainResolution::default();
        let mut visited: HashSet<VersionId> = HashSet::new();
        let mut frontier: VecDeque<VersionId> = seeds.into_iter().collect();

        while let Some(current) = frontier.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(&(entity_id, previous)) = self.nodes.get(&current) else {
                // Frontier ids always name existing records.
                continue;
            };
            resolution.entities.insert(entity_id);
            resolution.versions.insert(current);

            // Backward edge: the record this one supersedes.
            if let Some(prev) = previous {
                if self.nodes.contains_key(&prev) {
                    if !visited.contains(&prev) {
                        frontier.push_back(prev);
                    }
                } else {
                    resolution.dangling.push(prev);
                }
            }

            // Forward edges: records superseding this one.
            if let Some(successors) = self.children.get(&current) {
                if successors.len() > 1 {
                    resolution.forked = true;
                }
                for &next in successors {
                    if !visited.contains(&next) {
                        frontier.push_back(next);
                    }
                }
            }
        }

        resolution
    }

    /// Find a backward-pointer cycle among the given records, if any.
    ///
    /// The backward edges form a functional graph (at most one outgoing
    /// edge per record), so a walk from each record either terminates or
    /// revisits a record on the current walk. Records proven cycle-free
    /// are memoized across walks.
    pub fn find_backward_cycle(&self, within: &BTreeSet<VersionId>) -> Option<VersionId> {
        let mut safe: HashSet<VersionId> = HashSet::new();

        for &start in within {
            let mut walk: Vec<VersionId> = Vec::new();
            let mut on_walk: HashSet<VersionId> = HashSet::new();
            let mut current = start;

            loop {
                if safe.contains(&current) {
                    break;
                }
                if !on_walk.insert(current) {
                    return Some(current);
                }
                walk.push(current);
                match self.nodes.get(&current).and_then(|&(_, prev)| prev) {
                    Some(prev) if self.nodes.contains_key(&prev) => current = prev,
                    _ => break,
                }
            }
            safe.extend(walk);
        }
        None
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
