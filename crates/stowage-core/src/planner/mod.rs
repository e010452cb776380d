//! Priority-ordered placement of items across zoned containers.

mod retrieval;
mod session;

pub use retrieval::plan_retrieval;
pub use session::Session;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::grid::FitSearch;
use crate::types::{
    AdviceKind, Dimensions, Item, Placement, PlacementRequest, PlacementResult, Position,
    RearrangementAdvice, Result,
};

/// Score penalty for candidates outside an item's preferred zone. This scale
/// ranks containers against each other within one pass; the grid's internal
/// `(z, x, y)` key ranks anchors within one container.
const ZONE_PENALTY: u64 = 1_000;

/// Plans a batch of items into a set of containers.
///
/// One-shot facade over [`Session`]: validates the request up front, replays
/// any preloaded placements, runs the placement loop, and returns the
/// aggregated result.
pub struct Planner {
    request: PlacementRequest,
}

impl Planner {
    /// Validates the request and builds a planner instance.
    pub fn new(request: PlacementRequest) -> Result<Self> {
        for container in &request.containers {
            container.validate()?;
        }
        for item in &request.items {
            item.validate()?;
        }
        Ok(Self { request })
    }

    /// Executes the full placement flow.
    pub fn plan(&self) -> Result<PlacementResult> {
        let mut session = Session::from_request(&self.request)?;
        Ok(session.plan_placements())
    }
}

impl Session {
    /// Places every registered, still-unplaced item.
    ///
    /// Items are taken in `(priority desc, volume desc)` order (stable for
    /// equal keys). Each item first tries the containers of its preferred
    /// zone, largest available space first; only when that pass yields
    /// nothing are the remaining zones searched under [`ZONE_PENALTY`].
    /// Items that fit nowhere are reported, never dropped.
    pub fn plan_placements(&mut self) -> PlacementResult {
        let mut queue: Vec<String> = self
            .item_order
            .iter()
            .filter(|id| {
                self.item(id.as_str())
                    .map_or(false, |item| item.position.is_none())
            })
            .cloned()
            .collect();
        queue.sort_by(|a, b| {
            let item_a = &self.items[a.as_str()];
            let item_b = &self.items[b.as_str()];
            item_b
                .priority
                .cmp(&item_a.priority)
                .then(item_b.volume().cmp(&item_a.volume()))
        });

        info!(
            "planning placement of {} items across {} containers",
            queue.len(),
            self.containers.len()
        );

        let mut zone_buckets: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, container) in self.containers.iter().enumerate() {
            zone_buckets
                .entry(container.zone.clone())
                .or_default()
                .push(index);
        }
        for bucket in zone_buckets.values_mut() {
            bucket.sort_by(|&a, &b| {
                self.available_volume_of(b).cmp(&self.available_volume_of(a))
            });
        }

        let mut placements: Vec<Placement> = Vec::with_capacity(queue.len());
        let mut unplaced: Vec<String> = Vec::new();

        for item_id in queue {
            let item = &self.items[item_id.as_str()];
            let dims = item.dimensions;
            let volume = item.volume();
            let preferred_zone = item.preferred_zone.clone();

            let mut winner = match zone_buckets.get(preferred_zone.as_str()) {
                Some(bucket) => self.best_candidate(
                    &item_id,
                    &dims,
                    volume,
                    bucket.iter().copied(),
                    false,
                ),
                None => None,
            };

            if winner.is_none() {
                debug!("item {item_id}: no fit in preferred zone {preferred_zone}, trying others");
                let fallback = (0..self.containers.len())
                    .filter(|&index| self.containers[index].zone != preferred_zone);
                winner = self.best_candidate(&item_id, &dims, volume, fallback, true);
            }

            match winner {
                Some((_, container_index, position)) => {
                    let container_id = self.containers[container_index].container_id.clone();
                    let committed = self.commit_placement(&item_id, &container_id, &position);
                    debug_assert!(committed);
                    placements.push(Placement {
                        item_id,
                        container_id,
                        position,
                    });
                }
                None => {
                    debug!("item {item_id}: no feasible position in any container");
                    unplaced.push(item_id);
                }
            }
        }

        let rearrangements = expansion_advice(&unplaced, &self.items);
        info!(
            "placement complete: {} placed, {} unplaced",
            placements.len(),
            unplaced.len()
        );
        PlacementResult {
            success: unplaced.is_empty(),
            placements,
            rearrangements,
            unplaced_items: unplaced,
        }
    }

    /// Best-scored candidate across the given containers, or None when the
    /// item fits in none of them.
    fn best_candidate(
        &self,
        item_id: &str,
        dims: &Dimensions,
        volume: u64,
        container_indices: impl Iterator<Item = usize>,
        penalized: bool,
    ) -> Option<(u64, usize, Position)> {
        let mut best: Option<(u64, usize, Position)> = None;
        for index in container_indices {
            let container_id = self.containers[index].container_id.as_str();
            let grid = &self.grids[container_id];
            if grid.available_volume() < volume {
                continue;
            }
            match grid.find_best_fit(dims) {
                FitSearch::Fit(position) => {
                    let score = placement_score(&position, penalized);
                    if best.as_ref().map_or(true, |(top, _, _)| score < *top) {
                        best = Some((score, index, position));
                    }
                }
                FitSearch::Exhausted => warn!(
                    "item {item_id}: fit search budget exhausted in container {container_id}"
                ),
                FitSearch::NoFit => {}
            }
        }
        best
    }
}

/// Ranks a candidate across containers: low, left, and front positions win,
/// and everything outside the preferred zone starts a flat penalty behind.
fn placement_score(position: &Position, penalized: bool) -> u64 {
    let start = position.start_coordinates;
    let base = start.height as u64 * 10 + start.width as u64 + start.depth as u64;
    if penalized {
        ZONE_PENALTY + base
    } else {
        base
    }
}

fn expansion_advice(
    unplaced: &[String],
    items: &FxHashMap<String, Item>,
) -> Vec<RearrangementAdvice> {
    if unplaced.is_empty() {
        return Vec::new();
    }
    let needed: u64 = unplaced.iter().map(|id| items[id.as_str()].volume()).sum();
    vec![RearrangementAdvice {
        kind: AdviceKind::Expansion,
        message: format!("Need additional {needed} cubic units of space"),
        items: unplaced.to_vec(),
    }]
}
