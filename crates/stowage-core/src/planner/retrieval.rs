//! Retrieval-cost analysis: what must move to extract an item through the
//! container's open front face.

use crate::grid::OccupancyGrid;
use crate::types::{Result, RetrievalAction, RetrievalStep, StowageError};

use super::Session;

/// Ordered extraction plan for an item stowed in `grid`.
///
/// An item flush with the front face (`y1 == 0`) needs no steps. Otherwise
/// every distinct item occupying the forward prism (the target's x/z
/// footprint, all depths in front of it) must come out first: the plan lists
/// a `remove` per blocker in first-seen scan order, the `retrieve` of the
/// target, then a `placeBack` per blocker in the same order. The grid is
/// never mutated.
pub fn plan_retrieval(grid: &OccupancyGrid, item_id: &str) -> Result<Vec<RetrievalStep>> {
    let position = *grid
        .item_position(item_id)
        .ok_or_else(|| StowageError::UnknownItem(item_id.to_string()))?;

    let x1 = position.start_coordinates.width;
    let x2 = position.end_coordinates.width;
    let y1 = position.start_coordinates.depth;
    let z1 = position.start_coordinates.height;
    let z2 = position.end_coordinates.height;

    if y1 == 0 {
        return Ok(Vec::new());
    }

    let mut blockers: Vec<String> = Vec::new();
    for x in x1..x2 {
        for z in z1..z2 {
            for y in 0..y1 {
                if let Some(occupant) = grid.item_at(x, y, z) {
                    if occupant != item_id && !blockers.iter().any(|known| known == occupant) {
                        blockers.push(occupant.to_string());
                    }
                }
            }
        }
    }

    let mut steps = Vec::with_capacity(blockers.len() * 2 + 1);
    let mut number = 0u32;
    for blocker in &blockers {
        number += 1;
        steps.push(step(grid, number, RetrievalAction::Remove, blocker));
    }
    number += 1;
    steps.push(step(grid, number, RetrievalAction::Retrieve, item_id));
    for blocker in &blockers {
        number += 1;
        steps.push(step(grid, number, RetrievalAction::PlaceBack, blocker));
    }
    Ok(steps)
}

fn step(grid: &OccupancyGrid, number: u32, action: RetrievalAction, item_id: &str) -> RetrievalStep {
    RetrievalStep {
        step: number,
        action,
        item_id: item_id.to_string(),
        item_name: grid.item_name(item_id).unwrap_or_default().to_string(),
    }
}

impl Session {
    /// Retrieval plan for a registered item. Items without a placement need
    /// no steps; unknown ids are an error.
    pub fn retrieval_plan(&self, item_id: &str) -> Result<Vec<RetrievalStep>> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| StowageError::UnknownItem(item_id.to_string()))?;
        let Some(container_id) = &item.container_id else {
            return Ok(Vec::new());
        };
        let grid = self
            .grids
            .get(container_id)
            .ok_or_else(|| StowageError::UnknownContainer(container_id.clone()))?;
        plan_retrieval(grid, item_id)
    }
}
