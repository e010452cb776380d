use log::debug;
use rustc_hash::FxHashMap;

use crate::geometry;
use crate::grid::{FitSearch, OccupancyGrid};
use crate::types::{
    Container, Item, PlacementRequest, Position, Result, StowageError,
};

/// A live placement session: one grid per container, with item records
/// tracked across planning runs, manual placements, and retrieval queries.
///
/// A session owns its grids exclusively. Containers are fixed at
/// construction; items may be registered at any time. The only item fields
/// the session mutates are `container_id` and `position`.
pub struct Session {
    pub(super) containers: Vec<Container>,
    pub(super) grids: FxHashMap<String, OccupancyGrid>,
    pub(super) items: FxHashMap<String, Item>,
    /// Registration order, the stable baseline for planner ordering.
    pub(super) item_order: Vec<String>,
}

impl Session {
    /// Validates the containers and builds a session with empty grids.
    pub fn new(containers: Vec<Container>) -> Result<Self> {
        let mut grids = FxHashMap::default();
        for container in &containers {
            container.validate()?;
            grids.insert(
                container.container_id.clone(),
                OccupancyGrid::new(container),
            );
        }
        Ok(Self {
            containers,
            grids,
            items: FxHashMap::default(),
            item_order: Vec::new(),
        })
    }

    /// Builds a session from a request: registers every item, then replays
    /// the containers' preloaded placements into the grids.
    pub fn from_request(request: &PlacementRequest) -> Result<Self> {
        let mut session = Self::new(request.containers.clone())?;
        for item in &request.items {
            let mut item = item.clone();
            item.container_id = None;
            item.position = None;
            session.register_item(item)?;
        }
        for container in &request.containers {
            for preloaded in &container.preloaded_items {
                session.place_item_at(
                    &preloaded.item_id,
                    &container.container_id,
                    &preloaded.position,
                )?;
            }
        }
        Ok(session)
    }

    /// Registers an item with the session, validating its dimensions and
    /// priority. Re-registering an id replaces the previous record.
    pub fn register_item(&mut self, item: Item) -> Result<()> {
        item.validate()?;
        if !self.items.contains_key(&item.item_id) {
            self.item_order.push(item.item_id.clone());
        }
        self.items.insert(item.item_id.clone(), item);
        Ok(())
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    pub fn grid(&self, container_id: &str) -> Option<&OccupancyGrid> {
        self.grids.get(container_id)
    }

    /// Places a registered item at an explicit position. An already-placed
    /// item is moved; if the new position is rejected, the previous placement
    /// is restored before the error is returned.
    pub fn place_item_at(
        &mut self,
        item_id: &str,
        container_id: &str,
        position: &Position,
    ) -> Result<()> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| StowageError::UnknownItem(item_id.to_string()))?;
        let grid_dims = *self
            .grids
            .get(container_id)
            .ok_or_else(|| StowageError::UnknownContainer(container_id.to_string()))?
            .dimensions();

        if !position.fits_within(&grid_dims) {
            return Err(StowageError::OutOfBounds {
                container_id: container_id.to_string(),
            });
        }
        // a legal box is one orientation of the item, never a reshaping
        if !geometry::orientations(&item.dimensions).contains(&position.extents()) {
            return Err(StowageError::OutOfBounds {
                container_id: container_id.to_string(),
            });
        }

        let name = item.name.clone();
        let volume = item.volume();
        let previous = item.container_id.clone().zip(item.position);

        if let Some((previous_container, _)) = &previous {
            if let Some(grid) = self.grids.get_mut(previous_container) {
                grid.remove_item(item_id);
            }
        }

        let Some(grid) = self.grids.get_mut(container_id) else {
            return Err(StowageError::UnknownContainer(container_id.to_string()));
        };
        if grid.place_item(item_id, &name, volume, position) {
            if let Some(item) = self.items.get_mut(item_id) {
                item.container_id = Some(container_id.to_string());
                item.position = Some(*position);
            }
            debug!("item {item_id} placed in {container_id} at explicit position");
            Ok(())
        } else {
            if let Some((previous_container, previous_position)) = previous {
                let restored = self
                    .grids
                    .get_mut(&previous_container)
                    .map(|grid| grid.place_item(item_id, &name, volume, &previous_position));
                debug_assert_eq!(restored, Some(true));
            }
            Err(StowageError::Occupied {
                container_id: container_id.to_string(),
            })
        }
    }

    /// Clears a registered item's placement, if it has one.
    pub fn remove_item(&mut self, item_id: &str) -> Result<()> {
        let item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| StowageError::UnknownItem(item_id.to_string()))?;
        if let Some(container_id) = item.container_id.take() {
            item.position = None;
            let cleared = self
                .grids
                .get_mut(&container_id)
                .map(|grid| grid.remove_item(item_id));
            debug_assert_eq!(cleared, Some(true));
        }
        Ok(())
    }

    /// Best-fit query for one item against one container. Budget exhaustion
    /// without a candidate is an error so the caller can retry with a larger
    /// budget; a completed search with no fit is a plain `None`.
    pub fn find_best_fit(&self, item_id: &str, container_id: &str) -> Result<Option<Position>> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| StowageError::UnknownItem(item_id.to_string()))?;
        let grid = self
            .grids
            .get(container_id)
            .ok_or_else(|| StowageError::UnknownContainer(container_id.to_string()))?;
        match grid.find_best_fit(&item.dimensions) {
            FitSearch::Fit(position) => Ok(Some(position)),
            FitSearch::NoFit => Ok(None),
            FitSearch::Exhausted => Err(StowageError::BudgetExceeded {
                item_id: item_id.to_string(),
            }),
        }
    }

    pub(super) fn available_volume_of(&self, container_index: usize) -> u64 {
        self.grids[self.containers[container_index].container_id.as_str()].available_volume()
    }

    /// Writes a planner-chosen placement into the grid and the item record.
    pub(super) fn commit_placement(
        &mut self,
        item_id: &str,
        container_id: &str,
        position: &Position,
    ) -> bool {
        let Some(item) = self.items.get_mut(item_id) else {
            return false;
        };
        let Some(grid) = self.grids.get_mut(container_id) else {
            return false;
        };
        if !grid.place_item(item_id, &item.name, item.dimensions.volume(), position) {
            return false;
        }
        item.container_id = Some(container_id.to_string());
        item.position = Some(*position);
        true
    }
}
