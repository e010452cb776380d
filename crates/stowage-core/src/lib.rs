//! Core placement engine for three-dimensional cargo stowage.
//!
//! One voxel occupancy grid per container, a priority- and zone-aware
//! bin-packing planner on top, and a retrieval-cost analyzer that works out
//! which items must move to extract a buried one through the container's
//! open front face. Persistence, transport, and ingestion are the caller's
//! concern: this crate consumes plain item and container records and emits
//! placements, retrieval plans, and shortfall advice.

pub mod geometry;
pub mod grid;
pub mod planner;
pub mod types;

pub use grid::{FitSearch, OccupancyGrid};
pub use planner::{plan_retrieval, Planner, Session};
pub use types::{
    AdviceKind, Container, Coordinates, Dimensions, Item, Placement, PlacementRequest,
    PlacementResult, Position, PreloadedItem, RearrangementAdvice, Result, RetrievalAction,
    RetrievalStep, StowageError,
};
