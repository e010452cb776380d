use serde::{Deserialize, Serialize};

/// Extents along the three container axes, in whole voxels.
///
/// `width` runs left to right, `depth` runs from the open front face towards
/// the back, `height` runs bottom to top. Every extent must be strictly
/// positive for the owning record to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub depth: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn volume(&self) -> u64 {
        self.width as u64 * self.depth as u64 * self.height as u64
    }
}

/// A voxel corner, expressed as offsets along the same three axes.
///
/// The wire format reuses the axis names of [`Dimensions`] for coordinates,
/// so `width`/`depth`/`height` are the x/y/z offsets of the corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub width: u32,
    pub depth: u32,
    pub height: u32,
}

/// Axis-aligned box in container-local voxel coordinates, half-open on every
/// axis: voxel `(x, y, z)` belongs to the box iff `start <= axis < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub start_coordinates: Coordinates,
    pub end_coordinates: Coordinates,
}

impl Position {
    /// Box spanned by an anchor corner and the extents of one orientation.
    pub fn from_anchor(x: u32, y: u32, z: u32, extents: &Dimensions) -> Self {
        Self {
            start_coordinates: Coordinates {
                width: x,
                depth: y,
                height: z,
            },
            end_coordinates: Coordinates {
                width: x + extents.width,
                depth: y + extents.depth,
                height: z + extents.height,
            },
        }
    }

    /// Extents of the box. Only meaningful when `start < end` on every axis.
    pub fn extents(&self) -> Dimensions {
        Dimensions {
            width: self.end_coordinates.width - self.start_coordinates.width,
            depth: self.end_coordinates.depth - self.start_coordinates.depth,
            height: self.end_coordinates.height - self.start_coordinates.height,
        }
    }

    pub fn volume(&self) -> u64 {
        self.extents().volume()
    }

    /// `start < end` on every axis and the box lies inside `container`.
    pub fn fits_within(&self, container: &Dimensions) -> bool {
        self.start_coordinates.width < self.end_coordinates.width
            && self.start_coordinates.depth < self.end_coordinates.depth
            && self.start_coordinates.height < self.end_coordinates.height
            && self.end_coordinates.width <= container.width
            && self.end_coordinates.depth <= container.depth
            && self.end_coordinates.height <= container.height
    }
}

/// Cargo item. The core mutates only `container_id` and `position`; every
/// other field is carried through from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: String,
    pub name: String,
    pub dimensions: Dimensions,
    pub mass: f64,
    /// Placement priority, 1 (lowest) to 100 (highest).
    pub priority: u32,
    /// ISO-8601 timestamp, never interpreted by the engine.
    #[serde(default)]
    pub expiry_date: Option<String>,
    pub usage_limit: u32,
    #[serde(default)]
    pub usage_count: u32,
    pub preferred_zone: String,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub is_waste: bool,
    #[serde(default)]
    pub waste_reason: Option<String>,
}

impl Item {
    pub fn volume(&self) -> u64 {
        self.dimensions.volume()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.dimensions.volume() == 0 {
            return Err(StowageError::InvalidDimensions {
                id: self.item_id.clone(),
            });
        }
        if !(1..=100).contains(&self.priority) {
            return Err(StowageError::InvalidPriority {
                id: self.item_id.clone(),
                priority: self.priority,
            });
        }
        Ok(())
    }
}

/// Item already stowed in a container when planning starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadedItem {
    pub item_id: String,
    pub position: Position,
}

/// Storage container, grouped into zones for placement preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub container_id: String,
    pub zone: String,
    pub dimensions: Dimensions,
    /// Sum of the volumes of contained items, as reported by the caller.
    /// The session's grids are the live source of truth.
    #[serde(default)]
    pub occupied_volume: u64,
    /// Items to replay into the grid before planning (replanning scenarios).
    /// The ids must appear in the request's item list.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub preloaded_items: Vec<PreloadedItem>,
}

impl Container {
    pub fn total_volume(&self) -> u64 {
        self.dimensions.volume()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.dimensions.volume() == 0 {
            return Err(StowageError::InvalidDimensions {
                id: self.container_id.clone(),
            });
        }
        Ok(())
    }
}

/// Input: items to stow and the containers available to hold them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
}

/// One committed placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub item_id: String,
    pub container_id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdviceKind {
    /// The containers are short on space; more capacity is needed.
    Expansion,
}

/// Suggestion emitted when the batch could not be placed completely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RearrangementAdvice {
    #[serde(rename = "type")]
    pub kind: AdviceKind,
    pub message: String,
    pub items: Vec<String>,
}

/// Output: what the planner returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    /// True iff every requested item was placed.
    pub success: bool,
    pub placements: Vec<Placement>,
    pub rearrangements: Vec<RearrangementAdvice>,
    pub unplaced_items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RetrievalAction {
    Remove,
    Retrieve,
    PlaceBack,
}

impl std::fmt::Display for RetrievalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalAction::Remove => write!(f, "remove"),
            RetrievalAction::Retrieve => write!(f, "retrieve"),
            RetrievalAction::PlaceBack => write!(f, "placeBack"),
        }
    }
}

/// One step of an extraction plan, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalStep {
    pub step: u32,
    pub action: RetrievalAction,
    pub item_id: String,
    pub item_name: String,
}

/// Error kinds surfaced by the engine.
///
/// An item that simply fits nowhere is not an error: it is reported through
/// `PlacementResult::unplaced_items`.
#[derive(Debug, thiserror::Error)]
pub enum StowageError {
    #[error("item or container `{id}` has a zero extent")]
    InvalidDimensions { id: String },

    #[error("item `{id}` has priority {priority}, expected 1..=100")]
    InvalidPriority { id: String, priority: u32 },

    #[error("position does not fit inside container `{container_id}`")]
    OutOfBounds { container_id: String },

    #[error("position collides with existing occupancy in container `{container_id}`")]
    Occupied { container_id: String },

    #[error("unknown item `{0}`")]
    UnknownItem(String),

    #[error("unknown container `{0}`")]
    UnknownContainer(String),

    #[error("fit search budget exhausted before any candidate was found for item `{item_id}`")]
    BudgetExceeded { item_id: String },
}

pub type Result<T> = std::result::Result<T, StowageError>;
