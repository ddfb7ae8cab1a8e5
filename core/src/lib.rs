pub mod action;
pub mod bead;
pub mod catalog;
pub mod config;
pub mod fit;
pub mod gesture;
pub mod ring;
pub mod session;
pub mod stage;
pub mod timer;

pub use action::{ActionOutcome, DesignerAction};
pub use bead::{Bead, Composition, InstanceId};
pub use catalog::{bead_by_id, BeadCatalogEntry, BuiltinCatalog, CatalogItem, CatalogLookup, CatalogMap, BEAD_CATALOG};
pub use config::{BeadRules, ConfigError, DesignerRules, GestureRules, StageRules};
pub use fit::{check_fit, FitStatus, FitVerdict};
pub use gesture::{
    DeleteZone, DragPhase, DragSession, GestureMachine, GestureOutcome, GestureVisual, RingFrame,
};
pub use ring::{layout_ring, PlacedBead};
pub use session::{CompositionSummary, DesignError, DesignerSession, SummaryEntry};
pub use stage::{
    compute_stage_geometry, FixedViewport, Point, StageGeometry, ViewportProvider, ViewportSize,
};
pub use timer::{LongPressScheduler, ManualScheduler, ManualTimer, TimerTicket};
