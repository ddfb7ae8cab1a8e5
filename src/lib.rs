//! Browser-facing shell around `beadring-core`: pointer routing, render
//! snapshots and, on wasm32, the page bindings.

pub mod app_core;
pub mod input;
#[cfg(target_arch = "wasm32")]
mod web;

pub use app_core::{
    AppCore, AppSession, AppSnapshot, AppSubscriber, AppSubscription, BeadView, Toast, ToastKind,
};
pub use input::{InputEvent, InputEventKind, PointerId, PointerKind, PointerPolicy};
#[cfg(target_arch = "wasm32")]
pub use web::{DesignerHandle, GlooScheduler, HostViewport};
