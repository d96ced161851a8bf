//! Scene module - transforms, adapter contract, interpolating store
//!
//! Re-exports only. All logic in submodules.

mod store;
mod transform;

pub use store::{Scene, DEFAULT_INTERPOLATION};
pub use transform::{SceneAdapter, Transform, TransformUpdate};
