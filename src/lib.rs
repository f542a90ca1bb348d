//! cadscene
//!
//! A scene container for large CAD models rendered with instancing and
//! meshlets. Meshes are laid out once at load time into vertex, attribute,
//! index and meshlet buffers; objects reference them by index together with a
//! matrix and per-part materials. A wgpu backend uploads the result and issues
//! indirect draws without making any layout decisions of its own.
//!
//! High-level modules
//! - `config`: load options, meshlet packing and clone axis selection
//! - `data_structures`: boxes, vertex formats, geometry, meshlets, objects and GPU records
//! - `source`: scene descriptions in memory and from glTF / OBJ files
//! - `scene`: the `CadScene` arena with load, clone and unload
//! - `layout`: placement of all geometries inside combined device buffers
//! - `render`: render list items and draw statistics
//! - `context`, `gpu`, `pipelines`: headless wgpu device and scene resources
//! - `error`: the `SceneError` taxonomy
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod gpu;
pub mod layout;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod source;

// Re-exports commonly used types for convenience in downstream code.
pub use config::{CloneAxis, LoadConfig, MeshletBuilderType};
pub use error::SceneError;
pub use scene::CadScene;
