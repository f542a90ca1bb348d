//! Scene data structures: boxes, meshes, meshlets, instances and GPU records.
//!
//! This module contains the core data types for scene representation:
//!
//! - `bbox` axis-aligned boxes with corner transforms
//! - `vertex` vertex and attribute records in full and half precision
//! - `geometry` per-mesh buffers, index width and the part table
//! - `meshlet` meshlet clustering and the two packed layouts
//! - `object` instances of a geometry with per-part overrides
//! - `material` and `matrix` 256-byte uniform records

pub mod bbox;
pub mod geometry;
pub mod material;
pub mod matrix;
pub mod meshlet;
pub mod object;
pub mod vertex;
