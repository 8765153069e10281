//! tilemesh - Turn 2D map features into renderable 3D roof, road and power-line geometry

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layers;
pub mod mesh;
pub mod powerlines;
pub mod roads;
pub mod roof;

pub use error::{Error, Result};
