// Library crate root.
//
// This crate is used both as a binary (src/main.rs) and as a library.
// Keeping modules here prevents "dead_code" warnings for public APIs that are
// intentionally exported for downstream crates.

pub mod contour;
pub mod domain;
pub mod editor;
pub mod error;
pub mod mapper;
pub mod plan;
pub mod point;
pub mod raster;
pub mod svg;
pub mod threshold;

#[cfg(test)]
pub mod test_helpers;
