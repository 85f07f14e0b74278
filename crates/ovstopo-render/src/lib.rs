#![forbid(unsafe_code)]

//! Headless layout and SVG scenes for the physical and logical topology views.
//!
//! - [`physical::ForceLayoutGraph`]: force-directed switch graph with drag/pin, a pseudo-3D
//!   perspective toggle and tunnel arcs
//! - [`logical::LogicalLayoutEngine`]: deterministic bus layout of Neutron networks with
//!   canvas-fit autoscale
//! - [`geom::AffineTransform`]: the 3×3 homogeneous transform both views are drawn through

pub mod color;
pub mod error;
pub mod geom;
pub mod logical;
pub mod options;
pub mod physical;
pub mod position_cache;
pub mod svg;

pub use error::{Error, Result};
pub use geom::AffineTransform;
pub use logical::{LogicalLayout, LogicalLayoutEngine, LogicalObserver};
pub use options::{GraphOptions, LogicalLayoutOptions, PerspectiveOptions};
pub use physical::{ForceLayoutGraph, GraphObserver};
pub use position_cache::{CachedPosition, PositionCache};
pub use svg::{render_logical_svg, render_physical_svg};
