#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod node_view;
pub mod render;
pub mod surface;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, SurfaceConfig, load_config};
pub use error::{Error, Result};
pub use extract::{Extractor, HierarchyExtractor, Record};
pub use ir::{Connection, Direction, Edge, EdgeType, Graph, Node, NodeStyle, Position, Side};
pub use layout::layout_graph;
pub use render::render_svg;
pub use surface::{Control, DiagramSurface};
pub use theme::Theme;
