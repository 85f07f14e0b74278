#![forbid(unsafe_code)]

//! `ovstopo` reconstructs an Open vSwitch / OpenFlow network topology from OpenDaylight and
//! Neutron REST payloads and lays it out headlessly.
//!
//! # Features
//!
//! - `render`: enable the physical force layout, the logical bus layout and SVG output
//!   (`ovstopo::render`)

pub use ovstopo_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use ovstopo_render::geom::{AffineTransform, Point, Rect, Size};
    pub use ovstopo_render::logical::{LogicalElement, NoopLogicalObserver};
    pub use ovstopo_render::physical::{GraphLink, GraphNode, NodeKind, NodeSelector};
    pub use ovstopo_render::{
        CachedPosition, ForceLayoutGraph, GraphObserver, GraphOptions, LogicalLayout,
        LogicalLayoutEngine, LogicalLayoutOptions, LogicalObserver, PerspectiveOptions,
        PositionCache, render_logical_svg, render_physical_svg,
    };

    use futures::executor::block_on;
    use ovstopo_core::{
        LogicalTopology, NeutronSource, Topology, TopologySource, ViewerConfig,
        load_logical_topology, load_topology,
    };

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Load(#[from] ovstopo_core::Error),
        #[error(transparent)]
        Render(#[from] ovstopo_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Tick budget for a headless physical layout.
    pub const DEFAULT_MAX_TICKS: usize = 300;

    /// Bundles layout options for headless use: load, settle, optionally tilt, then render.
    ///
    /// All loading goes through [`futures::executor::block_on`], so no async runtime is needed.
    #[derive(Debug, Clone)]
    pub struct HeadlessViewer {
        pub graph: GraphOptions,
        pub logical: LogicalLayoutOptions,
        pub max_ticks: usize,
        pub perspective: bool,
    }

    impl Default for HeadlessViewer {
        fn default() -> Self {
            Self {
                graph: GraphOptions::default(),
                logical: LogicalLayoutOptions::default(),
                max_ticks: DEFAULT_MAX_TICKS,
                perspective: false,
            }
        }
    }

    impl HeadlessViewer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_config(cfg: &ViewerConfig) -> Result<Self> {
            Ok(Self {
                graph: GraphOptions::from_config(cfg)?,
                logical: LogicalLayoutOptions::from_config(cfg)?,
                ..Self::default()
            })
        }

        pub fn with_perspective(mut self, enable: bool) -> Self {
            self.perspective = enable;
            self
        }

        pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
            self.max_ticks = max_ticks;
            self
        }

        /// Settles a force layout of `topo`, seeding it from `positions` when given.
        pub fn layout_topology(
            &self,
            topo: &Topology,
            positions: Option<PositionCache>,
        ) -> Result<ForceLayoutGraph> {
            let mut graph = ForceLayoutGraph::from_topology(topo, self.graph.clone())?;
            if let Some(positions) = positions {
                graph.set_position_cache(positions);
            }
            graph.start();
            graph.run(self.max_ticks);
            graph.stop();
            if self.perspective {
                graph.apply_perspective(true)?;
            }
            Ok(graph)
        }

        pub fn layout_physical_sync<S>(
            &self,
            source: &S,
            positions: Option<PositionCache>,
        ) -> Result<ForceLayoutGraph>
        where
            S: TopologySource + ?Sized,
        {
            let topo = block_on(load_topology(source))?;
            self.layout_topology(&topo, positions)
        }

        pub fn layout_logical(&self, logical: &LogicalTopology) -> LogicalLayout {
            let mut engine = LogicalLayoutEngine::new(self.logical);
            engine.layout(logical).clone()
        }

        pub fn layout_logical_sync<N, T>(&self, neutron: &N, physical: &T) -> Result<LogicalLayout>
        where
            N: NeutronSource + ?Sized,
            T: TopologySource + ?Sized,
        {
            let (_, logical) = block_on(load_logical_topology(neutron, physical))?;
            Ok(self.layout_logical(&logical))
        }

        pub fn render_physical_svg_sync<S>(
            &self,
            source: &S,
            positions: Option<PositionCache>,
        ) -> Result<String>
        where
            S: TopologySource + ?Sized,
        {
            let graph = self.layout_physical_sync(source, positions)?;
            Ok(render_physical_svg(&graph))
        }

        pub fn render_logical_svg_sync<N, T>(&self, neutron: &N, physical: &T) -> Result<String>
        where
            N: NeutronSource + ?Sized,
            T: TopologySource + ?Sized,
        {
            let layout = self.layout_logical_sync(neutron, physical)?;
            Ok(render_logical_svg(&layout))
        }
    }
}
