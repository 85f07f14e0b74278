use super::model::{ConnectionHighlight, GraphLink, GraphNode, NodeSelector};
use super::{GraphObserver, NoopObserver};
use crate::error::{Error, Result};
use crate::geom::{AffineTransform, Point, Rect, bounding_rect, fmt_number, point};
use crate::options::GraphOptions;
use crate::position_cache::{CachedPosition, PositionCache};
use ovstopo_core::Topology;
use ovstopo_force::{ForceSimulation, SimLink, SimNode};
use std::sync::Arc;

/// Force-directed physical view: simulation, transform stack and the derived drawing state.
///
/// Node and link screen geometry only changes inside [`ForceLayoutGraph::update`], which
/// every tick, drag step and perspective toggle ends with.
pub struct ForceLayoutGraph {
    opts: GraphOptions,
    sim: ForceSimulation,
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    matrix: AffineTransform,
    parent: AffineTransform,
    perspective: bool,
    base_bbox: Option<Rect>,
    background: [Point; 4],
    positions: PositionCache,
    dragging: Option<usize>,
    observer: Arc<dyn GraphObserver + Send + Sync>,
}

impl std::fmt::Debug for ForceLayoutGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceLayoutGraph")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("matrix", &self.matrix)
            .field("perspective", &self.perspective)
            .finish_non_exhaustive()
    }
}

impl ForceLayoutGraph {
    pub fn new(opts: GraphOptions) -> Self {
        Self::with_observer(opts, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        opts: GraphOptions,
        observer: Arc<dyn GraphObserver + Send + Sync>,
    ) -> Self {
        let sim = ForceSimulation::new(opts.force.clone());
        let origin = point(0.0, 0.0);
        Self {
            opts,
            sim,
            nodes: Vec::new(),
            links: Vec::new(),
            matrix: AffineTransform::identity(),
            parent: AffineTransform::identity(),
            perspective: false,
            base_bbox: None,
            background: [origin; 4],
            positions: PositionCache::default(),
            dragging: None,
            observer,
        }
    }

    /// Graph over every node of `topo` (bridges, then OVSDB nodes) and its resolved links.
    pub fn from_topology(topo: &Topology, opts: GraphOptions) -> Result<Self> {
        let mut graph = Self::new(opts);
        graph.set_topology(topo)?;
        Ok(graph)
    }

    pub fn set_topology(&mut self, topo: &Topology) -> Result<()> {
        self.set_nodes(topo.nodes().map(GraphNode::from_topology_node).collect());
        let links = topo
            .links()
            .filter_map(|link| {
                let graph_link = GraphLink::from_topology_link(link);
                if graph_link.is_none() {
                    tracing::debug!(link = %link.id, "skipping unresolved link");
                }
                graph_link
            })
            .collect();
        self.set_links(links)
    }

    pub fn options(&self) -> &GraphOptions {
        &self.opts
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn simulation(&self) -> &ForceSimulation {
        &self.sim
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.matrix
    }

    pub fn parent_transform(&self) -> &AffineTransform {
        &self.parent
    }

    pub fn is_perspective(&self) -> bool {
        self.perspective
    }

    /// Padded background quadrilateral, shown only while the perspective is on.
    pub fn background(&self) -> Option<[Point; 4]> {
        self.perspective.then_some(self.background)
    }

    pub fn position_cache(&self) -> &PositionCache {
        &self.positions
    }

    pub fn set_position_cache(&mut self, positions: PositionCache) {
        self.positions = positions;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Replaces the node set. Links index the previous node set and are dropped.
    pub fn set_nodes(&mut self, nodes: Vec<GraphNode>) {
        self.sim.stop();
        self.sim.set_nodes(vec![SimNode::unplaced(); nodes.len()]);
        // An empty link list always fits the new node set.
        let _ = self.sim.set_links(Vec::new());
        self.nodes = nodes;
        self.links.clear();
        self.reset_view();
    }

    /// Replaces the link set.
    ///
    /// Links are stably sorted by `(source, target)` and numbered `1, 2, …` within each run of
    /// parallel links so the renderer can fan them out.
    pub fn set_links(&mut self, mut links: Vec<GraphLink>) -> Result<()> {
        if let Some(bad) = links
            .iter()
            .find(|l| l.source >= self.nodes.len() || l.target >= self.nodes.len())
        {
            return Err(Error::DanglingLink {
                link_id: bad.id.clone(),
            });
        }

        links.sort_by_key(|l| (l.source, l.target));
        let mut prev: Option<(usize, usize, usize)> = None;
        for link in &mut links {
            link.link_index = match prev {
                Some((s, t, idx)) if s == link.source && t == link.target => idx + 1,
                _ => 1,
            };
            prev = Some((link.source, link.target, link.link_index));
        }

        self.sim.set_links(
            links
                .iter()
                .map(|l| SimLink {
                    source: l.source,
                    target: l.target,
                })
                .collect(),
        )?;
        self.links = links;
        Ok(())
    }

    /// Starts the simulation, restoring cached positions (and pins) for known node ids.
    ///
    /// Cached nodes are written back before the simulation places the rest, so new nodes
    /// start next to their restored neighbours.
    pub fn start(&mut self) {
        for (idx, node) in self.nodes.iter().enumerate() {
            let Some(p) = self.positions.get(&node.id) else {
                continue;
            };
            if let Some(n) = self.sim.node_mut(idx) {
                n.x = p.x;
                n.y = p.y;
                n.px = p.x;
                n.py = p.y;
                n.fixed = p.fixed;
            }
        }
        self.sim.start();

        self.update();
        self.record_positions();
    }

    /// One simulation step; returns `true` once the layout has cooled down.
    pub fn tick(&mut self) -> bool {
        let done = self.sim.tick();
        self.update();
        self.record_positions();
        done
    }

    /// Ticks until the layout cools down or `max_ticks` is reached.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let ticks = self.sim.run(max_ticks);
        self.update();
        self.record_positions();
        ticks
    }

    pub fn stop(&mut self) {
        self.sim.stop();
    }

    pub fn resume(&mut self) {
        self.sim.resume();
    }

    /// Recomputes node positions and link paths from the simulation and transforms.
    pub fn update(&mut self) {
        let screen = AffineTransform::combine(&self.parent, &self.matrix);
        for (node, sim) in self.nodes.iter_mut().zip(self.sim.nodes()) {
            node.position = point(sim.x, sim.y);
            node.fixed = sim.fixed;
            node.local = self.matrix.transform_point(sim.x, sim.y);
            node.screen = screen.transform_point(sim.x, sim.y);
        }

        let magnitude = self.opts.tunnel_curve_magnitude;
        for link in &mut self.links {
            let src = self.nodes[link.source].local;
            let tgt = self.nodes[link.target].local;
            link.path = link_path(src, tgt, link.is_tunnel(), magnitude);
        }
    }

    /// The transform an enclosing layer imposes, composed in front of the graph's own.
    pub fn set_parent_transform(&mut self, parent: AffineTransform) {
        self.parent = parent;
        self.update();
    }

    /// Same as [`ForceLayoutGraph::set_parent_transform`], read from an SVG `transform` attribute.
    pub fn set_parent_transform_str(&mut self, attr: &str) -> Result<()> {
        self.set_parent_transform(AffineTransform::from_svg_str(attr)?);
        Ok(())
    }

    /// Grabs a node. A second node cannot be grabbed until the current drag ends.
    pub fn drag_start(&mut self, node_id: &str) -> Result<()> {
        let idx = self.index_of(node_id)?;
        if self.dragging.is_some_and(|held| held != idx) {
            return Err(Error::NotDragging {
                node_id: node_id.to_string(),
            });
        }
        self.sim.stop();
        if let Some(n) = self.sim.node_mut(idx) {
            // Grabbing a node drops its velocity.
            n.px = n.x;
            n.py = n.y;
            n.dragging = true;
        }
        self.dragging = Some(idx);
        Ok(())
    }

    /// Moves the dragged node by `(dx, dy)` in simulation space, previous position included so
    /// the simulation does not spring it back.
    pub fn drag_move(&mut self, node_id: &str, dx: f64, dy: f64) -> Result<()> {
        let idx = self.dragged_index(node_id)?;
        if let Some(n) = self.sim.node_mut(idx) {
            n.x += dx;
            n.y += dy;
            n.px += dx;
            n.py += dy;
        }
        self.update();
        Ok(())
    }

    /// Pins the dragged node where it was dropped and resumes the simulation.
    pub fn drag_end(&mut self, node_id: &str) -> Result<()> {
        let idx = self.dragged_index(node_id)?;
        if let Some(n) = self.sim.node_mut(idx) {
            n.dragging = false;
            n.fixed = true;
        }
        self.dragging = None;
        self.update();
        self.sim.resume();
        self.record_positions();
        Ok(())
    }

    /// Composes (or removes) the pseudo-3D skew/scale onto the graph transform.
    ///
    /// The rendered bounding box is measured on the first enable and reused until the matching
    /// disable, so enable followed by disable restores the previous transform. Toggling to the
    /// current state is a no-op.
    pub fn apply_perspective(&mut self, enable: bool) -> Result<()> {
        if enable == self.perspective {
            return Ok(());
        }

        let bbox = match self.base_bbox {
            Some(bbox) => bbox,
            None => {
                let bbox = self.rendered_bbox();
                self.base_bbox = Some(bbox);
                bbox
            }
        };

        let center = bbox.center();
        let p = self.opts.perspective;
        let mut pers = AffineTransform::identity();
        pers.translate(-center.x, -center.y)
            .skew(p.skew_x, 0.0)
            .scale(1.0, p.scale_y)
            .translate(center.x, center.y);

        // Checked on enable too, so a tilt that cannot be undone is never applied.
        let inverse = pers.try_invert()?;
        let delta = if enable { pers } else { inverse };
        self.matrix = AffineTransform::combine(&self.matrix, &delta);

        let (min, max) = (bbox.min(), bbox.max());
        let pad = p.padding;
        self.background = [
            self.matrix.transform_point(min.x - pad, min.y - pad),
            self.matrix.transform_point(min.x - pad, max.y + pad),
            self.matrix.transform_point(max.x + pad, max.y + pad),
            self.matrix.transform_point(max.x + pad, min.y - pad),
        ];

        self.perspective = enable;
        if !enable {
            self.base_bbox = None;
        }
        self.update();
        Ok(())
    }

    /// Bounding box of the drawn nodes (graph transform applied, glyph size included).
    pub fn rendered_bbox(&self) -> Rect {
        let r = self.opts.node_radius;
        let corners = self
            .nodes
            .iter()
            .map(|n| n.local)
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .flat_map(|p| [point(p.x - r, p.y - r), point(p.x + r, p.y + r)]);
        bounding_rect(corners).unwrap_or_else(Rect::zero)
    }

    /// Detaches every node and link and empties the simulation. Safe to call repeatedly.
    pub fn free_dom(&mut self) {
        self.sim.clear();
        self.nodes.clear();
        self.links.clear();
        self.reset_view();
    }

    /// Drops the drag, the perspective and the graph transform. The parent transform belongs
    /// to the enclosing layer and is kept.
    fn reset_view(&mut self) {
        self.dragging = None;
        self.matrix = AffineTransform::identity();
        self.perspective = false;
        self.base_bbox = None;
        self.background = [point(0.0, 0.0); 4];
    }

    /// Hides nodes (matching `selector`) by id.
    ///
    /// With `exclude`, nodes outside `node_ids` are hidden and the listed ones shown; without
    /// it, the listed ones are hidden.
    pub fn filter_node<S: AsRef<str>>(
        &mut self,
        node_ids: &[S],
        selector: NodeSelector,
        exclude: bool,
    ) {
        for node in self.nodes.iter_mut().filter(|n| selector.matches(n.kind)) {
            let listed = node_ids.iter().any(|id| id.as_ref() == node.id);
            node.hidden = if listed { !exclude } else { exclude };
        }
    }

    /// A link is hidden when either endpoint is.
    pub fn filter_link(&mut self) {
        for link in &mut self.links {
            link.hidden = self.nodes[link.source].hidden || self.nodes[link.target].hidden;
        }
    }

    pub fn clear_filter(&mut self) {
        self.nodes.iter_mut().for_each(|n| n.hidden = false);
        self.links.iter_mut().for_each(|l| l.hidden = false);
    }

    pub fn connection_highlight(&self, node_id: &str) -> Result<ConnectionHighlight> {
        let idx = self.index_of(node_id)?;
        let nodes = (0..self.nodes.len())
            .filter(|&other| {
                other == idx
                    || self.links.iter().any(|l| {
                        (l.source == idx && l.target == other)
                            || (l.target == idx && l.source == other)
                    })
            })
            .collect();
        let links = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.touches(idx) && !l.is_tunnel())
            .map(|(i, _)| i)
            .collect();
        Ok(ConnectionHighlight { nodes, links })
    }

    pub fn node_click(&self, node_id: &str) -> Result<()> {
        let node = &self.nodes[self.index_of(node_id)?];
        self.observer.on_node_click(node, &self.nodes, &self.links);
        Ok(())
    }

    pub fn node_over(&self, node_id: &str) -> Result<()> {
        let node = &self.nodes[self.index_of(node_id)?];
        self.observer.on_node_over(node, &self.nodes, &self.links);
        Ok(())
    }

    pub fn node_out(&self, node_id: &str) -> Result<()> {
        let node = &self.nodes[self.index_of(node_id)?];
        self.observer.on_node_out(node, &self.nodes, &self.links);
        Ok(())
    }

    fn index_of(&self, node_id: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| Error::UnknownNode {
                node_id: node_id.to_string(),
            })
    }

    fn dragged_index(&self, node_id: &str) -> Result<usize> {
        let idx = self.index_of(node_id)?;
        if self.dragging != Some(idx) {
            return Err(Error::NotDragging {
                node_id: node_id.to_string(),
            });
        }
        Ok(idx)
    }

    fn record_positions(&mut self) {
        for (node, sim) in self.nodes.iter().zip(self.sim.nodes()) {
            if !sim.is_placed() {
                continue;
            }
            self.positions.insert(
                node.id.clone(),
                CachedPosition {
                    x: sim.x,
                    y: sim.y,
                    fixed: sim.fixed,
                },
            );
        }
    }
}

/// Cubic path between two drawn endpoints. Tunnels bow out along the unit perpendicular of the
/// target vector; everything else is a straight curve.
pub fn link_path(src: Point, tgt: Point, tunnel: bool, magnitude: f64) -> String {
    let (a1, a2) = if tunnel {
        tunnel_anchors(src, tgt, magnitude).unwrap_or((src, tgt))
    } else {
        (src, tgt)
    };
    format!(
        "M{},{} C{},{} {},{} {},{}",
        fmt_number(src.x),
        fmt_number(src.y),
        fmt_number(a1.x),
        fmt_number(a1.y),
        fmt_number(a2.x),
        fmt_number(a2.y),
        fmt_number(tgt.x),
        fmt_number(tgt.y),
    )
}

fn tunnel_anchors(src: Point, tgt: Point, magnitude: f64) -> Option<(Point, Point)> {
    let perp = crate::geom::vector(-tgt.y, tgt.x);
    let src_v = src.to_vector();
    let (perp_len, src_len) = (perp.length(), src_v.length());
    if perp_len == 0.0 || src_len == 0.0 {
        return None;
    }
    let d = perp / perp_len - src_v / src_len;
    Some((src - d * magnitude, tgt - d * magnitude))
}
