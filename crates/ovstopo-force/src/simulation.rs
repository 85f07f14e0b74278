use crate::error::{Error, Result};
use crate::graph::{SimLink, SimNode};
use crate::rng::XorShift64Star;

#[derive(Debug, Clone)]
pub struct ForceOptions {
    pub width: f64,
    pub height: f64,
    /// Pull toward the canvas center, scaled by `alpha`.
    pub gravity: f64,
    /// Pairwise charge; negative values repel.
    pub charge: f64,
    /// Target link length for the spring force.
    pub link_distance: f64,
    pub link_strength: f64,
    /// Velocity decay applied during Verlet integration (1.0 = frictionless).
    pub friction: f64,
    /// Keep nodes inside `[0, width] x [0, height]`.
    pub bounded: bool,
    pub random_seed: u64,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity: 0.05,
            charge: -180.0,
            link_distance: 130.0,
            link_strength: 1.0,
            friction: 0.9,
            bounded: true,
            random_seed: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    opts: ForceOptions,
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    alpha: f64,
    rng: XorShift64Star,
}

impl ForceSimulation {
    const ALPHA_START: f64 = 0.1;
    const ALPHA_MIN: f64 = 0.005;
    const ALPHA_DECAY: f64 = 0.99;

    pub fn new(opts: ForceOptions) -> Self {
        let rng = XorShift64Star::new(opts.random_seed);
        Self {
            opts,
            nodes: Vec::new(),
            links: Vec::new(),
            alpha: 0.0,
            rng,
        }
    }

    pub fn options(&self) -> &ForceOptions {
        &self.opts
    }

    pub fn set_nodes(&mut self, nodes: Vec<SimNode>) {
        self.nodes = nodes;
    }

    /// Replaces the link set. Every endpoint must index into the current node set.
    pub fn set_links(&mut self, links: Vec<SimLink>) -> Result<()> {
        for (idx, l) in links.iter().enumerate() {
            if l.source >= self.nodes.len() || l.target >= self.nodes.len() {
                return Err(Error::MissingEndpoint { link_index: idx });
            }
        }
        self.links = links;
        Ok(())
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SimNode] {
        &mut self.nodes
    }

    pub fn node_mut(&mut self, idx: usize) -> Option<&mut SimNode> {
        self.nodes.get_mut(idx)
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Drops every node and link. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.alpha = 0.0;
    }

    /// Refreshes node weights, places unplaced nodes, and starts cooling from the top.
    pub fn start(&mut self) {
        for n in &mut self.nodes {
            n.weight = 0.0;
        }
        for l in &self.links {
            self.nodes[l.source].weight += 1.0;
            self.nodes[l.target].weight += 1.0;
        }

        for idx in 0..self.nodes.len() {
            if self.nodes[idx].is_placed() {
                continue;
            }
            let (x, y) = self.initial_position(idx);
            let n = &mut self.nodes[idx];
            n.x = x;
            n.y = y;
            n.px = x;
            n.py = y;
        }

        self.resume();
    }

    pub fn resume(&mut self) {
        self.alpha = Self::ALPHA_START;
    }

    pub fn stop(&mut self) {
        self.alpha = 0.0;
    }

    /// Advances one step. Returns `true` once the simulation has cooled down (or was stopped).
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return true;
        }
        self.alpha *= Self::ALPHA_DECAY;
        if self.alpha < Self::ALPHA_MIN {
            self.alpha = 0.0;
            return true;
        }
        let alpha = self.alpha;

        // Springs.
        for l in &self.links {
            let (s, t) = (self.nodes[l.source], self.nodes[l.target]);
            let mut dx = t.x - s.x;
            let mut dy = t.y - s.y;
            let len2 = dx * dx + dy * dy;
            if len2 <= 0.0 || l.source == l.target {
                continue;
            }
            let len = len2.sqrt();
            let k = alpha * self.opts.link_strength * (len - self.opts.link_distance) / len;
            dx *= k;
            dy *= k;
            let total = s.weight + t.weight;
            let ks = if total > 0.0 { s.weight / total } else { 0.5 };
            let target = &mut self.nodes[l.target];
            target.x -= dx * ks;
            target.y -= dy * ks;
            let source = &mut self.nodes[l.source];
            source.x += dx * (1.0 - ks);
            source.y += dy * (1.0 - ks);
        }

        // Gravity toward the canvas center.
        let k = alpha * self.opts.gravity;
        if k != 0.0 {
            let cx = self.opts.width / 2.0;
            let cy = self.opts.height / 2.0;
            for n in &mut self.nodes {
                n.x += (cx - n.x) * k;
                n.y += (cy - n.y) * k;
            }
        }

        // Charge acts on the previous position, which changes the implied velocity.
        if self.opts.charge != 0.0 {
            let charge = alpha * self.opts.charge;
            for i in 0..self.nodes.len() {
                if self.nodes[i].is_pinned() {
                    continue;
                }
                let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
                let mut ddx = 0.0;
                let mut ddy = 0.0;
                for (j, other) in self.nodes.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let dx = other.x - xi;
                    let dy = other.y - yi;
                    let dn = dx * dx + dy * dy;
                    if dn <= 0.0 {
                        continue;
                    }
                    let k = charge / dn;
                    ddx += dx * k;
                    ddy += dy * k;
                }
                let n = &mut self.nodes[i];
                n.px -= ddx;
                n.py -= ddy;
            }
        }

        let friction = self.opts.friction;
        let (w, h) = (self.opts.width, self.opts.height);
        let bounded = self.opts.bounded;
        for n in &mut self.nodes {
            if n.is_pinned() {
                n.x = n.px;
                n.y = n.py;
                continue;
            }
            let (ox, oy) = (n.x, n.y);
            n.x -= (n.px - ox) * friction;
            n.y -= (n.py - oy) * friction;
            n.px = ox;
            n.py = oy;
            if bounded {
                n.x = n.x.clamp(0.0, w);
                n.y = n.y.clamp(0.0, h);
                n.px = n.px.clamp(0.0, w);
                n.py = n.py.clamp(0.0, h);
            }
        }

        tracing::trace!(alpha, nodes = self.nodes.len(), "force tick");
        false
    }

    /// Ticks until the simulation cools down or `max_ticks` is reached; returns the tick count.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let timing_enabled = std::env::var("OVSTOPO_LAYOUT_TIMING").ok().as_deref() == Some("1");
        let start = timing_enabled.then(std::time::Instant::now);

        let mut ticks = 0usize;
        while ticks < max_ticks && self.is_running() {
            ticks += 1;
            if self.tick() {
                break;
            }
        }

        if let Some(s) = start {
            eprintln!(
                "[ovstopo-force-timing] total={:?} ticks={} nodes={} links={}",
                s.elapsed(),
                ticks,
                self.nodes.len(),
                self.links.len(),
            );
        }
        ticks
    }

    fn initial_position(&mut self, idx: usize) -> (f64, f64) {
        // Start next to an already placed neighbour when there is one.
        for l in &self.links {
            let other = if l.source == idx {
                l.target
            } else if l.target == idx {
                l.source
            } else {
                continue;
            };
            let o = self.nodes[other];
            if o.is_placed() {
                return (o.x, o.y);
            }
        }
        (
            self.rng.next_f64() * self.opts.width,
            self.rng.next_f64() * self.opts.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ForceOptions, ForceSimulation};
    use crate::graph::{SimLink, SimNode};

    fn sim_with(nodes: Vec<SimNode>, links: Vec<SimLink>) -> ForceSimulation {
        let mut sim = ForceSimulation::new(ForceOptions::default());
        sim.set_nodes(nodes);
        sim.set_links(links).expect("valid links");
        sim
    }

    #[test]
    fn start_places_every_node_inside_the_canvas() {
        let mut sim = sim_with(vec![SimNode::unplaced(); 5], Vec::new());
        sim.start();
        for n in sim.nodes() {
            assert!(n.is_placed());
            assert!((0.0..=800.0).contains(&n.x));
            assert!((0.0..=600.0).contains(&n.y));
        }
    }

    #[test]
    fn start_computes_link_weights() {
        let mut sim = sim_with(
            vec![SimNode::unplaced(); 3],
            vec![
                SimLink {
                    source: 0,
                    target: 1,
                },
                SimLink {
                    source: 0,
                    target: 2,
                },
            ],
        );
        sim.start();
        assert_eq!(sim.nodes()[0].weight, 2.0);
        assert_eq!(sim.nodes()[1].weight, 1.0);
    }

    #[test]
    fn set_links_rejects_out_of_range_endpoint() {
        let mut sim = ForceSimulation::new(ForceOptions::default());
        sim.set_nodes(vec![SimNode::at(0.0, 0.0)]);
        let err = sim
            .set_links(vec![SimLink {
                source: 0,
                target: 3,
            }])
            .unwrap_err();
        assert!(matches!(err, crate::Error::MissingEndpoint { link_index: 0 }));
    }

    #[test]
    fn fixed_node_does_not_move() {
        let mut pinned = SimNode::at(100.0, 100.0);
        pinned.fixed = true;
        let mut sim = sim_with(
            vec![pinned, SimNode::at(110.0, 100.0)],
            vec![SimLink {
                source: 0,
                target: 1,
            }],
        );
        sim.start();
        sim.run(50);
        assert_eq!(sim.nodes()[0].x, 100.0);
        assert_eq!(sim.nodes()[0].y, 100.0);
        assert_ne!(sim.nodes()[1].x, 110.0);
    }

    #[test]
    fn simulation_cools_down() {
        let mut sim = sim_with(vec![SimNode::unplaced(); 4], Vec::new());
        sim.start();
        let ticks = sim.run(10_000);
        assert!(!sim.is_running());
        assert!(ticks < 10_000);
    }

    #[test]
    fn stop_then_tick_reports_done() {
        let mut sim = sim_with(vec![SimNode::at(1.0, 1.0)], Vec::new());
        sim.start();
        sim.stop();
        assert!(sim.tick());
        assert_eq!(sim.nodes()[0].x, 1.0);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut sim = sim_with(vec![SimNode::at(1.0, 1.0)], Vec::new());
        sim.clear();
        sim.clear();
        assert!(sim.nodes().is_empty());
        assert!(sim.links().is_empty());
    }
}
