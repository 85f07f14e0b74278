//! Logical view: Neutron networks as vertical buses, routers and instances hanging off them.
//!
//! Placement is deterministic and single pass. Networks that own a router are placed first,
//! left to right; every router recurses into the internal networks it serves, which lands them
//! right of everything placed so far. Networks not reached that way follow at the end.

use crate::color::ColorGenerator;
use crate::error::{Error, Result};
use crate::geom::{Point, Rect, Size, point};
use crate::options::LogicalLayoutOptions;
use ovstopo_core::LogicalTopology;
use ovstopo_core::entities::{Network, Router};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

pub const NETWORK_WIDTH: f64 = 15.0;
pub const ROUTER_SIZE: f64 = 52.0;
pub const INSTANCE_SIZE: f64 = 48.0;
pub const LINK_HEIGHT: f64 = 5.0;

const BASE_Y: f64 = 15.0;
const FIRST_NETWORK_MARGIN: f64 = 5.0;
const NETWORK_MARGIN_X: f64 = 120.0;
const NETWORK_MARGIN_Y: f64 = 15.0;
const ROUTER_MARGIN_X: f64 = 120.0;
const ROUTER_MARGIN_Y: f64 = 40.0;
const INSTANCE_MARGIN_X: f64 = 90.0;
const INSTANCE_MARGIN_Y: f64 = 30.0;
const INSTANCE_OFFSET_Y: f64 = 35.0;
const IP_TEXT_MAX_LENGTH: f64 = 60.0;
const NETWORK_OFFSET: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkBox {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub color: String,
    pub external: bool,
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterBox {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceBox {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub ip: String,
    pub floating_ip: Option<String>,
    pub dhcp: bool,
    pub origin: Point,
}

/// A horizontal bar from a network to one of its routers or instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusLink {
    pub source: Point,
    pub target: Point,
    pub color: String,
    pub label: String,
}

impl BusLink {
    pub fn width(&self) -> f64 {
        self.target.x - self.source.x
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalLayout {
    pub canvas: Size,
    /// Shared height of every network bar.
    pub network_height: f64,
    pub networks: Vec<NetworkBox>,
    pub routers: Vec<RouterBox>,
    pub instances: Vec<InstanceBox>,
    pub links: Vec<BusLink>,
    /// Union of every drawn element before scaling.
    pub bounds: Rect,
    /// Uniform scale applied to the root layer; `1.0` unless the drawing overflows the canvas.
    pub scale: f64,
}

impl LogicalLayout {
    pub fn network(&self, id: &str) -> Option<&NetworkBox> {
        self.networks.iter().find(|n| n.id == id)
    }

    pub fn router(&self, id: &str) -> Option<&RouterBox> {
        self.routers.iter().find(|r| r.id == id)
    }

    pub fn instance(&self, id: &str) -> Option<&InstanceBox> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn element(&self, id: &str) -> Option<LogicalElement<'_>> {
        self.network(id)
            .map(LogicalElement::Network)
            .or_else(|| self.router(id).map(LogicalElement::Router))
            .or_else(|| self.instance(id).map(LogicalElement::Instance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalElement<'a> {
    Network(&'a NetworkBox),
    Router(&'a RouterBox),
    Instance(&'a InstanceBox),
}

/// Pointer callbacks of the logical view; both default to doing nothing.
pub trait LogicalObserver {
    fn on_click(&self, _element: LogicalElement<'_>) {}
    fn on_double_click(&self, _element: LogicalElement<'_>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogicalObserver;

impl LogicalObserver for NoopLogicalObserver {}

/// Scale that fits `content` into `canvas`: never above `1.0`, uniform on both axes.
pub fn autoscale(content: Size, canvas: Size) -> f64 {
    if content.width <= canvas.width && content.height <= canvas.height {
        return 1.0;
    }
    let sx = canvas.width / content.width;
    let sy = canvas.height / content.height;
    sx.min(sy).min(1.0)
}

pub struct LogicalLayoutEngine {
    opts: LogicalLayoutOptions,
    observer: Arc<dyn LogicalObserver + Send + Sync>,
    current: Option<LogicalLayout>,
}

impl std::fmt::Debug for LogicalLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalLayoutEngine")
            .field("opts", &self.opts)
            .field("current", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

impl LogicalLayoutEngine {
    pub fn new(opts: LogicalLayoutOptions) -> Self {
        Self::with_observer(opts, Arc::new(NoopLogicalObserver))
    }

    pub fn with_observer(
        opts: LogicalLayoutOptions,
        observer: Arc<dyn LogicalObserver + Send + Sync>,
    ) -> Self {
        Self {
            opts,
            observer,
            current: None,
        }
    }

    pub fn options(&self) -> &LogicalLayoutOptions {
        &self.opts
    }

    pub fn current(&self) -> Option<&LogicalLayout> {
        self.current.as_ref()
    }

    /// Places every network of `logical` and keeps the result as the current layout.
    pub fn layout(&mut self, logical: &LogicalTopology) -> &LogicalLayout {
        let timing_enabled = std::env::var("OVSTOPO_LAYOUT_TIMING").ok().as_deref() == Some("1");
        let start = timing_enabled.then(std::time::Instant::now);

        let layout = Placement::new(&self.opts, &logical.networks).run();

        if let Some(s) = start {
            eprintln!(
                "[ovstopo-logical-timing] total={:?} networks={} routers={} instances={} scale={}",
                s.elapsed(),
                layout.networks.len(),
                layout.routers.len(),
                layout.instances.len(),
                layout.scale,
            );
        }
        self.current.insert(layout)
    }

    /// Drops the current layout. Safe to call repeatedly.
    pub fn free_dom(&mut self) {
        self.current = None;
    }

    pub fn click(&self, id: &str) -> Result<()> {
        self.observer.on_click(self.element(id)?);
        Ok(())
    }

    pub fn double_click(&self, id: &str) -> Result<()> {
        self.observer.on_double_click(self.element(id)?);
        Ok(())
    }

    fn element(&self, id: &str) -> Result<LogicalElement<'_>> {
        self.current
            .as_ref()
            .and_then(|layout| layout.element(id))
            .ok_or_else(|| Error::UnknownNode {
                node_id: id.to_string(),
            })
    }
}

struct Placement<'a> {
    canvas: Size,
    networks: &'a [Network],
    by_id: FxHashMap<&'a str, usize>,
    pending: Vec<bool>,
    colors: ColorGenerator,
    /// Running extent: the right-most and bottom-most placed origin.
    extent_x: f64,
    extent_y: f64,
    network_height: f64,
    out_networks: Vec<NetworkBox>,
    out_routers: Vec<RouterBox>,
    out_instances: Vec<InstanceBox>,
    out_links: Vec<BusLink>,
}

impl<'a> Placement<'a> {
    fn new(opts: &LogicalLayoutOptions, networks: &'a [Network]) -> Self {
        Self {
            canvas: Size::new(opts.width, opts.height),
            networks,
            by_id: networks
                .iter()
                .enumerate()
                .map(|(i, n)| (n.id.as_str(), i))
                .collect(),
            pending: vec![true; networks.len()],
            colors: ColorGenerator::new(opts.color_seed),
            extent_x: 0.0,
            extent_y: 0.0,
            network_height: opts.height - BASE_Y,
            out_networks: Vec::new(),
            out_routers: Vec::new(),
            out_instances: Vec::new(),
            out_links: Vec::new(),
        }
    }

    fn run(mut self) -> LogicalLayout {
        let mut placed_roots = 0usize;
        for idx in 0..self.networks.len() {
            if !self.pending[idx] || self.networks[idx].routers.is_empty() {
                continue;
            }
            let margin = if placed_roots == 0 {
                FIRST_NETWORK_MARGIN
            } else {
                NETWORK_MARGIN_X
            };
            self.place_network(idx, point(self.extent_x + margin, BASE_Y));
            placed_roots += 1;
        }
        for idx in 0..self.networks.len() {
            if self.pending[idx] {
                self.place_network(idx, point(self.extent_x + NETWORK_MARGIN_X, BASE_Y));
            }
        }

        let bounds = self.bounds();
        let scale = autoscale(bounds.size, self.canvas);
        LogicalLayout {
            canvas: self.canvas,
            network_height: self.network_height,
            networks: self.out_networks,
            routers: self.out_routers,
            instances: self.out_instances,
            links: self.out_links,
            bounds,
            scale,
        }
    }

    fn grow(&mut self, p: Point) {
        self.extent_x = self.extent_x.max(p.x);
        self.extent_y = self.extent_y.max(p.y);
    }

    /// Places one network with its routers and instances; returns the network's color.
    fn place_network(&mut self, idx: usize, origin: Point) -> String {
        // Leaves the pending set before recursing so a router cycle cannot place it twice.
        self.pending[idx] = false;
        let networks = self.networks;
        let network = &networks[idx];
        let color = self.colors.next_color();
        self.grow(origin);

        let child_height = network.routers.len() as f64 * (ROUTER_SIZE + ROUTER_MARGIN_Y)
            + network.instances.len() as f64 * (INSTANCE_SIZE + INSTANCE_MARGIN_Y)
            + IP_TEXT_MAX_LENGTH;
        if child_height > self.network_height {
            self.network_height = child_height + NETWORK_OFFSET;
        }

        self.out_networks.push(NetworkBox {
            id: network.id.clone(),
            name: network.name.clone(),
            ip: network.display_ip(),
            color: color.clone(),
            external: network.external,
            origin,
        });

        let next_y = self.place_routers(network, origin, &color);
        self.place_instances(
            network,
            origin,
            point(origin.x + INSTANCE_MARGIN_X, next_y + INSTANCE_OFFSET_Y),
            &color,
        );
        color
    }

    /// Stacks the network's routers and returns the y below the stack.
    fn place_routers(&mut self, network: &'a Network, origin: Point, color: &str) -> f64 {
        let x = origin.x + ROUTER_MARGIN_X + ROUTER_SIZE * 0.5;
        let mut y = origin.y;

        for router in &network.routers {
            let router_origin = point(x, y);
            y += ROUTER_SIZE + ROUTER_MARGIN_Y;
            self.grow(router_origin);

            self.out_routers.push(RouterBox {
                id: router.id.clone(),
                name: router.name.clone(),
                network_id: network.id.clone(),
                origin: router_origin,
            });
            self.out_links.push(BusLink {
                source: point(
                    origin.x + NETWORK_WIDTH * 0.5,
                    router_origin.y + ROUTER_SIZE * 0.5,
                ),
                target: point(
                    router_origin.x + ROUTER_SIZE * 0.5,
                    router_origin.y + NETWORK_WIDTH * 0.5,
                ),
                color: color.to_string(),
                label: router.gateway_ip().unwrap_or_default().to_string(),
            });

            self.place_router_children(router, router_origin);
        }
        y
    }

    fn place_router_children(&mut self, router: &'a Router, router_origin: Point) {
        let children: Vec<(usize, &str)> = router
            .internal_interfaces()
            .filter_map(|itf| {
                let idx = *self.by_id.get(itf.network_id.as_str())?;
                let ip = itf.ip.as_ref().map_or("", |ip| ip.ip_address.as_str());
                self.pending[idx].then_some((idx, ip))
            })
            .collect();
        let step = ROUTER_SIZE / (children.len() as f64 + 1.0);

        for (i, (idx, ip)) in children.into_iter().enumerate() {
            if !self.pending[idx] {
                continue;
            }
            let child_origin = point(
                self.extent_x + ROUTER_SIZE + NETWORK_MARGIN_X,
                NETWORK_MARGIN_Y,
            );
            let child_color = self.place_network(idx, child_origin);
            self.out_links.push(BusLink {
                source: point(
                    router_origin.x + 2.0 * NETWORK_WIDTH,
                    router_origin.y + step * (i as f64 + 1.0),
                ),
                target: point(
                    child_origin.x + NETWORK_WIDTH * 0.5,
                    router_origin.y + NETWORK_WIDTH * 0.5,
                ),
                color: child_color,
                label: ip.to_string(),
            });
        }
    }

    fn place_instances(&mut self, network: &Network, origin: Point, start: Point, color: &str) {
        let mut y = start.y;
        for instance in &network.instances {
            let inst_origin = point(start.x, y);
            y += INSTANCE_SIZE + INSTANCE_MARGIN_Y;
            self.grow(inst_origin);

            self.out_instances.push(InstanceBox {
                id: instance.id.clone(),
                name: instance.name.clone(),
                network_id: network.id.clone(),
                ip: instance.ip.clone(),
                floating_ip: instance.floating_ip.as_ref().map(|f| f.floating_ip.clone()),
                dhcp: instance.is_dhcp(),
                origin: inst_origin,
            });
            self.out_links.push(BusLink {
                source: point(
                    origin.x + NETWORK_WIDTH * 0.5,
                    inst_origin.y + INSTANCE_SIZE * 0.5,
                ),
                target: point(
                    inst_origin.x + INSTANCE_SIZE * 0.5,
                    inst_origin.y + NETWORK_WIDTH * 0.5,
                ),
                color: color.to_string(),
                label: instance.ip.clone(),
            });
        }
    }

    fn bounds(&self) -> Rect {
        let network_size = Size::new(NETWORK_WIDTH, self.network_height);
        let rects = self
            .out_networks
            .iter()
            .map(|n| Rect::new(n.origin, network_size))
            .chain(
                self.out_routers
                    .iter()
                    .map(|r| Rect::new(r.origin, Size::new(ROUTER_SIZE, ROUTER_SIZE))),
            )
            .chain(
                self.out_instances
                    .iter()
                    .map(|i| Rect::new(i.origin, Size::new(INSTANCE_SIZE, INSTANCE_SIZE))),
            )
            .chain(
                self.out_links
                    .iter()
                    .map(|l| Rect::new(l.source, Size::new(l.width().max(0.0), LINK_HEIGHT))),
            );
        rects
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(Rect::zero)
    }
}
