use crate::error::{Error, Result};
use ovstopo_core::ViewerConfig;
use ovstopo_force::ForceOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveOptions {
    /// Horizontal skew in degrees.
    pub skew_x: f64,
    pub scale_y: f64,
    /// Padding around the bounding box for the background quadrilateral.
    pub padding: f64,
}

impl Default for PerspectiveOptions {
    fn default() -> Self {
        Self {
            skew_x: -25.0,
            scale_y: 0.6,
            padding: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphOptions {
    pub width: f64,
    pub height: f64,
    pub force: ForceOptions,
    pub perspective: PerspectiveOptions,
    /// Offset of the tunnel arc control points.
    pub tunnel_curve_magnitude: f64,
    /// Half the rendered switch glyph; the perspective box is grown by it.
    pub node_radius: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            force: ForceOptions::default(),
            perspective: PerspectiveOptions::default(),
            tunnel_curve_magnitude: 30.0,
            node_radius: 16.0,
        }
    }
}

impl GraphOptions {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        validate_canvas(width, height)?;
        let mut opts = Self::default();
        opts.set_canvas(width, height);
        Ok(opts)
    }

    pub fn from_config(cfg: &ViewerConfig) -> Result<Self> {
        let d = Self::default();
        let width = cfg.get_f64("canvas.width").unwrap_or(d.width);
        let height = cfg.get_f64("canvas.height").unwrap_or(d.height);
        validate_canvas(width, height)?;

        let force = ForceOptions {
            width,
            height,
            gravity: cfg.get_f64("force.gravity").unwrap_or(d.force.gravity),
            charge: cfg.get_f64("force.charge").unwrap_or(d.force.charge),
            link_distance: cfg
                .get_f64("force.linkDistance")
                .unwrap_or(d.force.link_distance),
            link_strength: cfg
                .get_f64("force.linkStrength")
                .unwrap_or(d.force.link_strength),
            friction: cfg.get_f64("force.friction").unwrap_or(d.force.friction),
            bounded: cfg.get_bool("force.bounded").unwrap_or(d.force.bounded),
            random_seed: cfg.get_u64("force.seed").unwrap_or(d.force.random_seed),
        };
        let perspective = PerspectiveOptions {
            skew_x: cfg
                .get_f64("perspective.skewX")
                .unwrap_or(d.perspective.skew_x),
            scale_y: cfg
                .get_f64("perspective.scaleY")
                .unwrap_or(d.perspective.scale_y),
            padding: cfg
                .get_f64("perspective.padding")
                .unwrap_or(d.perspective.padding),
        };
        validate_perspective(&perspective)?;

        Ok(Self {
            width,
            height,
            force,
            perspective,
            tunnel_curve_magnitude: cfg
                .get_f64("tunnel.curveMagnitude")
                .unwrap_or(d.tunnel_curve_magnitude),
            node_radius: d.node_radius,
        })
    }

    fn set_canvas(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.force.width = width;
        self.force.height = height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalLayoutOptions {
    pub width: f64,
    pub height: f64,
    pub color_seed: u64,
}

impl Default for LogicalLayoutOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            color_seed: 42,
        }
    }
}

impl LogicalLayoutOptions {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        validate_canvas(width, height)?;
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    pub fn from_config(cfg: &ViewerConfig) -> Result<Self> {
        let d = Self::default();
        let width = cfg.get_f64("canvas.width").unwrap_or(d.width);
        let height = cfg.get_f64("canvas.height").unwrap_or(d.height);
        validate_canvas(width, height)?;
        Ok(Self {
            width,
            height,
            color_seed: cfg.get_u64("logical.colorSeed").unwrap_or(d.color_seed),
        })
    }
}

fn validate_canvas(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(Error::InvalidOptions {
            message: format!("canvas needs a positive width and height, got {width}x{height}"),
        });
    }
    Ok(())
}

fn validate_perspective(p: &PerspectiveOptions) -> Result<()> {
    if !(p.skew_x.is_finite() && p.padding.is_finite()) {
        return Err(Error::InvalidOptions {
            message: format!(
                "perspective skewX and padding must be finite, got {} and {}",
                p.skew_x, p.padding
            ),
        });
    }
    // A zero scale flattens the graph into a line the toggle can never undo.
    if !(p.scale_y.is_finite() && p.scale_y != 0.0) {
        return Err(Error::InvalidOptions {
            message: format!("perspective scaleY must be finite and non-zero, got {}", p.scale_y),
        });
    }
    Ok(())
}
