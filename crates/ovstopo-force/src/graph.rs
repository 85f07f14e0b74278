#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimNode {
    /// Current position. `NaN` until the simulation (or the caller) places the node.
    pub x: f64,
    pub y: f64,
    /// Previous position; velocity is `x - px` (position Verlet).
    pub px: f64,
    pub py: f64,
    /// Pinned nodes keep their position across ticks.
    pub fixed: bool,
    /// Set while a pointer gesture owns the node.
    pub dragging: bool,
    /// Number of incident links, refreshed on `start()`.
    pub weight: f64,
}

impl SimNode {
    pub fn unplaced() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            px: f64::NAN,
            py: f64::NAN,
            fixed: false,
            dragging: false,
            weight: 0.0,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            px: x,
            py: y,
            ..Self::unplaced()
        }
    }

    pub fn is_placed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_pinned(&self) -> bool {
        self.fixed || self.dragging
    }
}

impl Default for SimNode {
    fn default() -> Self {
        Self::unplaced()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
}
