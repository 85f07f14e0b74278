use ovstopo_force::XorShift64Star;

/// Reproducible network colors: a seeded hue on a fixed saturation/lightness.
#[derive(Debug, Clone)]
pub struct ColorGenerator {
    rng: XorShift64Star,
    saturation: f64,
    lightness: f64,
}

impl ColorGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64Star::new(seed),
            saturation: 1.0,
            lightness: 0.6,
        }
    }

    /// Next color as `#rrggbb`.
    pub fn next_color(&mut self) -> String {
        let hue = self.rng.next_f64() * 360.0;
        hsl_to_hex(hue, self.saturation, self.lightness)
    }
}

impl Default for ColorGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn hsl_to_rgb(hue: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    let channel = |h: f64| -> u8 {
        let h = h.rem_euclid(360.0);
        let v = if h < 60.0 {
            m1 + (m2 - m1) * h / 60.0
        } else if h < 180.0 {
            m2
        } else if h < 240.0 {
            m1 + (m2 - m1) * (240.0 - h) / 60.0
        } else {
            m1
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    (channel(h + 120.0), channel(h), channel(h - 120.0))
}
