//! Level-to-color interpolation for the battery indicator

/// One (level, color) stop in a gradient table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlPoint {
    pub level: i32,
    pub rgb: [u8; 3],
}

const fn point(level: i32, r: u8, g: u8, b: u8) -> ControlPoint {
    ControlPoint { level, rgb: [r, g, b] }
}

/// Battery percentage text colors, red at empty through green at full.
const PERCENT_POINTS: &[ControlPoint] = &[
    point(0, 255, 0, 0),
    point(15, 255, 69, 0),
    point(30, 255, 140, 0),
    point(45, 255, 165, 0),
    point(50, 255, 255, 0),
    point(65, 178, 255, 0),
    point(75, 127, 255, 0),
    point(85, 76, 255, 0),
    point(100, 0, 255, 0),
];

/// Progress bar fill: red to yellow below 30%, yellow to green up to 75%,
/// solid green above.
const PROGRESS_BAR_POINTS: &[ControlPoint] = &[
    point(0, 255, 0, 0),
    point(30, 255, 255, 0),
    point(75, 0, 255, 0),
    point(100, 0, 255, 0),
];

/// Piecewise-linear color ramp over battery levels 0..=100.
///
/// Invariant: at least two control points with strictly increasing levels
/// spanning the full range, so every clamped input finds an enclosing
/// segment.
#[derive(Clone, Debug)]
pub struct Gradient {
    points: &'static [ControlPoint],
}

impl Gradient {
    pub fn battery_percent() -> Self {
        Gradient { points: PERCENT_POINTS }
    }

    pub fn progress_bar() -> Self {
        Gradient { points: PROGRESS_BAR_POINTS }
    }

    /// Interpolated color for a battery level. Out-of-range input is clamped
    /// to the table bounds before the segment lookup.
    pub fn color_for(&self, level: i32) -> [u8; 3] {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        let level = level.clamp(first.level, last.level);

        for pair in self.points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if level >= lo.level && level <= hi.level {
                let t = (level - lo.level) as f32 / (hi.level - lo.level) as f32;
                let mut rgb = [0u8; 3];
                for (i, channel) in rgb.iter_mut().enumerate() {
                    let lo_c = lo.rgb[i] as i32;
                    let hi_c = hi.rgb[i] as i32;
                    *channel = (lo_c + ((hi_c - lo_c) as f32 * t) as i32) as u8;
                }
                return rgb;
            }
        }

        last.rgb
    }
}
