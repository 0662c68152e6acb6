//! Backlight brightness curve
//!
//! The board config supplies up to 101 control points, one per percent of
//! the brightness input range, each mapping to an 8-bit output level. The
//! [`BrightnessCurve`] turns them into a dense 256-entry lookup table by
//! linear interpolation between the defined points.
//!
//! ## Control Points
//!
//! - Point `i` sits at input `255 * i / 100`
//! - A point left at 0 is unset, except point 0 which is always defined
//! - Point 100 defaults to 255 when the board leaves it unset
//!
//! ## Example
//!
//! ```
//! use lcdfb::curve::{BrightnessCurve, CURVE_POINTS};
//!
//! let mut points = [0u8; CURVE_POINTS];
//! points[50] = 128;
//! points[100] = 255;
//! let curve = BrightnessCurve::new(&points);
//!
//! assert_eq!(curve.adjust(0), 0);
//! assert_eq!(curve.adjust(127), 128);
//! assert_eq!(curve.adjust(255), 255);
//! ```

/// Number of backlight curve control points (0% to 100%)
pub const CURVE_POINTS: usize = 101;

/// Dense 256-entry brightness lookup table
#[derive(Clone, Debug, PartialEq)]
pub struct BrightnessCurve {
    table: [u8; 256],
}

impl Default for BrightnessCurve {
    /// Linear curve from the default control points (only 100% = 255)
    fn default() -> Self {
        let mut points = [0u8; CURVE_POINTS];
        points[CURVE_POINTS - 1] = 255;
        Self::new(&points)
    }
}

impl BrightnessCurve {
    /// Build the lookup table from control points
    pub fn new(points: &[u8; CURVE_POINTS]) -> Self {
        let mut defined: heapless::Vec<(usize, i32), CURVE_POINTS> = heapless::Vec::new();
        for (i, &value) in points.iter().enumerate() {
            if value == 0 && i != 0 {
                continue;
            }
            // Capacity equals the number of points, so this never overflows
            let _ = defined.push((255 * i / 100, i32::from(value)));
        }

        let mut table = [0u8; 256];
        for pair in defined.windows(2) {
            let (start, prev) = pair[0];
            let (end, next) = pair[1];
            let num = end - start;
            for j in 0..num {
                let value = prev + (next - prev) * j as i32 / num as i32;
                table[start + j] = value.clamp(0, 255) as u8;
            }
        }
        if let Some(&(_, last)) = defined.last() {
            table[255] = last as u8;
        }

        Self { table }
    }

    /// Look up the adjusted output for a raw brightness, clamped to 255
    pub fn adjust(&self, bright: u32) -> u32 {
        u32::from(self.table[bright.min(255) as usize])
    }

    /// The full lookup table
    pub fn table(&self) -> &[u8; 256] {
        &self.table
    }
}
