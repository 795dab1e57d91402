//! Reel geometry — pure arithmetic over offsets and item widths
//!
//! The reel is a horizontal strip translated by `offset` pixels relative to
//! the viewport's left edge. Entry `i` occupies `[offset + i*w, offset + (i+1)*w)`.

use serde::{Deserialize, Serialize};

use crate::error::{RouletteError, RouletteResult};

/// Viewport and item dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelGeometry {
    /// Visible reel width in pixels
    pub viewport_width: f64,
    /// Width of one entry including its gap
    pub item_width: f64,
    /// Max distance between an entry center and the viewport center for
    /// the entry to count as highlighted
    pub highlight_tolerance: f64,
}

impl ReelGeometry {
    pub fn new(viewport_width: f64, item_width: f64) -> Self {
        Self {
            viewport_width,
            item_width,
            highlight_tolerance: item_width / 2.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.highlight_tolerance = tolerance;
        self
    }

    /// Phone-sized viewport
    pub fn mobile() -> Self {
        Self::new(360.0, 120.0)
    }

    /// Wider desktop viewport
    pub fn desktop() -> Self {
        Self::new(900.0, 150.0)
    }

    pub fn viewport_center(&self) -> f64 {
        self.viewport_width / 2.0
    }

    /// Offset that centers the first entry
    pub fn start_offset(&self) -> f64 {
        self.viewport_center() - self.item_width / 2.0
    }

    /// Offset that centers `index`
    pub fn offset_for(&self, index: usize) -> f64 {
        self.viewport_center() - (index as f64 * self.item_width + self.item_width / 2.0)
    }

    /// Screen x of an entry's center at a given offset
    pub fn item_center(&self, index: usize, offset: f64) -> f64 {
        offset + index as f64 * self.item_width + self.item_width / 2.0
    }

    /// Entry nearest the viewport center, if it is on the reel
    pub fn centered_index(&self, offset: f64, len: usize) -> Option<usize> {
        let raw = ((self.viewport_center() - offset) / self.item_width - 0.5).round();
        if !raw.is_finite() || raw < 0.0 || raw >= len as f64 {
            return None;
        }
        Some(raw as usize)
    }

    /// Centered entry, if it sits inside the highlight tolerance zone
    pub fn highlighted_index(&self, offset: f64, len: usize) -> Option<usize> {
        let index = self.centered_index(offset, len)?;
        let distance = (self.item_center(index, offset) - self.viewport_center()).abs();
        (distance <= self.highlight_tolerance).then_some(index)
    }

    pub fn validate(&self) -> RouletteResult<()> {
        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            return Err(RouletteError::config("viewport width must be positive"));
        }
        if !(self.item_width.is_finite() && self.item_width > 0.0) {
            return Err(RouletteError::config("item width must be positive"));
        }
        if !(self.highlight_tolerance.is_finite() && self.highlight_tolerance >= 0.0) {
            return Err(RouletteError::config("highlight tolerance must be non-negative"));
        }
        Ok(())
    }
}

impl Default for ReelGeometry {
    fn default() -> Self {
        Self::mobile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_start_offset_centers_first_entry() {
        let geo = ReelGeometry::new(360.0, 120.0);
        assert_relative_eq!(geo.start_offset(), 120.0);
        assert_relative_eq!(geo.item_center(0, geo.start_offset()), geo.viewport_center());
        assert_eq!(geo.centered_index(geo.start_offset(), 50), Some(0));
    }

    #[test]
    fn test_offset_for_centers_index() {
        let geo = ReelGeometry::desktop();
        for index in [0, 7, 25, 49] {
            let offset = geo.offset_for(index);
            assert_eq!(geo.centered_index(offset, 50), Some(index));
            assert_eq!(geo.highlighted_index(offset, 50), Some(index));
        }
        assert_relative_eq!(geo.offset_for(0), geo.start_offset());
    }

    #[test]
    fn test_off_reel_offsets() {
        let geo = ReelGeometry::mobile();
        // Far right: nothing has reached the center yet
        assert_eq!(geo.centered_index(geo.start_offset() + 500.0, 50), None);
        // Past the last entry
        assert_eq!(geo.centered_index(geo.offset_for(60), 50), None);
        assert_eq!(geo.centered_index(f64::NAN, 50), None);
    }

    #[test]
    fn test_tolerance_zone() {
        let geo = ReelGeometry::new(360.0, 120.0).with_tolerance(10.0);
        let exact = geo.offset_for(5);
        assert_eq!(geo.highlighted_index(exact - 9.0, 20), Some(5));
        // Still nearest to 5 but outside the zone
        assert_eq!(geo.centered_index(exact - 40.0, 20), Some(5));
        assert_eq!(geo.highlighted_index(exact - 40.0, 20), None);
    }

    #[test]
    fn test_validate() {
        assert!(ReelGeometry::mobile().validate().is_ok());
        assert!(ReelGeometry::new(0.0, 120.0).validate().is_err());
        assert!(ReelGeometry::new(360.0, -1.0).validate().is_err());
        assert!(ReelGeometry::mobile().with_tolerance(f64::NAN).validate().is_err());
    }
}
