//! Elliptical placement of carousel items
//!
//! Every placement is a pure function of `(index, count, position,
//! viewport)`. Items ride an ellipse four viewports wide whose centre sits
//! off the left edge, so only the front arc sweeps through the viewport.
//! The front reference angle is zero; items further around the ellipse
//! shrink and fade with their angular distance from it.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::circular::{self, nearest_index, normalize_angle, relative_angle};
use crate::geometry::{Point, Rect, Size};

/// Fixed size of one carousel item in points
pub const ITEM_SIZE: Size = Size::new(220.0, 220.0);

/// Constants of the elliptical arrangement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub item_size: Size,
    /// Ellipse width as a multiple of the viewport width
    pub area_width_factor: f64,
    /// Ellipse height as a multiple of the viewport height
    pub area_height_factor: f64,
    /// Extra leftward shift of the ellipse centre
    pub horizontal_inset: f64,
    /// Scale lost per radian of distance
    pub scale_falloff: f64,
    /// Alpha lost per radian of distance
    pub alpha_falloff: f64,
    /// Clamp scale and alpha at zero for items near the back
    pub clamp_appearance: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            item_size: ITEM_SIZE,
            area_width_factor: 4.0,
            area_height_factor: 2.2,
            horizontal_inset: 30.0,
            scale_falloff: 0.65,
            alpha_falloff: 0.5,
            clamp_appearance: false,
        }
    }
}

/// Derived per-frame placement of one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub index: usize,
    /// Angle on the ellipse in [0, 2π]
    pub angle: f64,
    /// Signed angle from the front reference in [-π, π]
    pub relative_angle: f64,
    /// Angular distance from the front reference in [0, π]
    pub distance: f64,
    /// Untransformed item frame in viewport coordinates
    pub frame: Rect,
    pub scale: f64,
    pub alpha: f64,
    pub is_visible: bool,
    pub is_central: bool,
}

impl ItemPlacement {
    /// Frame after the scale transform, used for hit-testing
    #[inline]
    pub fn transformed_frame(&self) -> Rect {
        self.frame.scaled_about_center(self.scale)
    }
}

/// Place item `index` of `count` for the given carousel position.
pub fn place_item(
    index: usize,
    count: usize,
    position: f64,
    viewport: Size,
    carousel_visible: bool,
    params: &LayoutParams,
) -> ItemPlacement {
    let width = circular::slot_width(count);
    let angle = normalize_angle(
        FRAC_PI_2 + index as f64 * width * TAU - position * TAU - FRAC_PI_2,
    );
    let relative_angle = relative_angle(angle);
    let distance = relative_angle.abs();

    let area = Size::new(
        (viewport.width * params.area_width_factor).floor(),
        viewport.height * params.area_height_factor,
    );
    let item = params.item_size;
    let frame = Rect::new(
        -viewport.width - 0.5 * item.width - params.horizontal_inset
            + angle.cos() * area.width * 0.5
            - item.width * 0.5,
        viewport.height * 0.5 + angle.sin() * area.height * 0.5 - item.height * 0.5,
        item.width,
        item.height,
    );

    let mut scale = 1.0 - distance * params.scale_falloff;
    let mut alpha = 1.0 - distance * params.alpha_falloff;
    if params.clamp_appearance {
        scale = scale.max(0.0);
        alpha = alpha.max(0.0);
    }

    ItemPlacement {
        index,
        angle,
        relative_angle,
        distance,
        frame,
        scale,
        alpha,
        is_visible: carousel_visible && frame.intersects(&Rect::from_size(viewport)),
        is_central: false,
    }
}

/// Place every item; the one nearest the front reference is marked central.
pub fn compute_layout(
    count: usize,
    position: f64,
    viewport: Size,
    carousel_visible: bool,
    params: &LayoutParams,
) -> Vec<ItemPlacement> {
    let central = nearest_index(position, count);
    (0..count)
        .map(|index| {
            let mut placement =
                place_item(index, count, position, viewport, carousel_visible, params);
            placement.is_central = index == central;
            placement
        })
        .collect()
}

/// First item (in index order) whose transformed frame contains `point`.
pub fn hit_test(placements: &[ItemPlacement], point: Point) -> Option<usize> {
    placements
        .iter()
        .find(|placement| placement.transformed_frame().contains(point))
        .map(|placement| placement.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const VIEWPORT: Size = Size::new(390.0, 400.0);

    #[test]
    fn test_fourteen_items_half_turn() {
        let params = LayoutParams::default();
        let placements = compute_layout(14, 0.5, VIEWPORT, true, &params);
        assert_eq!(placements.len(), 14);

        let front = &placements[7];
        assert!(front.distance < 1e-9, "distance {}", front.distance);
        assert!((front.scale - 1.0).abs() < 1e-9);
        assert!((front.alpha - 1.0).abs() < 1e-9);
        assert!(front.is_central);

        let back = &placements[0];
        assert!((back.distance - PI).abs() < 1e-9);
        assert!((back.scale - (1.0 - 0.65 * PI)).abs() < 1e-9);
        assert!(back.scale < 0.0, "scale is preserved unclamped by default");
        assert!(!back.is_central);
    }

    #[test]
    fn test_clamped_appearance() {
        let params = LayoutParams {
            clamp_appearance: true,
            ..Default::default()
        };
        let back = place_item(0, 14, 0.5, VIEWPORT, true, &params);
        assert_eq!(back.scale, 0.0);
        assert!(back.alpha >= 0.0);
    }

    #[test]
    fn test_distance_in_range_and_monotonic_appearance() {
        let params = LayoutParams::default();
        for step in 0..50 {
            let position = step as f64 / 50.0;
            for placement in compute_layout(9, position, VIEWPORT, true, &params) {
                assert!((0.0..=PI + 1e-12).contains(&placement.distance));
                assert!(placement.scale <= 1.0 + 1e-12);
                assert!(placement.alpha <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_front_item_frame() {
        let params = LayoutParams::default();
        let front = place_item(0, 10, 0.0, VIEWPORT, true, &params);
        // cos(0) = 1: x = -W - 110 - 30 + 2W - 110
        assert!((front.frame.origin.x - (390.0 - 250.0)).abs() < 1e-9);
        assert!((front.frame.origin.y - (200.0 - 110.0)).abs() < 1e-9);
        assert!(front.is_visible);
    }

    #[test]
    fn test_hidden_carousel_has_no_visible_items() {
        let params = LayoutParams::default();
        let placements = compute_layout(14, 0.3, VIEWPORT, false, &params);
        assert!(placements.iter().all(|p| !p.is_visible));
    }

    #[test]
    fn test_back_items_are_offscreen() {
        let params = LayoutParams::default();
        let placements = compute_layout(14, 0.0, VIEWPORT, true, &params);
        assert!(placements[0].is_visible);
        assert!(!placements[7].is_visible);
    }

    #[test]
    fn test_hit_test_front_item() {
        let params = LayoutParams::default();
        let placements = compute_layout(10, 0.0, VIEWPORT, true, &params);
        let center = placements[0].frame.center();
        assert_eq!(hit_test(&placements, center), Some(0));
        assert_eq!(hit_test(&placements, Point::new(-5000.0, -5000.0)), None);
    }
}
