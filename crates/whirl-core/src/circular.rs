//! Modular arithmetic for the carousel position.
//!
//! The carousel position is a plain `f64` in `[0, 1)`: one full revolution
//! maps onto the unit interval and every item owns a slot of width `1/N`.
//! All writers go through [`wrap`].

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Normalize a position into `[0, 1)` by wrap-around.
#[inline]
pub fn wrap(position: f64) -> f64 {
    if !position.is_finite() {
        return 0.0;
    }
    let wrapped = position.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Width of one item slot for `count` items.
#[inline]
pub fn slot_width(count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        1.0 / count as f64
    }
}

/// Index of the slot nearest to `position`.
///
/// `round(position / width) mod count`, floored at zero.
pub fn nearest_index(position: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let raw = (position / slot_width(count)).round();
    if !raw.is_finite() || raw < 0.0 {
        return 0;
    }
    (raw as usize) % count
}

/// Slot position of `index`.
#[inline]
pub fn index_position(index: usize, count: usize) -> f64 {
    slot_width(count) * index as f64
}

/// Normalize an angle into `[0, 2π]` with a single fold, as the layout pass does.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle;
    if angle < 0.0 {
        angle += TAU;
    }
    if angle > TAU {
        angle -= TAU;
    }
    angle
}

/// Signed angle relative to the front reference, in `[-π, π]`.
#[inline]
pub fn relative_angle(angle: f64) -> f64 {
    if angle > PI {
        -(TAU - angle)
    } else {
        angle
    }
}

/// Which way an animation travels around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Take the arc of at most half a revolution
    #[default]
    ShortestPath,
    /// Always travel towards decreasing position
    Clockwise,
    /// Always travel towards increasing position
    CounterClockwise,
}

/// Resolve the signed change from `from` to `to` under a direction policy.
pub fn resolve_change(from: f64, to: f64, direction: Direction) -> f64 {
    let change = to - from;
    match direction {
        Direction::ShortestPath => {
            if change > 0.5 {
                change - 1.0
            } else if change < -0.5 {
                change + 1.0
            } else {
                change
            }
        }
        Direction::Clockwise => {
            if change > 0.0 {
                change - 1.0
            } else {
                change
            }
        }
        Direction::CounterClockwise => {
            if change < 0.0 {
                change + 1.0
            } else {
                change
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_range() {
        for raw in [-3.25, -1.0, -1e-18, 0.0, 0.5, 0.999, 1.0, 1.5, 42.125] {
            let wrapped = wrap(raw);
            assert!((0.0..1.0).contains(&wrapped), "wrap({raw}) = {wrapped}");
        }
        assert!((wrap(1.25) - 0.25).abs() < 1e-12);
        assert!((wrap(-0.25) - 0.75).abs() < 1e-12);
        assert_eq!(wrap(f64::NAN), 0.0);
    }

    #[test]
    fn test_nearest_index_wraps_last_half_slot() {
        // 0.97 is closer to slot 10 (== slot 0) than to slot 9
        assert_eq!(nearest_index(0.97, 10), 0);
        assert_eq!(nearest_index(0.5, 14), 7);
        assert_eq!(nearest_index(0.14, 10), 1);
        assert_eq!(nearest_index(0.3, 0), 0);
    }

    #[test]
    fn test_shortest_path_at_most_half() {
        for from_step in 0..20 {
            for index in 0..14 {
                let from = from_step as f64 / 20.0;
                let change = resolve_change(from, index_position(index, 14), Direction::ShortestPath);
                assert!(change.abs() <= 0.5 + 1e-12, "from {from} to {index}: {change}");
            }
        }
    }

    #[test]
    fn test_forced_directions() {
        let clockwise = resolve_change(0.0, 1.0 / 14.0, Direction::Clockwise);
        assert!((clockwise - (1.0 / 14.0 - 1.0)).abs() < 1e-12);
        assert!(clockwise < 0.0);

        let counter = resolve_change(0.5, 0.25, Direction::CounterClockwise);
        assert!((counter - 0.75).abs() < 1e-12);

        // Already in the forced direction: unchanged
        assert!((resolve_change(0.5, 0.25, Direction::Clockwise) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_relative_angle_symmetry() {
        for step in 1..32 {
            let theta = step as f64 * PI / 32.0;
            let a = relative_angle(normalize_angle(theta)).abs();
            let b = relative_angle(normalize_angle(TAU - theta)).abs();
            assert!((a - b).abs() < 1e-12, "theta {theta}: {a} vs {b}");
        }
    }
}
