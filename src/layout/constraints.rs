// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::layout::types::{CalculatedLayout, LayoutConstraints};

const ASPECT_TOLERANCE: f64 = 0.01;

/// Clamp geometry to the declared min/max sizes, then enforce the aspect ratio.
///
/// Clamping order is min width, max width, min height, max height. The aspect
/// ratio is applied last by recomputing the height from the width.
pub fn apply_constraints(
    mut layout: CalculatedLayout,
    constraints: Option<&LayoutConstraints>,
) -> CalculatedLayout {
    let Some(constraints) = constraints else {
        return layout;
    };

    if let Some(min) = constraints.min_width {
        if layout.width < min {
            layout.width = min;
        }
    }
    if let Some(max) = constraints.max_width {
        if layout.width > max {
            layout.width = max;
        }
    }
    if let Some(min) = constraints.min_height {
        if layout.height < min {
            layout.height = min;
        }
    }
    if let Some(max) = constraints.max_height {
        if layout.height > max {
            layout.height = max;
        }
    }

    if constraints.maintain_aspect_ratio {
        if let Some(target) = constraints.aspect_ratio.as_deref().and_then(parse_aspect_ratio) {
            let current = if layout.height == 0.0 {
                f64::INFINITY
            } else {
                layout.width / layout.height
            };
            if (current - target).abs() > ASPECT_TOLERANCE {
                layout.height = layout.width / target;
            }
        }
    }

    layout
}

/// Parse `"W:H"` into `W / H`. Non-positive parts are rejected.
pub fn parse_aspect_ratio(ratio: &str) -> Option<f64> {
    let (w, h) = ratio.split_once(':')?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0).then_some(w / h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(width: f64, height: f64) -> CalculatedLayout {
        CalculatedLayout::new(10.0, 20.0, width, height)
    }

    #[test]
    fn test_no_constraints_is_identity() {
        assert_eq!(apply_constraints(rect(5.0, 5.0), None), rect(5.0, 5.0));
    }

    #[test]
    fn test_min_max_clamping() {
        let constraints = LayoutConstraints {
            min_width: Some(100.0),
            max_width: Some(200.0),
            min_height: Some(50.0),
            max_height: Some(60.0),
            ..Default::default()
        };

        let narrow = apply_constraints(rect(20.0, 10.0), Some(&constraints));
        assert_eq!((narrow.width, narrow.height), (100.0, 50.0));

        let wide = apply_constraints(rect(500.0, 500.0), Some(&constraints));
        assert_eq!((wide.width, wide.height), (200.0, 60.0));
        assert_eq!((wide.x, wide.y), (10.0, 20.0));
    }

    #[test]
    fn test_aspect_ratio_recomputes_height() {
        let constraints = LayoutConstraints {
            aspect_ratio: Some("16:9".to_string()),
            maintain_aspect_ratio: true,
            ..Default::default()
        };

        let result = apply_constraints(rect(1600.0, 100.0), Some(&constraints));
        assert_eq!(result.height, 900.0);
    }

    #[test]
    fn test_aspect_ratio_within_tolerance_is_kept() {
        let constraints = LayoutConstraints {
            aspect_ratio: Some("1:1".to_string()),
            maintain_aspect_ratio: true,
            ..Default::default()
        };

        let result = apply_constraints(rect(100.0, 99.5), Some(&constraints));
        assert_eq!(result.height, 99.5);
    }

    #[test]
    fn test_aspect_ratio_ignored_without_flag() {
        let constraints = LayoutConstraints {
            aspect_ratio: Some("2:1".to_string()),
            ..Default::default()
        };

        let result = apply_constraints(rect(100.0, 100.0), Some(&constraints));
        assert_eq!(result.height, 100.0);
    }

    #[test]
    fn test_parse_aspect_ratio() {
        assert_eq!(parse_aspect_ratio("4:3"), Some(4.0 / 3.0));
        assert_eq!(parse_aspect_ratio(" 2 : 1 "), Some(2.0));
        assert_eq!(parse_aspect_ratio("16x9"), None);
        assert_eq!(parse_aspect_ratio("1:0"), None);
    }
}
