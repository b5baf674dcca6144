// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flex container arrangement.
//!
//! Children without a positive `flex` factor keep their declared main-axis
//! size (zero when undeclared). Flex children split whatever is left after
//! fixed sizes and gaps in proportion to their factor. When no child is
//! flexible, `justify` distributes the free space instead.

use crate::layout::types::{Align, CalculatedLayout, FlexLayout, Justify, LayoutKind};

struct FlexSlot {
    grow: f64,
    main: Option<f64>,
    cross: Option<f64>,
}

impl FlexSlot {
    fn from_kind(kind: &LayoutKind, row: bool) -> Self {
        let (width, height) = kind.declared_size();
        let grow = match kind {
            LayoutKind::FlexItem(item) => item.flex.filter(|f| *f > 0.0).unwrap_or(0.0),
            _ => 0.0,
        };
        let (main, cross) = if row { (width, height) } else { (height, width) };
        Self { grow, main, cross }
    }
}

/// Compute the bounds of each child of a flex container, in input order.
pub fn arrange(
    flex: &FlexLayout,
    children: &[&LayoutKind],
    bounds: CalculatedLayout,
) -> Vec<CalculatedLayout> {
    if children.is_empty() {
        return Vec::new();
    }

    let row = flex.direction.is_row();
    let (main_size, cross_size) = if row {
        (bounds.width, bounds.height)
    } else {
        (bounds.height, bounds.width)
    };

    let slots: Vec<FlexSlot> = children
        .iter()
        .map(|kind| FlexSlot::from_kind(kind, row))
        .collect();

    let count = slots.len() as f64;
    let gaps = flex.gap * (count - 1.0);
    let fixed: f64 = slots
        .iter()
        .filter(|s| s.grow == 0.0)
        .map(|s| s.main.unwrap_or(0.0))
        .sum();
    let total_grow: f64 = slots.iter().map(|s| s.grow).sum();
    let available = (main_size - fixed - gaps).max(0.0);

    let sizes: Vec<f64> = slots
        .iter()
        .map(|s| {
            if s.grow > 0.0 {
                available * s.grow / total_grow
            } else {
                s.main.unwrap_or(0.0)
            }
        })
        .collect();

    let used: f64 = sizes.iter().sum::<f64>() + gaps;
    let free = (main_size - used).max(0.0);
    let (lead, spacing) = if total_grow > 0.0 {
        (0.0, flex.gap)
    } else {
        distribute(flex.justify, free, count, flex.gap)
    };

    let mut cursor = lead;
    slots
        .iter()
        .zip(sizes)
        .map(|(slot, size)| {
            let mut main_pos = cursor;
            cursor += size + spacing;
            if flex.direction.is_reverse() {
                main_pos = main_size - main_pos - size;
            }

            let cross = slot.cross.unwrap_or(cross_size);
            let cross_pos = match flex.align {
                Align::Stretch | Align::Start => 0.0,
                Align::Center => (cross_size - cross) / 2.0,
                Align::End => cross_size - cross,
            };

            if row {
                CalculatedLayout::new(bounds.x + main_pos, bounds.y + cross_pos, size, cross)
            } else {
                CalculatedLayout::new(bounds.x + cross_pos, bounds.y + main_pos, cross, size)
            }
        })
        .collect()
}

/// Leading offset and spacing between children for the given free space.
fn distribute(justify: Justify, free: f64, count: f64, gap: f64) -> (f64, f64) {
    match justify {
        Justify::Start => (0.0, gap),
        Justify::End => (free, gap),
        Justify::Center => (free / 2.0, gap),
        Justify::SpaceBetween if count > 1.0 => (0.0, gap + free / (count - 1.0)),
        Justify::SpaceBetween => (0.0, gap),
        Justify::SpaceAround => (free / count / 2.0, gap + free / count),
        Justify::SpaceEvenly => (free / (count + 1.0), gap + free / (count + 1.0)),
    }
}
