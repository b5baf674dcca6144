// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Grid container arrangement.
//!
//! Track lists accept `Npx`, `Nfr` and bare tracks (treated as `1fr`), with
//! `repeat(N, track)` expanded first. Pixel tracks take their size before the
//! remaining space is split among fractional tracks. A template keeps at
//! most [`MAX_TRACKS`] tracks; validation reports templates that ask for more.

use crate::layout::types::{CalculatedLayout, GridLayout, LayoutKind};
use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_SPAN: &str = "1 / 2";
pub const MAX_TRACKS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    Pixels(f64),
    Fraction(f64),
}

fn repeat_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"repeat\(\s*(\d+)\s*,\s*([^)]+?)\s*\)").expect("repeat pattern is valid")
    })
}

/// Parse a track list such as `"100px repeat(2, 1fr) auto"`, keeping the
/// first [`MAX_TRACKS`] tracks.
pub fn parse_tracks(template: &str) -> Vec<Track> {
    let expanded = repeat_pattern().replace_all(template, |caps: &regex::Captures| {
        let count = repeat_count(&caps[1]).min(MAX_TRACKS);
        vec![caps[2].to_string(); count].join(" ")
    });

    expanded
        .split_whitespace()
        .take(MAX_TRACKS)
        .map(parse_track)
        .collect()
}

/// Number of tracks `template` asks for once every `repeat` is expanded.
pub fn requested_tracks(template: &str) -> usize {
    let mut repeated = 0usize;
    let rest = repeat_pattern().replace_all(template, |caps: &regex::Captures| {
        let per_repeat = caps[2].split_whitespace().count();
        repeated = repeated.saturating_add(repeat_count(&caps[1]).saturating_mul(per_repeat));
        " "
    });
    repeated.saturating_add(rest.split_whitespace().count())
}

/// The pattern only captures digits, so a failed parse means overflow.
fn repeat_count(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

fn parse_track(token: &str) -> Track {
    if let Some(value) = token.strip_suffix("fr") {
        return Track::Fraction(value.parse().unwrap_or(1.0));
    }
    if let Some(value) = token.strip_suffix("px") {
        if let Ok(px) = value.parse() {
            return Track::Pixels(px);
        }
    }
    Track::Fraction(1.0)
}

/// Resolve tracks to sizes within `total`, accounting for gaps between them.
pub fn track_sizes(tracks: &[Track], total: f64, gap: f64) -> Vec<f64> {
    if tracks.is_empty() {
        return Vec::new();
    }

    let gaps = gap * (tracks.len() as f64 - 1.0);
    let fixed: f64 = tracks
        .iter()
        .map(|t| match t {
            Track::Pixels(px) => *px,
            Track::Fraction(_) => 0.0,
        })
        .sum();
    let fractions: f64 = tracks
        .iter()
        .map(|t| match t {
            Track::Fraction(fr) => *fr,
            Track::Pixels(_) => 0.0,
        })
        .sum();
    let remaining = (total - fixed - gaps).max(0.0);

    tracks
        .iter()
        .map(|t| match t {
            Track::Pixels(px) => *px,
            Track::Fraction(fr) if fractions > 0.0 => remaining * fr / fractions,
            Track::Fraction(_) => 0.0,
        })
        .collect()
}

/// Parse `"start / end"` (1-indexed, end exclusive) and clamp to `[1, count + 1]`.
///
/// `"2"` spans one track, `"1 / span 2"` spans two. Returns zero-based
/// `(start, end)` indices into the track list.
pub fn parse_span(span: &str, count: usize) -> (usize, usize) {
    let count = count.max(1) as i64;
    let mut parts = span.split('/').map(str::trim);

    let start: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let start = start.clamp(1, count);

    let end = match parts.next() {
        Some(end) => match end.strip_prefix("span") {
            Some(n) => start + n.trim().parse::<i64>().unwrap_or(1),
            None => end.parse().unwrap_or(start + 1),
        },
        None => start + 1,
    };
    let end = end.clamp(start + 1, count + 1);

    ((start - 1) as usize, (end - 1) as usize)
}

fn span_extent(sizes: &[f64], gap: f64, start: usize, end: usize) -> (f64, f64) {
    let offset: f64 = sizes[..start].iter().sum::<f64>() + gap * start as f64;
    let length: f64 = sizes[start..end].iter().sum::<f64>() + gap * (end - start - 1) as f64;
    (offset, length)
}

/// Compute the bounds of each child of a grid container, in input order.
pub fn arrange(
    grid: &GridLayout,
    children: &[&LayoutKind],
    bounds: CalculatedLayout,
) -> Vec<CalculatedLayout> {
    let mut columns = parse_tracks(&grid.template_columns);
    if columns.is_empty() {
        columns.push(Track::Fraction(1.0));
    }
    let mut rows = parse_tracks(&grid.template_rows);
    if rows.is_empty() {
        rows.push(Track::Fraction(1.0));
    }

    let column_gap = grid.column_gap.unwrap_or(grid.gap);
    let row_gap = grid.row_gap.unwrap_or(grid.gap);
    let column_sizes = track_sizes(&columns, bounds.width, column_gap);
    let row_sizes = track_sizes(&rows, bounds.height, row_gap);

    children
        .iter()
        .map(|kind| {
            let (column_span, row_span) = match kind {
                LayoutKind::GridItem(item) => (
                    item.grid_column.as_deref().unwrap_or(DEFAULT_SPAN),
                    item.grid_row.as_deref().unwrap_or(DEFAULT_SPAN),
                ),
                _ => (DEFAULT_SPAN, DEFAULT_SPAN),
            };

            let (c0, c1) = parse_span(column_span, column_sizes.len());
            let (r0, r1) = parse_span(row_span, row_sizes.len());
            let (x, width) = span_extent(&column_sizes, column_gap, c0, c1);
            let (y, height) = span_extent(&row_sizes, row_gap, r0, r1);

            CalculatedLayout::new(bounds.x + x, bounds.y + y, width, height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::GridItemLayout;

    fn cell(column: &str, row: &str) -> LayoutKind {
        LayoutKind::GridItem(GridItemLayout {
            grid_column: Some(column.to_string()),
            grid_row: Some(row.to_string()),
            ..Default::default()
        })
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_parse_tracks() {
        assert_eq!(
            parse_tracks("100px repeat(2, 1fr) auto 2fr"),
            vec![
                Track::Pixels(100.0),
                Track::Fraction(1.0),
                Track::Fraction(1.0),
                Track::Fraction(1.0),
                Track::Fraction(2.0),
            ]
        );
        assert!(parse_tracks("").is_empty());
    }

    #[test]
    fn test_repeat_is_capped() {
        let tracks = parse_tracks("repeat(100000000, 1fr)");
        assert_eq!(tracks.len(), MAX_TRACKS);
        assert_eq!(tracks[0], Track::Fraction(1.0));

        let overflowing = parse_tracks("50px repeat(99999999999999999999999, 1fr 2fr)");
        assert_eq!(overflowing.len(), MAX_TRACKS);
        assert_eq!(overflowing[0], Track::Pixels(50.0));

        assert_eq!(requested_tracks("100px repeat(2, 1fr) auto"), 4);
        assert_eq!(requested_tracks("repeat(100000000, 1fr 2fr)"), 200_000_000);
        assert_eq!(requested_tracks("repeat(99999999999999999999999, 1fr)"), usize::MAX);
    }

    #[test]
    fn test_track_sizes_fixed_first() {
        let tracks = parse_tracks("200px 1fr 3fr");
        assert_eq!(track_sizes(&tracks, 1000.0, 0.0), vec![200.0, 200.0, 600.0]);
    }

    #[test]
    fn test_parse_span_clamps() {
        assert_eq!(parse_span("1 / 2", 3), (0, 1));
        assert_eq!(parse_span("2 / 4", 3), (1, 3));
        assert_eq!(parse_span("3 / 9", 3), (2, 3));
        assert_eq!(parse_span("0 / 1", 3), (0, 1));
        assert_eq!(parse_span("2", 3), (1, 2));
        assert_eq!(parse_span("1 / span 2", 3), (0, 2));
    }

    #[test]
    fn test_cell_and_span_arithmetic() {
        let grid = GridLayout {
            template_columns: "repeat(3, 1fr)".to_string(),
            template_rows: "repeat(2, 1fr)".to_string(),
            gap: 10.0,
            ..Default::default()
        };
        let kids = [cell("1 / 2", "1 / 2"), cell("2 / 4", "2 / 3")];
        let refs: Vec<&LayoutKind> = kids.iter().collect();

        let result = arrange(&grid, &refs, CalculatedLayout::new(0.0, 0.0, 900.0, 600.0));

        assert_close(result[0].width, 293.33);
        assert_close(result[0].height, 295.0);
        assert_eq!((result[0].x, result[0].y), (0.0, 0.0));

        assert_close(result[1].width, 596.67);
        assert_close(result[1].x, 303.33);
        assert_close(result[1].y, 305.0);
    }

    #[test]
    fn test_non_item_children_take_first_cell() {
        let grid = GridLayout {
            template_columns: "100px 100px".to_string(),
            ..Default::default()
        };
        let kid = LayoutKind::Relative(Default::default());

        let result = arrange(&grid, &[&kid], CalculatedLayout::new(10.0, 10.0, 200.0, 50.0));

        assert_eq!(result[0], CalculatedLayout::new(10.0, 10.0, 100.0, 50.0));
    }
}
