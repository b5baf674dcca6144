// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A component's position request: one layout kind plus optional constraints.
///
/// ```yaml
/// type: flex
/// direction: row
/// gap: 16
/// constraints:
///   minWidth: 320
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    #[serde(flatten)]
    pub kind: LayoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<LayoutConstraints>,
}

impl LayoutDefinition {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            constraints: None,
        }
    }

    pub fn with_constraints(mut self, constraints: LayoutConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

impl From<LayoutKind> for LayoutDefinition {
    fn from(kind: LayoutKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayoutKind {
    Absolute(AbsoluteLayout),
    Flex(FlexLayout),
    FlexItem(FlexItemLayout),
    Grid(GridLayout),
    GridItem(GridItemLayout),
    Relative(RelativeLayout),
    Responsive(ResponsiveLayout),
}

impl LayoutKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            LayoutKind::Absolute(_) => "absolute",
            LayoutKind::Flex(_) => "flex",
            LayoutKind::FlexItem(_) => "flex-item",
            LayoutKind::Grid(_) => "grid",
            LayoutKind::GridItem(_) => "grid-item",
            LayoutKind::Relative(_) => "relative",
            LayoutKind::Responsive(_) => "responsive",
        }
    }

    /// Width and height the component asks for, if any.
    ///
    /// Percentage sizes on absolute layouts are not fixed sizes and report `None`.
    pub fn declared_size(&self) -> (Option<f64>, Option<f64>) {
        match self {
            LayoutKind::Absolute(a) if a.unit == Unit::Pixels => (a.width, a.height),
            LayoutKind::FlexItem(i) => (i.width, i.height),
            LayoutKind::GridItem(i) => (i.width, i.height),
            _ => (None, None),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pixels,
    Percentage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsoluteLayout {
    pub x: f64,
    pub y: f64,
    /// Falls back to the parent width.
    pub width: Option<f64>,
    /// Falls back to the parent height.
    pub height: Option<f64>,
    pub unit: Unit,
}

impl AbsoluteLayout {
    /// Position within `parent`, scaling by the parent size for percentage units.
    pub fn resolve(&self, parent: CalculatedLayout) -> CalculatedLayout {
        match self.unit {
            Unit::Pixels => CalculatedLayout::new(
                parent.x + self.x,
                parent.y + self.y,
                self.width.unwrap_or(parent.width),
                self.height.unwrap_or(parent.height),
            ),
            Unit::Percentage => CalculatedLayout::new(
                parent.x + parent.width * self.x / 100.0,
                parent.y + parent.height * self.y / 100.0,
                parent.width * self.width.unwrap_or(100.0) / 100.0,
                parent.height * self.height.unwrap_or(100.0) / 100.0,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexLayout {
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub gap: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexItemLayout {
    /// Share of the free main-axis space; zero or absent means fixed size.
    pub flex: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridLayout {
    /// Track list, e.g. `"200px 1fr 2fr"` or `"repeat(3, 1fr)"`.
    pub template_columns: String,
    pub template_rows: String,
    pub gap: f64,
    /// Overrides `gap` between columns.
    pub column_gap: Option<f64>,
    /// Overrides `gap` between rows.
    pub row_gap: Option<f64>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            template_columns: "1fr".to_string(),
            template_rows: "1fr".to_string(),
            gap: 0.0,
            column_gap: None,
            row_gap: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridItemLayout {
    /// `"start / end"`, 1-indexed, end exclusive. Defaults to `"1 / 2"`.
    pub grid_column: Option<String>,
    pub grid_row: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelativeLayout {
    pub relative_to: Option<String>,
    pub offset: Offset,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveLayout {
    /// Layout used when no breakpoint matches or the matching one has none.
    pub layout: Option<Box<LayoutDefinition>>,
    pub breakpoints: IndexMap<String, ResponsiveBreakpoint>,
    /// Per-breakpoint visibility; unspecified breakpoints are visible.
    pub visibility: IndexMap<String, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponsiveBreakpoint {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub layout: Option<Box<LayoutDefinition>>,
}

/// Inclusive container-width range for a named breakpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreakpointRange {
    #[serde(alias = "min_width")]
    pub min_width: Option<f64>,
    #[serde(alias = "max_width")]
    pub max_width: Option<f64>,
}

impl BreakpointRange {
    pub fn new(min_width: Option<f64>, max_width: Option<f64>) -> Self {
        Self {
            min_width,
            max_width,
        }
    }

    pub fn contains(&self, width: f64) -> bool {
        self.min_width.map_or(true, |min| width >= min)
            && self.max_width.map_or(true, |max| width <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min_width.is_none() && self.max_width.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConstraints {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    /// `"W:H"`, e.g. `"16:9"`.
    pub aspect_ratio: Option<String>,
    pub maintain_aspect_ratio: bool,
}

/// A node of the component forest. Children are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLayout {
    pub id: String,
    pub layout: LayoutDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl ComponentLayout {
    pub fn new(id: impl Into<String>, layout: impl Into<LayoutDefinition>) -> Self {
        Self {
            id: id.into(),
            layout: layout.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Absolute geometry of one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CalculatedLayout {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn intersects(&self, other: &CalculatedLayout) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

impl From<Container> for CalculatedLayout {
    fn from(container: Container) -> Self {
        Self::new(0.0, 0.0, container.width, container.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub is_valid: bool,
    pub layouts: IndexMap<String, CalculatedLayout>,
    pub visibility: IndexMap<String, bool>,
    pub active_breakpoint: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOptions {
    pub duration: Duration,
    pub easing: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Move,
    Appear,
    Disappear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTransition {
    pub component_id: String,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub properties: IndexMap<String, PropertyChange>,
    pub duration: Duration,
    pub easing: String,
}
