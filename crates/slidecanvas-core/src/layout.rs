//! Slide layout: per-slide positions and slideshow sizing.
//!
//! Everything here is a pure function of the pattern, the ordered slide
//! sizes and a [`LayoutConfig`]. Calling it twice with the same input gives
//! bit-identical output.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

/// Gap between slides and between slides and the slideshow edge.
pub const SPACING: f64 = 20.0;
/// Height of the slideshow's title band.
pub const HEADER_HEIGHT: f64 = 32.0;
/// Extra vertical padding between the header band and the slides.
pub const PADDING: f64 = 16.0;
/// Default slide size (16:9).
pub const SLIDE_WIDTH: f64 = 320.0;
pub const SLIDE_HEIGHT: f64 = 180.0;
/// Height of a slide's own title band; the content frame sits below it.
pub const SLIDE_HEADER_HEIGHT: f64 = 24.0;
/// Size of a slideshow with no slides.
pub const MIN_CONTAINER_WIDTH: f64 = 360.0;
pub const MIN_CONTAINER_HEIGHT: f64 = 240.0;

/// Layout strategy of a slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutPattern {
    #[default]
    Horizontal,
    Vertical,
    Grid,
    Radial,
}

impl LayoutPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutPattern::Horizontal => "horizontal",
            LayoutPattern::Vertical => "vertical",
            LayoutPattern::Grid => "grid",
            LayoutPattern::Radial => "radial",
        }
    }

    /// Parse a pattern name, falling back to horizontal for anything unknown.
    pub fn parse_lossy(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown layout pattern {:?}, using horizontal", name);
            LayoutPattern::Horizontal
        })
    }

    /// Cycle to the next pattern.
    pub fn next(self) -> Self {
        match self {
            LayoutPattern::Horizontal => LayoutPattern::Vertical,
            LayoutPattern::Vertical => LayoutPattern::Grid,
            LayoutPattern::Grid => LayoutPattern::Radial,
            LayoutPattern::Radial => LayoutPattern::Horizontal,
        }
    }
}

impl fmt::Display for LayoutPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(LayoutPattern::Horizontal),
            "vertical" => Ok(LayoutPattern::Vertical),
            "grid" => Ok(LayoutPattern::Grid),
            "radial" => Ok(LayoutPattern::Radial),
            other => Err(other.to_string()),
        }
    }
}

impl From<String> for LayoutPattern {
    fn from(name: String) -> Self {
        Self::parse_lossy(&name)
    }
}

impl From<LayoutPattern> for String {
    fn from(pattern: LayoutPattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// Layout constants. Hosts may override them; defaults match the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub spacing: f64,
    pub header_height: f64,
    pub padding: f64,
    /// Size given to newly created slides.
    pub slide_size: Size,
    /// Size of an empty slideshow.
    pub min_container_size: Size,
    /// Offset of a slide's content frame from the slide's origin.
    pub content_offset: Vec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: SPACING,
            header_height: HEADER_HEIGHT,
            padding: PADDING,
            slide_size: Size::new(SLIDE_WIDTH, SLIDE_HEIGHT),
            min_container_size: Size::new(MIN_CONTAINER_WIDTH, MIN_CONTAINER_HEIGHT),
            content_offset: Vec2::new(0.0, SLIDE_HEADER_HEIGHT),
        }
    }
}

impl LayoutConfig {
    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Vertical offset of the first slide row from the slideshow origin.
    pub fn content_top(&self) -> f64 {
        self.header_height + self.padding
    }
}

/// Number of grid columns for `count` slides.
pub fn grid_columns(count: usize) -> usize {
    if count == 0 {
        return 1;
    }
    (count as f64).sqrt().ceil() as usize
}

/// Number of grid rows for `count` slides.
pub fn grid_rows(count: usize) -> usize {
    count.div_ceil(grid_columns(count))
}

/// Largest slide extent, used as the cell size for grid and radial layouts.
pub fn slot_size(sizes: &[Size], config: &LayoutConfig) -> Size {
    if sizes.is_empty() {
        return config.slide_size;
    }
    sizes.iter().fold(Size::ZERO, |acc, s| {
        Size::new(acc.width.max(s.width), acc.height.max(s.height))
    })
}

/// Radius of the radial ring that fits `count` slots of `slot` without overlap.
fn radial_radius(count: usize, slot: Size, config: &LayoutConfig) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    let arc = slot.width.max(slot.height) + config.spacing;
    count as f64 * arc / TAU
}

/// Size a slideshow must have to hold `sizes` in `pattern`.
pub fn size_for(pattern: LayoutPattern, sizes: &[Size], config: &LayoutConfig) -> Size {
    if sizes.is_empty() {
        return config.min_container_size;
    }
    let s = config.spacing;
    match pattern {
        LayoutPattern::Horizontal => {
            let width = s + sizes.iter().map(|c| c.width + s).sum::<f64>();
            let tallest = sizes.iter().fold(0.0_f64, |acc, c| acc.max(c.height));
            Size::new(width, config.header_height + 2.0 * config.padding + tallest)
        }
        LayoutPattern::Vertical => {
            let widest = sizes.iter().fold(0.0_f64, |acc, c| acc.max(c.width));
            let height = config.header_height
                + config.padding
                + s
                + sizes.iter().map(|c| c.height + s).sum::<f64>();
            Size::new(widest + 2.0 * s, height)
        }
        LayoutPattern::Grid | LayoutPattern::Radial => {
            uniform_size(pattern, sizes.len(), slot_size(sizes, config), config)
        }
    }
}

/// Size of a slideshow holding `count` slides that are all `child` sized.
fn uniform_size(pattern: LayoutPattern, count: usize, child: Size, config: &LayoutConfig) -> Size {
    if count == 0 {
        return config.min_container_size;
    }
    let s = config.spacing;
    let n = count as f64;
    match pattern {
        LayoutPattern::Horizontal => Size::new(
            s + n * (child.width + s),
            config.header_height + 2.0 * config.padding + child.height,
        ),
        LayoutPattern::Vertical => Size::new(
            child.width + 2.0 * s,
            config.header_height + config.padding + s + n * (child.height + s),
        ),
        LayoutPattern::Grid => {
            let cols = grid_columns(count) as f64;
            let rows = grid_rows(count) as f64;
            Size::new(
                cols * (child.width + s) + s,
                config.content_top() + rows * (child.height + s) + s,
            )
        }
        LayoutPattern::Radial => {
            let diameter = 2.0 * radial_radius(count, child, config);
            Size::new(
                diameter + child.width + 2.0 * s,
                config.header_height + diameter + child.height + 2.0 * s,
            )
        }
    }
}

/// Position of slot `index` out of `total` equally sized slides.
///
/// `origin` is the slideshow's top-left corner in page space.
pub fn position_for(
    pattern: LayoutPattern,
    index: usize,
    total: usize,
    child_size: Size,
    origin: Point,
    config: &LayoutConfig,
) -> Point {
    let total = total.max(1);
    let container = uniform_size(pattern, total, child_size, config);
    slot_position(pattern, index, total, child_size, origin, container, config)
}

/// [`position_for`] with the container size already known.
fn slot_position(
    pattern: LayoutPattern,
    index: usize,
    total: usize,
    child_size: Size,
    origin: Point,
    container: Size,
    config: &LayoutConfig,
) -> Point {
    let total = total.max(1);
    let index = index.min(total - 1);
    let s = config.spacing;
    match pattern {
        LayoutPattern::Horizontal => Point::new(
            origin.x + s + index as f64 * (child_size.width + s),
            origin.y + config.content_top(),
        ),
        LayoutPattern::Vertical => Point::new(
            origin.x + (container.width - child_size.width) / 2.0,
            origin.y + config.content_top() + s + index as f64 * (child_size.height + s),
        ),
        LayoutPattern::Grid => {
            let cols = grid_columns(total);
            let col = index % cols;
            let row = index / cols;
            Point::new(
                origin.x + s + col as f64 * (child_size.width + s),
                origin.y + config.content_top() + s + row as f64 * (child_size.height + s),
            )
        }
        LayoutPattern::Radial => {
            let radius = radial_radius(total, child_size, config);
            let center = radial_center(container, origin, config);
            let angle = TAU * index as f64 / total as f64;
            Point::new(
                center.x + radius * angle.cos() - child_size.width / 2.0,
                center.y + radius * angle.sin() - child_size.height / 2.0,
            )
        }
    }
}

fn radial_center(container: Size, origin: Point, config: &LayoutConfig) -> Point {
    Point::new(
        origin.x + container.width / 2.0,
        origin.y + config.header_height + (container.height - config.header_height) / 2.0,
    )
}

/// Positions for every slide in order.
///
/// Horizontal and vertical layouts accumulate each slide's own extent; grid
/// and radial layouts use the largest slide as the cell size.
pub fn layout_positions(
    pattern: LayoutPattern,
    sizes: &[Size],
    origin: Point,
    config: &LayoutConfig,
) -> Vec<Point> {
    let s = config.spacing;
    match pattern {
        LayoutPattern::Horizontal => {
            let mut x = origin.x + s;
            sizes
                .iter()
                .map(|size| {
                    let p = Point::new(x, origin.y + config.content_top());
                    x += size.width + s;
                    p
                })
                .collect()
        }
        LayoutPattern::Vertical => {
            let container = size_for(pattern, sizes, config);
            let mut y = origin.y + config.content_top() + s;
            sizes
                .iter()
                .map(|size| {
                    let p = Point::new(origin.x + (container.width - size.width) / 2.0, y);
                    y += size.height + s;
                    p
                })
                .collect()
        }
        LayoutPattern::Grid | LayoutPattern::Radial => {
            let slot = slot_size(sizes, config);
            let container = uniform_size(pattern, sizes.len(), slot, config);
            (0..sizes.len())
                .map(|i| slot_position(pattern, i, sizes.len(), slot, origin, container, config))
                .collect()
        }
    }
}

/// Project a page-space anchor onto the slot axis of `pattern`.
///
/// `slots` is the number of slots in the arrangement the dragged slide would
/// join (existing slides plus the dragged one). Returns a fractional slot
/// position; callers round and clamp it.
pub fn project_slot(
    pattern: LayoutPattern,
    anchor: Point,
    slots: usize,
    child_size: Size,
    origin: Point,
    config: &LayoutConfig,
) -> f64 {
    let slots = slots.max(1);
    let s = config.spacing;
    match pattern {
        LayoutPattern::Horizontal => {
            (anchor.x - origin.x - s - child_size.width / 2.0) / (child_size.width + s)
        }
        LayoutPattern::Vertical => {
            (anchor.y - origin.y - config.content_top() - s - child_size.height / 2.0)
                / (child_size.height + s)
        }
        LayoutPattern::Grid => {
            let cols = grid_columns(slots);
            let col = ((anchor.x - origin.x - s - child_size.width / 2.0) / (child_size.width + s))
                .round()
                .clamp(0.0, (cols - 1) as f64);
            let row = ((anchor.y - origin.y - config.content_top() - s - child_size.height / 2.0)
                / (child_size.height + s))
                .round()
                .max(0.0);
            row * cols as f64 + col
        }
        LayoutPattern::Radial => {
            let container = uniform_size(pattern, slots, child_size, config);
            let center = radial_center(container, origin, config);
            let offset = anchor - center;
            if offset.hypot() < f64::EPSILON {
                return 0.0;
            }
            let angle = offset.y.atan2(offset.x).rem_euclid(TAU);
            let slot = angle / (TAU / slots as f64);
            // Past the last slot the ring wraps back to slot 0.
            if slot > slots as f64 - 0.5 { 0.0 } else { slot }
        }
    }
}
