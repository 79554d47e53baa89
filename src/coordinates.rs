//! Coordinate mapping - THE single source of truth for positions
//!
//! Three coordinate spaces with explicit transformations:
//! 1. Document space: logical (line, column) the editor manipulates
//! 2. Visual space: (visual line, column within segment) after wrapping
//! 3. Layout space: logical pixels, pre-scroll (where painting happens)
//!
//! Every query is a pure function over the current wrap state; caret
//! mutation stays with the input handler.

use std::ops::Range;

use crate::layout::WidgetLayout;
use crate::metrics::TextMeasure;
use crate::wrap::{line_segments, WrappedLine};

// === Document Space ===

/// Position in the logical document (0-indexed line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocPos {
    pub line: usize,
    pub column: usize,
}

/// Caret state: a document position plus the sticky visual column kept
/// across vertical moves through shorter lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretPosition {
    pub line: usize,
    pub column: usize,
    pub column_intent: usize,
}

// === Visual Space ===

/// Position in the wrapped visual grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualPos {
    pub visual_line: usize,
    pub visual_col: usize,
}

// === Layout Space (pre-scroll) ===

/// Position in layout space - where things are before scrolling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPos {
    pub x: f32,
    pub y: f32,
}

/// Caret movement direction for vertical moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMove {
    Up,
    Down,
}

/// Caret movement direction for horizontal moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalMove {
    Left,
    Right,
}

// === Document <-> Visual ===

/// Map a logical position to the segment it renders in. A column equal to a
/// segment's end maps to the END of that segment, not the start of the next
/// one. Out-of-range input clamps to the nearest valid position.
pub fn logical_to_visual(line: usize, column: usize, wrapped: &[WrappedLine]) -> VisualPos {
    if wrapped.is_empty() {
        return VisualPos::default();
    }
    let segs = line_segments(wrapped, line);
    if segs.is_empty() {
        // Line beyond the document: clamp to the very end
        let last = wrapped.len() - 1;
        return VisualPos {
            visual_line: last,
            visual_col: wrapped[last].len(),
        };
    }
    for si in segs.clone() {
        let seg = &wrapped[si];
        if column < seg.end_col {
            return VisualPos {
                visual_line: si,
                visual_col: column.saturating_sub(seg.start_col),
            };
        }
        if column == seg.end_col {
            // Boundary columns prefer the end of the earlier segment
            return VisualPos {
                visual_line: si,
                visual_col: seg.len(),
            };
        }
    }
    // Column past the line end: clamp to the last segment
    let si = segs.end - 1;
    VisualPos {
        visual_line: si,
        visual_col: wrapped[si].len(),
    }
}

/// Inverse mapping; clamps both coordinates into range.
pub fn visual_to_logical(
    visual_line: usize,
    visual_col: usize,
    wrapped: &[WrappedLine],
) -> DocPos {
    if wrapped.is_empty() {
        return DocPos::default();
    }
    if visual_line >= wrapped.len() {
        let seg = &wrapped[wrapped.len() - 1];
        return DocPos {
            line: seg.logical_line,
            column: seg.end_col,
        };
    }
    let seg = &wrapped[visual_line];
    DocPos {
        line: seg.logical_line,
        column: seg.start_col + visual_col.min(seg.len()),
    }
}

// === Caret movement across wrap boundaries ===

/// Horizontal move across a wrap boundary, or `None` when plain logical
/// movement applies (word-wrap off, mid-segment moves, logical-line edges).
///
/// Rightward: crossing lands at visual column 1 of the next segment, not 0,
/// so an immediate leftward move returns to the same spot instead of
/// oscillating across the boundary; leftward crossing mirrors this by
/// landing ON the previous segment's last character.
pub fn caret_horizontal(
    dir: HorizontalMove,
    line: usize,
    column: usize,
    wrapped: &[WrappedLine],
    wrap_enabled: bool,
) -> Option<DocPos> {
    if !wrap_enabled || wrapped.is_empty() {
        return None;
    }
    let pos = logical_to_visual(line, column, wrapped);
    let seg = &wrapped[pos.visual_line];
    match dir {
        HorizontalMove::Right => {
            let is_last = pos.visual_line + 1 >= wrapped.len()
                || wrapped[pos.visual_line + 1].logical_line != seg.logical_line;
            if is_last || pos.visual_col + 1 < seg.len() {
                return None;
            }
            let next = &wrapped[pos.visual_line + 1];
            let landing = if next.len() > 1 { 1 } else { next.len() };
            Some(DocPos {
                line: seg.logical_line,
                column: next.start_col + landing,
            })
        }
        HorizontalMove::Left => {
            let is_first = pos.visual_line == 0
                || wrapped[pos.visual_line - 1].logical_line != seg.logical_line;
            if is_first || pos.visual_col > 1 {
                return None;
            }
            let prev = &wrapped[pos.visual_line - 1];
            Some(DocPos {
                line: seg.logical_line,
                column: prev.start_col + prev.len().saturating_sub(1),
            })
        }
    }
}

/// Vertical move by one visual line with sticky-column behavior: the landing
/// column clamps to the target segment, the returned intent does not, so
/// moving through a short line and back restores the original position.
pub fn caret_vertical(
    dir: VerticalMove,
    caret: CaretPosition,
    wrapped: &[WrappedLine],
) -> CaretPosition {
    if wrapped.is_empty() {
        return caret;
    }
    let pos = logical_to_visual(caret.line, caret.column, wrapped);
    let seg = &wrapped[pos.visual_line];
    // Intent comes from the actual column, not the stored one: a caret
    // parked at a segment start means "column 0", a caret at or past the
    // end keeps whatever was chosen before.
    let intent = if pos.visual_col == 0 {
        0
    } else if pos.visual_col >= seg.len() {
        caret.column_intent
    } else {
        pos.visual_col.max(caret.column_intent)
    };
    let target = match dir {
        VerticalMove::Up => {
            if pos.visual_line == 0 {
                return CaretPosition {
                    line: seg.logical_line,
                    column: seg.start_col,
                    column_intent: 0,
                };
            }
            pos.visual_line - 1
        }
        VerticalMove::Down => {
            if pos.visual_line + 1 >= wrapped.len() {
                return CaretPosition {
                    line: seg.logical_line,
                    column: seg.end_col,
                    column_intent: intent,
                };
            }
            pos.visual_line + 1
        }
    };
    let tseg = &wrapped[target];
    CaretPosition {
        line: tseg.logical_line,
        column: tseg.start_col + intent.min(tseg.len()),
        column_intent: intent,
    }
}

/// Smart home: toggles between column 0 and the first non-whitespace column
/// of the logical line.
pub fn caret_line_start(line: usize, column: usize, wrapped: &[WrappedLine]) -> DocPos {
    let segs = line_segments(wrapped, line);
    let mut first_nonws = None;
    'scan: for si in segs {
        for (i, ch) in wrapped[si].text.chars().enumerate() {
            if !ch.is_whitespace() {
                first_nonws = Some(wrapped[si].start_col + i);
                break 'scan;
            }
        }
    }
    let target = match first_nonws {
        Some(c) if column != c => c,
        _ => 0,
    };
    DocPos {
        line,
        column: target,
    }
}

/// End of the *current visual segment*; pressed again at a segment end it
/// advances to the end of the next segment of the same logical line.
pub fn caret_line_end(line: usize, column: usize, wrapped: &[WrappedLine]) -> DocPos {
    if wrapped.is_empty() {
        return DocPos { line, column };
    }
    let pos = logical_to_visual(line, column, wrapped);
    let seg = &wrapped[pos.visual_line];
    if pos.visual_col < seg.len() {
        return DocPos {
            line: seg.logical_line,
            column: seg.end_col,
        };
    }
    let next = pos.visual_line + 1;
    if next < wrapped.len() && wrapped[next].logical_line == seg.logical_line {
        DocPos {
            line: seg.logical_line,
            column: wrapped[next].end_col,
        }
    } else {
        DocPos {
            line: seg.logical_line,
            column: seg.end_col,
        }
    }
}

// === Document <-> Layout pixels ===

/// Layout-space position of a caret: x measured through the segment prefix
/// plus any inline-widget reservations before the column, y from the offset
/// table.
pub fn caret_pixel(
    pos: DocPos,
    wrapped: &[WrappedLine],
    layout: &WidgetLayout,
    metrics: &dyn TextMeasure,
    line_height: f32,
) -> LayoutPos {
    if wrapped.is_empty() {
        return LayoutPos::default();
    }
    let vis = logical_to_visual(pos.line, pos.column, wrapped);
    let seg = &wrapped[vis.visual_line];
    let prefix: String = seg.text.chars().take(vis.visual_col).collect();
    let mut x = metrics.measure(&prefix);
    if let Some(anchors) = layout.inline.get(&vis.visual_line) {
        for anchor in anchors {
            if anchor.visual_col < vis.visual_col {
                x += anchor.widget.inline_cost(metrics);
            }
        }
    }
    LayoutPos {
        x,
        y: layout.text_top(vis.visual_line, line_height),
    }
}

/// Pointer click to document position. The column uses the midpoint rule
/// (click past half a glyph advances to the next column); coordinates beyond
/// the content clamp to the nearest valid position.
pub fn hit_test(
    point: LayoutPos,
    wrapped: &[WrappedLine],
    layout: &WidgetLayout,
    metrics: &dyn TextMeasure,
    line_height: f32,
) -> DocPos {
    if wrapped.is_empty() {
        return DocPos::default();
    }
    let mut visual = 0;
    for v in 0..wrapped.len() {
        if layout.text_top(v, line_height) <= point.y {
            visual = v;
        } else {
            break;
        }
    }
    let seg = &wrapped[visual];
    let anchors = layout.inline.get(&visual);
    let mut x = 0.0;
    let mut column = seg.len();
    for (i, ch) in seg.text.chars().enumerate() {
        if let Some(anchors) = anchors {
            for anchor in anchors {
                if anchor.visual_col == i {
                    x += anchor.widget.inline_cost(metrics);
                }
            }
        }
        let w = metrics.measure(ch.to_string().as_str());
        if point.x < x + w / 2.0 {
            column = i;
            break;
        }
        x += w;
    }
    DocPos {
        line: seg.logical_line,
        column: seg.start_col + column,
    }
}

// === Viewport ===

/// Scroll state plus the window dimensions needed for visibility queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Current scroll position in layout space
    pub scroll: LayoutPos,
    /// Logical viewport width
    pub width: f32,
    /// Logical viewport height
    pub height: f32,
    /// Base row height in logical pixels
    pub line_height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, line_height: f32) -> Self {
        Self {
            scroll: LayoutPos::default(),
            width,
            height,
            line_height,
        }
    }

    /// Visual lines intersecting the viewport, widget bands included.
    pub fn visible_lines(&self, layout: &WidgetLayout) -> Range<usize> {
        let count = layout.y_offsets.len().saturating_sub(1);
        let top = self.scroll.y;
        let bottom = top + self.height;
        let mut first = None;
        let mut last = 0;
        for v in 0..count {
            let row_top = layout.text_top(v, self.line_height);
            if row_top + self.line_height > top && first.is_none() {
                first = Some(v);
            }
            if row_top < bottom {
                last = v + 1;
            }
        }
        let first = first.unwrap_or(0);
        first..last.max(first)
    }

    /// Scroll just enough to bring a layout position into view.
    pub fn ensure_visible(&mut self, pos: LayoutPos) {
        if pos.x < self.scroll.x {
            self.scroll.x = pos.x;
        } else if pos.x > self.scroll.x + self.width {
            self.scroll.x = pos.x - self.width + 50.0; // Leave some margin
        }
        if pos.y < self.scroll.y {
            self.scroll.y = pos.y;
        } else if pos.y + self.line_height > self.scroll.y + self.height {
            self.scroll.y = pos.y + self.line_height - self.height;
        }
    }
}
