//! Anchored widget records consumed by wrap and layout
//!
//! Widgets are decorations the host pins to a logical (line, column):
//! diagnostics banners, inline pills, lens overlays. The engine only reads
//! them - it reserves their columns during wrapping and stacks their heights
//! during layout, and it never mutates the host's list.

use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::document::Document;
use crate::metrics::TextMeasure;

/// Where a widget takes up space relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Occupies a band above the anchor's visual row
    Above,
    /// Occupies a band below the anchor's visual row
    Below,
    /// Occupies horizontal space inside the text flow
    Inline,
    /// Painted over the text; reserves no layout space
    Overlay,
}

/// An anchored decoration. Anchors are 1-based, matching how hosts address
/// editor positions; `length` is the reserved span in columns and `height`
/// the reserved band in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Widget {
    pub placement: Placement,
    /// 1-based logical line
    pub line: u32,
    /// 1-based logical column
    pub column: u32,
    /// Columns reserved at the anchor
    pub length: u32,
    /// Pixel height of the widget
    pub height: f32,
}

impl Widget {
    pub fn new(placement: Placement, line: u32, column: u32, length: u32, height: f32) -> Self {
        Self {
            placement,
            line,
            column,
            length,
            height,
        }
    }

    /// 0-based anchor line.
    pub fn anchor_line(&self) -> usize {
        (self.line as usize).saturating_sub(1)
    }

    /// 0-based anchor column.
    pub fn anchor_col(&self) -> usize {
        (self.column as usize).saturating_sub(1)
    }

    /// The reserved column span `[anchor, anchor + length)` in 0-based
    /// columns. Break points must not land strictly inside this range.
    pub fn span(&self) -> Range<usize> {
        let start = self.anchor_col();
        start..start + self.length as usize
    }

    /// Pixel cost an inline widget adds to a candidate segment: the width of
    /// its reserved columns under the active font.
    pub fn inline_cost(&self, metrics: &dyn TextMeasure) -> f32 {
        metrics.measure(&" ".repeat(self.length as usize))
    }

    /// Malformed widgets (zero/negative reservation, anchor outside the
    /// document) are dropped from layout rather than rejected - the host may
    /// transiently hold stale anchors mid-edit.
    pub fn is_valid_for(&self, doc: &Document) -> bool {
        if self.length == 0 || self.line == 0 || self.column == 0 {
            return false;
        }
        let line = self.anchor_line();
        if line >= doc.line_count() {
            return false;
        }
        self.anchor_col() <= doc.line_len(line)
    }
}

/// Filter a host widget list down to the ones layout may use.
pub fn valid_widgets<'a>(widgets: &'a [Widget], doc: &Document) -> Vec<&'a Widget> {
    let mut kept = Vec::with_capacity(widgets.len());
    for widget in widgets {
        if widget.is_valid_for(doc) {
            kept.push(widget);
        } else {
            tracing::trace!(?widget, "dropping malformed widget");
        }
    }
    kept
}

/// Structural fingerprint of the widget set: placement, anchor, length, and
/// height per widget. Part of the layout cache key.
pub fn widgets_fingerprint(widgets: &[Widget]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    widgets.len().hash(&mut hasher);
    for w in widgets {
        w.placement.hash(&mut hasher);
        w.line.hash(&mut hasher);
        w.column.hash(&mut hasher);
        w.length.hash(&mut hasher);
        w.height.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
