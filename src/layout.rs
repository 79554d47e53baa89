//! Widget layout - vertical stacking over the wrapped segment list
//!
//! Pass 1 assigns every widget to the visual line its anchor lands on and
//! accumulates the per-line offset table. Pass 2 widens `Above` widgets into
//! neighboring blank rows, recorded as adjustments for the painting layer so
//! the offset table itself stays stable.

use std::collections::HashMap;

use crate::widget::{Placement, Widget};
use crate::wrap::{line_segments, WrappedLine};

/// An inline widget resolved to its column within a visual line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineAnchor {
    pub widget: Widget,
    pub visual_col: usize,
}

/// Where painting should start drawing an `Above` widget that expanded into
/// blank rows above its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetAdjustment {
    pub widget: Widget,
    /// First visual line of the widget's display footprint
    pub display_start: usize,
}

/// Derived widget geometry for one wrap result. Ephemeral - recomputed
/// whenever the wrap result or the widget set changes.
#[derive(Debug, Clone, Default)]
pub struct WidgetLayout {
    /// `Above` widgets bucketed by the visual line they sit over
    pub above: HashMap<usize, Vec<Widget>>,
    /// `Below` widgets bucketed by the visual line they hang under
    pub below: HashMap<usize, Vec<Widget>>,
    /// `Inline` widgets with their resolved visual column
    pub inline: HashMap<usize, Vec<InlineAnchor>>,
    /// `Overlay` widgets reserve no layout space and stack nowhere
    pub overlay: Vec<Widget>,
    /// Widgets with nowhere to go (e.g. `Above` on a wrapped continuation)
    pub hidden: Vec<Widget>,
    /// Pixel band each visual line's own `Above` widgets occupy
    pub above_heights: HashMap<usize, f32>,
    /// `y_offsets[i]` = cumulative pixels added by widget stacking before
    /// visual line `i`; one trailing sentinel entry holds the grand total.
    pub y_offsets: Vec<f32>,
    /// Blank-row expansions, consumed only by the painting layer
    pub adjustments: Vec<WidgetAdjustment>,
}

impl WidgetLayout {
    /// Offset before `visual_line`, clamped into range.
    pub fn offset_at(&self, visual_line: usize) -> f32 {
        match self.y_offsets.get(visual_line) {
            Some(&y) => y,
            None => self.total_offset(),
        }
    }

    /// Total pixels the widget set added to the document height.
    pub fn total_offset(&self) -> f32 {
        self.y_offsets.last().copied().unwrap_or(0.0)
    }

    /// Top of `visual_line`'s text row: base position, plus everything
    /// stacked before the line, plus the line's own above band.
    pub fn text_top(&self, visual_line: usize, line_height: f32) -> f32 {
        visual_line as f32 * line_height
            + self.offset_at(visual_line)
            + self.above_heights.get(&visual_line).copied().unwrap_or(0.0)
    }

    /// Full pixel height of the laid-out content, widgets included.
    pub fn content_height(&self, line_height: f32) -> f32 {
        let segments = self.y_offsets.len().saturating_sub(1);
        segments as f32 * line_height + self.total_offset()
    }
}

/// Assign widgets to visual lines and accumulate the vertical offset table.
pub fn layout(wrapped: &[WrappedLine], widgets: &[Widget], line_height: f32) -> WidgetLayout {
    let mut out = WidgetLayout::default();
    let mut below_heights: HashMap<usize, f32> = HashMap::new();
    let mut inline_excess: HashMap<usize, f32> = HashMap::new();

    for widget in widgets {
        if !widget_valid(wrapped, widget) {
            tracing::trace!(?widget, "skipping widget with stale anchor");
            continue;
        }
        if widget.placement == Placement::Overlay {
            out.overlay.push(*widget);
            continue;
        }

        let segs = line_segments(wrapped, widget.anchor_line());
        let anchor = widget.anchor_col();
        let visual = anchor_segment(wrapped, segs.clone(), anchor);

        match widget.placement {
            Placement::Inline => {
                let col = anchor - wrapped[visual].start_col;
                out.inline
                    .entry(visual)
                    .or_default()
                    .push(InlineAnchor {
                        widget: *widget,
                        visual_col: col,
                    });
                let excess = (widget.height - line_height).max(0.0);
                if excess > 0.0 {
                    let slot = inline_excess.entry(visual).or_insert(0.0);
                    *slot = slot.max(excess);
                }
            }
            Placement::Below => {
                out.below.entry(visual).or_default().push(*widget);
                let slot = below_heights.entry(visual).or_insert(0.0);
                *slot = slot.max(widget.height);
            }
            Placement::Above => {
                if visual != segs.start {
                    // Wrapping alone does not create space above a
                    // continuation segment
                    out.hidden.push(*widget);
                    continue;
                }
                let blanks = blank_rows_above(wrapped, widget.anchor_line());
                out.above.entry(visual).or_default().push(*widget);
                let charged = if blanks == 0 {
                    widget.height
                } else {
                    // Expand into the blank rows; only the excess costs
                    // new vertical space
                    let rows = (widget.height / line_height).ceil().max(1.0) as usize;
                    out.adjustments.push(WidgetAdjustment {
                        widget: *widget,
                        display_start: visual - rows.min(blanks),
                    });
                    (widget.height - blanks as f32 * line_height).max(0.0)
                };
                if charged > 0.0 {
                    let slot = out.above_heights.entry(visual).or_insert(0.0);
                    *slot = slot.max(charged);
                }
            }
            Placement::Overlay => unreachable!(),
        }
    }

    let mut running = 0.0;
    out.y_offsets.reserve(wrapped.len() + 1);
    for visual in 0..wrapped.len() {
        out.y_offsets.push(running);
        running += out.above_heights.get(&visual).copied().unwrap_or(0.0);
        running += below_heights.get(&visual).copied().unwrap_or(0.0);
        running += inline_excess.get(&visual).copied().unwrap_or(0.0);
    }
    out.y_offsets.push(running);
    out
}

/// Segment whose `[start, end)` range holds the anchor; an anchor exactly on
/// a boundary belongs to the start of the following segment, and the line
/// end belongs to the last segment.
fn anchor_segment(
    wrapped: &[WrappedLine],
    segs: std::ops::Range<usize>,
    anchor: usize,
) -> usize {
    for si in segs.clone() {
        if anchor < wrapped[si].end_col {
            return si;
        }
    }
    segs.end - 1
}

fn widget_valid(wrapped: &[WrappedLine], widget: &Widget) -> bool {
    if widget.length == 0 || widget.line == 0 || widget.column == 0 {
        return false;
    }
    let segs = line_segments(wrapped, widget.anchor_line());
    if segs.is_empty() {
        return false;
    }
    widget.anchor_col() <= wrapped[segs.end - 1].end_col
}

/// Count blank logical lines directly above `line`, each contributing one
/// empty visual row an `Above` widget may expand into.
fn blank_rows_above(wrapped: &[WrappedLine], line: usize) -> usize {
    let mut blanks = 0;
    let mut current = line;
    while current > 0 {
        current -= 1;
        let segs = line_segments(wrapped, current);
        let blank = segs.len() == 1 && wrapped[segs.start].text.trim().is_empty();
        if !blank {
            break;
        }
        blanks += 1;
    }
    blanks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::metrics::MonospaceMetrics;
    use crate::wrap::wrap_lines;

    const LINE_HEIGHT: f32 = 10.0;

    fn wrap(text: &str, width: f32) -> Vec<WrappedLine> {
        let doc = Document::from_str(text);
        wrap_lines(&doc, &[], &[], width, &MonospaceMetrics::default())
    }

    #[test]
    fn test_stacked_above_widgets_share_one_row() {
        let wrapped = wrap("alpha\nbeta", 100.0);
        let widgets = vec![
            Widget::new(Placement::Above, 1, 1, 1, 20.0),
            Widget::new(Placement::Above, 1, 1, 1, 30.0),
        ];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        // Max of the stack, not the sum, lands on subsequent lines
        assert_eq!(l.y_offsets, vec![0.0, 30.0, 30.0]);
        assert_eq!(l.above.get(&0).map(Vec::len), Some(2));
    }

    #[test]
    fn test_below_widget_pushes_following_lines() {
        let wrapped = wrap("alpha\nbeta\ngamma", 100.0);
        let widgets = vec![Widget::new(Placement::Below, 2, 1, 1, 12.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 12.0, 12.0]);
    }

    #[test]
    fn test_inline_excess_over_line_height() {
        let wrapped = wrap("alpha\nbeta", 100.0);
        let widgets = vec![Widget::new(Placement::Inline, 1, 2, 1, 25.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.y_offsets, vec![0.0, 15.0, 15.0]);
        let anchors = l.inline.get(&0).unwrap();
        assert_eq!(anchors[0].visual_col, 1);
    }

    #[test]
    fn test_overlay_reserves_nothing() {
        let wrapped = wrap("alpha", 100.0);
        let widgets = vec![Widget::new(Placement::Overlay, 1, 2, 3, 40.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.overlay.len(), 1);
        assert_eq!(l.y_offsets, vec![0.0, 0.0]);
    }

    #[test]
    fn test_boundary_anchor_attaches_to_following_segment() {
        // "aaaa bbbb" at width 5 wraps to [0,5) and [5,9)
        let wrapped = wrap("aaaa bbbb", 5.0);
        assert_eq!(wrapped.len(), 2);
        // 1-based column 6 == 0-based column 5, exactly the boundary
        let widgets = vec![Widget::new(Placement::Inline, 1, 6, 1, 0.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        let anchors = l.inline.get(&1).expect("anchored on the second segment");
        assert_eq!(anchors[0].visual_col, 0);
        assert!(l.inline.get(&0).is_none());
    }

    #[test]
    fn test_above_on_continuation_segment_is_hidden() {
        let wrapped = wrap("aaaa bbbb", 5.0);
        // Anchor inside the second segment of the same logical line
        let widgets = vec![Widget::new(Placement::Above, 1, 7, 1, 20.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.hidden.len(), 1);
        assert!(l.above.is_empty());
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_above_expands_into_blank_lines() {
        let wrapped = wrap("\ncode", 100.0);
        let widgets = vec![Widget::new(Placement::Above, 2, 1, 1, 15.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        // One blank row absorbs 10px; only 5px of new space is charged
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 5.0]);
        assert_eq!(l.adjustments.len(), 1);
        assert_eq!(l.adjustments[0].display_start, 0);
    }

    #[test]
    fn test_above_fully_absorbed_by_blank_lines() {
        let wrapped = wrap("\n\ncode", 100.0);
        let widgets = vec![Widget::new(Placement::Above, 3, 1, 1, 18.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(l.adjustments[0].display_start, 0);
    }

    #[test]
    fn test_malformed_widgets_ignored() {
        let wrapped = wrap("alpha\nbeta", 100.0);
        let widgets = vec![
            Widget::new(Placement::Above, 99, 1, 1, 20.0), // line out of range
            Widget::new(Placement::Inline, 1, 99, 1, 20.0), // column out of range
            Widget::new(Placement::Below, 1, 1, 0, 20.0),  // zero length
        ];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert!(l.above.is_empty() && l.below.is_empty() && l.inline.is_empty());
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sentinel_entry_and_content_height() {
        let wrapped = wrap("alpha\nbeta", 100.0);
        let widgets = vec![Widget::new(Placement::Below, 2, 1, 1, 30.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.y_offsets.len(), wrapped.len() + 1);
        assert_eq!(l.total_offset(), 30.0);
        assert_eq!(l.content_height(LINE_HEIGHT), 2.0 * LINE_HEIGHT + 30.0);
    }

    #[test]
    fn test_text_top_includes_own_above_band() {
        let wrapped = wrap("alpha\nbeta", 100.0);
        let widgets = vec![Widget::new(Placement::Above, 2, 1, 1, 20.0)];
        let l = layout(&wrapped, &widgets, LINE_HEIGHT);
        assert_eq!(l.text_top(0, LINE_HEIGHT), 0.0);
        // Line 1: base 10 + nothing before it + its own 20px band
        assert_eq!(l.text_top(1, LINE_HEIGHT), 30.0);
        assert_eq!(l.y_offsets, vec![0.0, 0.0, 20.0]);
    }
}
