//! Selection regions decomposed against the wrap result
//!
//! A selection is a cursor plus an anchor in document space. Painting needs
//! per-visual-line column spans, so the decomposition walks the wrapped
//! segments and clips the selected range into each one.

use crate::coordinates::DocPos;
use crate::wrap::WrappedLine;

/// Selection with cursor and anchor in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Cursor position (where we are)
    pub cursor: DocPos,
    /// Anchor position (where we started)
    pub anchor: DocPos,
}

impl Selection {
    pub fn new(anchor: DocPos, cursor: DocPos) -> Self {
        Self { cursor, anchor }
    }

    /// Collapsed selection at a single position.
    pub fn caret(pos: DocPos) -> Self {
        Self {
            cursor: pos,
            anchor: pos,
        }
    }

    /// Check if this is just a cursor (no selected range).
    pub fn is_caret(&self) -> bool {
        self.cursor == self.anchor
    }

    /// Selection endpoints in document order.
    pub fn ordered(&self) -> (DocPos, DocPos) {
        let cursor_key = (self.cursor.line, self.cursor.column);
        let anchor_key = (self.anchor.line, self.anchor.column);
        if cursor_key <= anchor_key {
            (self.cursor, self.anchor)
        } else {
            (self.anchor, self.cursor)
        }
    }
}

/// One highlight span within a visual line, in visual columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub visual_line: usize,
    /// Start column within the segment (inclusive)
    pub start_col: usize,
    /// End column within the segment (exclusive)
    pub end_col: usize,
}

/// Clip a selection into at most one span per visual line. Empty segments
/// strictly inside the selection yield zero-width spans the host paints as
/// a sliver.
pub fn selection_spans(selection: &Selection, wrapped: &[WrappedLine]) -> Vec<SelectionSpan> {
    if selection.is_caret() {
        return Vec::new();
    }
    let (start, end) = selection.ordered();
    let mut spans = Vec::new();
    for (v, seg) in wrapped.iter().enumerate() {
        let line = seg.logical_line;
        if line < start.line || line > end.line {
            continue;
        }
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { usize::MAX };
        let lo = from.max(seg.start_col);
        let hi = to.min(seg.end_col);
        if lo < hi {
            spans.push(SelectionSpan {
                visual_line: v,
                start_col: lo - seg.start_col,
                end_col: hi - seg.start_col,
            });
        } else if seg.is_empty() && line > start.line && line < end.line {
            spans.push(SelectionSpan {
                visual_line: v,
                start_col: 0,
                end_col: 0,
            });
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::metrics::MonospaceMetrics;
    use crate::wrap::wrap_lines;

    fn wrap(text: &str, width: f32) -> Vec<WrappedLine> {
        let doc = Document::from_str(text);
        wrap_lines(&doc, &[], &[], width, &MonospaceMetrics::default())
    }

    fn pos(line: usize, column: usize) -> DocPos {
        DocPos { line, column }
    }

    #[test]
    fn test_caret_selection_paints_nothing() {
        let wrapped = wrap("hello", 100.0);
        let sel = Selection::caret(pos(0, 3));
        assert!(selection_spans(&sel, &wrapped).is_empty());
    }

    #[test]
    fn test_single_segment_span() {
        let wrapped = wrap("hello world", 100.0);
        let sel = Selection::new(pos(0, 2), pos(0, 7));
        let spans = selection_spans(&sel, &wrapped);
        assert_eq!(
            spans,
            vec![SelectionSpan { visual_line: 0, start_col: 2, end_col: 7 }]
        );
    }

    #[test]
    fn test_selection_across_wrap_boundary() {
        // "0123456789" + "abcde"
        let wrapped = wrap("0123456789abcde", 10.0);
        let sel = Selection::new(pos(0, 5), pos(0, 12));
        let spans = selection_spans(&sel, &wrapped);
        assert_eq!(
            spans,
            vec![
                SelectionSpan { visual_line: 0, start_col: 5, end_col: 10 },
                SelectionSpan { visual_line: 1, start_col: 0, end_col: 2 },
            ]
        );
    }

    #[test]
    fn test_reversed_selection_normalizes() {
        let wrapped = wrap("hello world", 100.0);
        let forward = Selection::new(pos(0, 2), pos(0, 7));
        let backward = Selection::new(pos(0, 7), pos(0, 2));
        assert_eq!(
            selection_spans(&forward, &wrapped),
            selection_spans(&backward, &wrapped)
        );
    }

    #[test]
    fn test_interior_empty_line_gets_sliver_span() {
        let wrapped = wrap("ab\n\ncd", 100.0);
        let sel = Selection::new(pos(0, 1), pos(2, 1));
        let spans = selection_spans(&sel, &wrapped);
        assert_eq!(
            spans,
            vec![
                SelectionSpan { visual_line: 0, start_col: 1, end_col: 2 },
                SelectionSpan { visual_line: 1, start_col: 0, end_col: 0 },
                SelectionSpan { visual_line: 2, start_col: 0, end_col: 1 },
            ]
        );
    }

    #[test]
    fn test_full_interior_line_selected_whole() {
        let wrapped = wrap("aa\nbbbb\ncc", 100.0);
        let sel = Selection::new(pos(0, 0), pos(2, 2));
        let spans = selection_spans(&sel, &wrapped);
        assert_eq!(spans[1], SelectionSpan { visual_line: 1, start_col: 0, end_col: 4 });
    }
}
