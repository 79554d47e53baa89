//! Line-wrap engine - partitions logical lines into visual segments
//!
//! The break-point policy is an ordered chain of candidate functions, applied
//! per segment after a binary search finds the longest fitting prefix:
//! widget-span protection, movable word/call units, whitespace, punctuation,
//! token boundaries, hard break, then a ligature guard over whatever the
//! chain picked. Results are memoized in a single slot keyed by document,
//! width, widget set, and font fingerprints.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use lazy_static::lazy_static;

use crate::document::Document;
use crate::metrics::TextMeasure;
use crate::syntax::{token_boundaries, Token, TokenSource};
use crate::widget::{valid_widgets, widgets_fingerprint, Placement, Widget};

/// Narrower wrap widths than this are silently raised; below it the split
/// heuristics degenerate into per-character output.
pub const MIN_WRAP_WIDTH: f32 = 100.0;

/// Slack for floating-point width comparisons.
const WIDTH_EPSILON: f32 = 0.001;

lazy_static! {
    /// Two-character operator glyphs that must never straddle a break.
    static ref LIGATURES: HashSet<&'static str> = [
        "->", "=>", "==", "!=", "<=", ">=", "::", "&&", "||", "..", "<<",
        ">>", ":=", "|>", "+=", "-=", "*=", "/=",
    ]
    .into_iter()
    .collect();
}

/// One visual line: a contiguous column range of a logical line.
///
/// For a fixed logical line the produced segments are contiguous, ordered,
/// non-overlapping, and cover exactly `[0, line_len)`. An empty logical line
/// produces exactly one zero-length segment.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    /// 0-based index of the logical line this segment belongs to
    pub logical_line: usize,
    /// The segment's text (the line substring at `[start_col, end_col)`)
    pub text: String,
    /// Start column in the logical line (inclusive)
    pub start_col: usize,
    /// End column in the logical line (exclusive)
    pub end_col: usize,
}

impl WrappedLine {
    /// Segment length in columns.
    pub fn len(&self) -> usize {
        self.end_col - self.start_col
    }

    pub fn is_empty(&self) -> bool {
        self.end_col == self.start_col
    }
}

/// Index range of `line`'s segments within an ordered wrap result.
pub fn line_segments(wrapped: &[WrappedLine], line: usize) -> Range<usize> {
    let start = wrapped.partition_point(|seg| seg.logical_line < line);
    let end = wrapped.partition_point(|seg| seg.logical_line <= line);
    start..end
}

/// Identity wrap: one segment spanning each full logical line. Used when
/// word-wrap is disabled.
pub fn unwrapped(doc: &Document) -> Vec<WrappedLine> {
    doc.lines()
        .iter()
        .enumerate()
        .map(|(i, line)| WrappedLine {
            logical_line: i,
            text: line.clone(),
            start_col: 0,
            end_col: line.chars().count(),
        })
        .collect()
}

/// Wrap every logical line against a pixel width budget.
///
/// `tokens_per_line` may be shorter than the document (missing entries mean
/// no token-boundary bias). Widgets arrive in arbitrary order; only valid
/// `Inline` ones participate in measurement and span protection. The caller
/// provides a sane `max_width`; [`WrapEngine`] applies the system floor.
pub fn wrap_lines(
    doc: &Document,
    tokens_per_line: &[Vec<Token>],
    widgets: &[Widget],
    max_width: f32,
    metrics: &dyn TextMeasure,
) -> Vec<WrappedLine> {
    let valid = valid_widgets(widgets, doc);
    let mut out = Vec::with_capacity(doc.line_count());
    for (idx, line) in doc.lines().iter().enumerate() {
        let bounds = tokens_per_line
            .get(idx)
            .map(|tokens| token_boundaries(tokens))
            .unwrap_or_default();
        let inline: Vec<&Widget> = valid
            .iter()
            .copied()
            .filter(|w| w.placement == Placement::Inline && w.anchor_line() == idx)
            .collect();
        wrap_line(idx, line, &bounds, &inline, max_width, metrics, &mut out);
    }
    out
}

/// An inline widget's horizontal footprint on one line.
struct InlineSpan {
    /// Reserved span start, 0-based column
    start: usize,
    /// Reserved span end, clamped to the line length for break protection
    end: usize,
    /// Pixel cost added wherever the widget is anchored
    cost: f32,
}

fn wrap_line(
    line_idx: usize,
    text: &str,
    token_bounds: &[usize],
    inline: &[&Widget],
    max_width: f32,
    metrics: &dyn TextMeasure,
    out: &mut Vec<WrappedLine>,
) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len == 0 {
        out.push(WrappedLine {
            logical_line: line_idx,
            text: String::new(),
            start_col: 0,
            end_col: 0,
        });
        return;
    }

    let mut spans: Vec<InlineSpan> = inline
        .iter()
        .map(|w| InlineSpan {
            start: w.span().start,
            end: w.span().end.min(len),
            cost: w.inline_cost(metrics),
        })
        .collect();
    spans.sort_by_key(|s| s.start);

    let wrapper = LineWrapper {
        chars: &chars,
        metrics,
        max_width,
        spans: &spans,
        token_bounds,
    };

    let mut start = 0;
    while start < len {
        // 1. Whole remainder fits: final segment.
        if wrapper.fits(start..len) {
            out.push(wrapper.segment(line_idx, start, len));
            return;
        }
        // 2. Longest fitting prefix, floored past any widget span that
        //    straddles the segment start.
        let floor = wrapper.search_floor(start);
        let best = wrapper.longest_fit(start, floor);
        let end = if best >= len {
            len
        } else {
            // 3-8. Candidate chain, first applicable wins.
            let chosen = wrapper
                .widget_break(start, best)
                .or_else(|| wrapper.movable_unit(start, best))
                .or_else(|| wrapper.whitespace_break(start, best))
                .or_else(|| wrapper.punctuation_break(start, best))
                .or_else(|| wrapper.token_break(start, best))
                .unwrap_or(best);
            // 9. Never leave half an operator glyph on either side.
            wrapper.ligature_guard(start, chosen)
        };
        // 10. Progress guarantee.
        let end = end.clamp(start + 1, len);
        out.push(wrapper.segment(line_idx, start, end));
        start = end;
    }
}

struct LineWrapper<'a> {
    chars: &'a [char],
    metrics: &'a dyn TextMeasure,
    max_width: f32,
    spans: &'a [InlineSpan],
    token_bounds: &'a [usize],
}

impl LineWrapper<'_> {
    fn segment(&self, line_idx: usize, start: usize, end: usize) -> WrappedLine {
        WrappedLine {
            logical_line: line_idx,
            text: self.chars[start..end].iter().collect(),
            start_col: start,
            end_col: end,
        }
    }

    /// Width of a candidate column range, including the reservations of
    /// inline widgets anchored inside it. A widget anchored at the very end
    /// of the line bills the segment that reaches the line end.
    fn measure_span(&self, range: Range<usize>) -> f32 {
        let text: String = self.chars[range.clone()].iter().collect();
        let mut width = self.metrics.measure(&text);
        let len = self.chars.len();
        for span in self.spans {
            let anchored_inside = span.start >= range.start
                && (span.start < range.end || (span.start == range.end && range.end == len));
            if anchored_inside {
                width += span.cost;
            }
        }
        width
    }

    fn fits(&self, range: Range<usize>) -> bool {
        self.measure_span(range) <= self.max_width + WIDTH_EPSILON
    }

    /// A widget span straddling `start` must be consumed whole before any
    /// further break is considered.
    fn search_floor(&self, start: usize) -> usize {
        let mut floor = start + 1;
        for span in self.spans {
            if span.start <= start && start < span.end {
                floor = floor.max(span.end);
            }
        }
        floor.min(self.chars.len())
    }

    /// Largest end in `[floor, len]` whose range from `start` still fits, or
    /// `floor` itself when even that overflows (minimal indivisible unit).
    fn longest_fit(&self, start: usize, floor: usize) -> usize {
        if !self.fits(start..floor) {
            return floor;
        }
        let (mut lo, mut hi) = (floor, self.chars.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.fits(start..mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Keep reserved widget spans intact when any break placement can. Once
    /// `best` is known to land inside a span, the widget rules alone decide
    /// the break.
    fn widget_break(&self, start: usize, best: usize) -> Option<usize> {
        for span in self.spans {
            if span.start < best && best < span.end {
                if span.start > start && self.fits(span.start..span.end) {
                    // Push the whole widget to the next segment
                    return Some(span.start);
                }
                if self.fits(start..span.end) {
                    // Pull the whole span into this segment
                    return Some(span.end);
                }
                // The span cannot be kept intact regardless
                return Some(best);
            }
        }
        None
    }

    /// A word split by `best` moves whole to the next line when it fits
    /// there; failing that, a call-like `name(...)` unit that closes within
    /// the remainder moves whole.
    fn movable_unit(&self, start: usize, best: usize) -> Option<usize> {
        if let Some((run_start, run_end)) = self.word_run_at(best) {
            if run_start > start && self.fits(run_start..run_end) {
                return Some(run_start);
            }
        }
        self.movable_call(start, best)
    }

    /// Maximal non-whitespace run strictly containing `pos`.
    fn word_run_at(&self, pos: usize) -> Option<(usize, usize)> {
        let len = self.chars.len();
        if pos == 0 || pos >= len {
            return None;
        }
        if self.chars[pos].is_whitespace() || self.chars[pos - 1].is_whitespace() {
            return None;
        }
        let mut run_start = pos;
        while run_start > 0 && !self.chars[run_start - 1].is_whitespace() {
            run_start -= 1;
        }
        let mut run_end = pos;
        while run_end < len && !self.chars[run_end].is_whitespace() {
            run_end += 1;
        }
        Some((run_start, run_end))
    }

    fn movable_call(&self, start: usize, best: usize) -> Option<usize> {
        // Outermost paren opened in this segment but not yet closed at best
        let mut open_stack = Vec::new();
        for i in start..best {
            match self.chars[i] {
                '(' => open_stack.push(i),
                ')' => {
                    open_stack.pop();
                }
                _ => {}
            }
        }
        let open = *open_stack.first()?;
        // The unit starts at the head of the run carrying the callee name
        let mut unit_start = open;
        while unit_start > start && !self.chars[unit_start - 1].is_whitespace() {
            unit_start -= 1;
        }
        if unit_start <= start {
            return None;
        }
        // Must close somewhere in the remainder
        let mut depth = 0usize;
        let mut close = None;
        for (i, &ch) in self.chars.iter().enumerate().skip(open) {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close?;
        if self.fits(unit_start..close + 1) {
            Some(unit_start)
        } else {
            None
        }
    }

    /// Break after the nearest whitespace at or before `best`, so trailing
    /// whitespace stays on the earlier segment and the next one starts at
    /// non-whitespace. Consumption is capped at `best` to keep the emitted
    /// segment within the width limit.
    fn whitespace_break(&self, start: usize, best: usize) -> Option<usize> {
        let mut end = best.min(self.chars.len());
        while end > start {
            if self.chars[end - 1].is_whitespace() {
                return Some(end);
            }
            end -= 1;
        }
        None
    }

    /// Break just after sub-expression punctuation.
    fn punctuation_break(&self, start: usize, best: usize) -> Option<usize> {
        const BREAK_AFTER: &[char] = &[',', ';', ':', ')', ']', '}', '|', '='];
        let mut end = best.min(self.chars.len());
        while end > start {
            if BREAK_AFTER.contains(&self.chars[end - 1]) {
                return Some(end);
            }
            end -= 1;
        }
        None
    }

    /// A token boundary close enough to `best` (within 20% of the width
    /// limit) beats a mid-token hard break.
    fn token_break(&self, start: usize, best: usize) -> Option<usize> {
        let slack = self.max_width * 0.20;
        for &bound in self.token_bounds.iter().rev() {
            if bound >= best {
                continue;
            }
            if bound <= start {
                return None;
            }
            // Largest in-range boundary; anything smaller is only farther
            return (self.measure_span(bound..best) <= slack).then_some(bound);
        }
        None
    }

    /// A break between the two chars of an operator glyph shifts to
    /// whichever side of the pair still fits.
    fn ligature_guard(&self, start: usize, end: usize) -> usize {
        if end == 0 || end >= self.chars.len() {
            return end;
        }
        let pair: String = [self.chars[end - 1], self.chars[end]].iter().collect();
        if !LIGATURES.contains(pair.as_str()) {
            return end;
        }
        let after = end + 1;
        if self.fits(start..after) {
            after
        } else if end - 1 > start {
            end - 1
        } else {
            // Pair is the minimal unit here; emit it oversized
            after
        }
    }
}

/// Composite key identifying one wrap computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    document: u64,
    widgets: u64,
    metrics: u64,
    width_bits: u32,
    wrap_enabled: bool,
}

struct WrapCache {
    key: CacheKey,
    result: Arc<Vec<WrappedLine>>,
}

/// Memoizing front end over [`wrap_lines`].
///
/// A single slot holds the last result; any key change replaces it wholesale
/// (atomic store, never in-place mutation), which is all the invalidation a
/// pure function of its key needs.
pub struct WrapEngine {
    cache: ArcSwapOption<WrapCache>,
}

impl WrapEngine {
    pub fn new() -> Self {
        Self {
            cache: ArcSwapOption::const_empty(),
        }
    }

    /// Wrap the document, reusing the cached result when nothing relevant
    /// changed. Widths below [`MIN_WRAP_WIDTH`] are raised to it.
    pub fn wrap(
        &self,
        doc: &Document,
        tokens: &dyn TokenSource,
        widgets: &[Widget],
        max_width: f32,
        metrics: &dyn TextMeasure,
        wrap_enabled: bool,
    ) -> Arc<Vec<WrappedLine>> {
        let width = if wrap_enabled {
            max_width.max(MIN_WRAP_WIDTH)
        } else {
            0.0
        };
        let key = CacheKey {
            document: doc.fingerprint(),
            widgets: widgets_fingerprint(widgets),
            metrics: metrics.fingerprint(),
            width_bits: width.to_bits(),
            wrap_enabled,
        };
        if let Some(cached) = self.cache.load_full() {
            if cached.key == key {
                tracing::trace!("wrap cache hit");
                return Arc::clone(&cached.result);
            }
        }
        let result = Arc::new(if wrap_enabled {
            let tokens_per_line: Vec<Vec<Token>> = doc
                .lines()
                .iter()
                .map(|line| tokens.tokenize(line))
                .collect();
            wrap_lines(doc, &tokens_per_line, widgets, width, metrics)
        } else {
            unwrapped(doc)
        });
        tracing::debug!(
            lines = doc.line_count(),
            segments = result.len(),
            "wrap cache miss, relayout"
        );
        self.cache.store(Some(Arc::new(WrapCache {
            key,
            result: Arc::clone(&result),
        })));
        result
    }

    /// Drop the cached result (e.g. after an external font change that kept
    /// the same fingerprint by mistake).
    pub fn invalidate(&self) {
        self.cache.store(None);
    }
}

impl Default for WrapEngine {
    fn default() -> Self {
        Self::new()
    }
}
