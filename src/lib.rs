//! wrapview - line-wrap layout engine for canvas code editors
//!
//! Turns a logical document (lines + tokens + anchored widgets) into visual
//! line segments against a pixel width budget, stacks widget heights into a
//! per-line offset table, and maps positions both ways between document and
//! visual space. Rendering, tokenizing, undo, and input decoding stay with
//! the host; this crate is the pure layout core they all share.

pub mod config;
pub mod coordinates; // Coordinate system abstraction
pub mod document;
pub mod layout;
pub mod metrics;
pub mod selection;
pub mod syntax;
pub mod widget;
pub mod wrap;

// Re-export core types
pub use config::EditorConfig;
pub use coordinates::{
    caret_horizontal, caret_line_end, caret_line_start, caret_pixel, caret_vertical, hit_test,
    logical_to_visual, visual_to_logical, CaretPosition, DocPos, HorizontalMove, LayoutPos,
    VerticalMove, Viewport, VisualPos,
};
pub use document::Document;
pub use layout::{layout, InlineAnchor, WidgetAdjustment, WidgetLayout};
pub use metrics::{FontMetrics, MonospaceMetrics, TextMeasure};
pub use selection::{selection_spans, Selection, SelectionSpan};
pub use syntax::{PlainTokens, Token, TokenKind, TokenSource};
pub use widget::{Placement, Widget};
pub use wrap::{line_segments, unwrapped, wrap_lines, WrapEngine, WrappedLine, MIN_WRAP_WIDTH};
