//! Rendering boundary between the block model and a math typesetting engine.
//!
//! The engine itself lives outside this crate (KaTeX in the browser); it is
//! reached through the [`Typesetter`] trait so the expansion and error policy
//! can be exercised without it.

use crate::expand::{self, ExpandConfig};
use crate::model::Block;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inline indicator shown in place of a formula the engine rejected.
pub const ERROR_INDICATOR: &str = r#"<span style="color: #ef4444; font-size: 0.875rem;">Invalid LaTeX</span>"#;

/// Inline indicator shown for a block with no content yet.
pub const UNFILLED_INDICATOR: &str = r#"<span class="math-unfilled">...</span>"#;

/// Options passed through to the typesetting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesetOptions {
    /// Report malformed input inline instead of failing.
    pub throw_on_error: bool,
    pub display_mode: bool,
    /// Allow `\htmlId` / `\htmlClass`, which slot wrappers depend on.
    pub trust: bool,
}

impl Default for TypesetOptions {
    fn default() -> Self {
        Self {
            throw_on_error: false,
            display_mode: true,
            trust: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("typesetting failed: {0}")]
    Engine(String),
    #[error("typesetter unavailable")]
    Unavailable,
}

/// Turns expanded markup into display output (usually HTML).
pub trait Typesetter {
    fn typeset(&self, markup: &str, options: &TypesetOptions) -> Result<String, RenderError>;
}

/// Outcome of rendering one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Engine output.
    Markup(String),
    /// The block has no content; the engine was not called.
    Unfilled,
    /// The engine rejected the markup. Carries the error message.
    Error(String),
}

impl Rendered {
    /// Display HTML for this outcome.
    pub fn to_html(&self) -> &str {
        match self {
            Rendered::Markup(html) => html,
            Rendered::Unfilled => UNFILLED_INDICATOR,
            Rendered::Error(_) => ERROR_INDICATOR,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Rendered::Error(_))
    }
}

/// The markup a block hands to the engine: expanded for templated blocks,
/// verbatim for plain ones.
#[must_use]
pub fn block_markup(block: &Block, config: &ExpandConfig) -> String {
    match &block.slots {
        Some(slots) => expand::expand(&block.content, slots, config),
        None => block.content.clone(),
    }
}

/// Typeset a markup string, mapping failure to [`Rendered::Error`].
pub fn render_markup<T: Typesetter + ?Sized>(
    engine: &T,
    markup: &str,
    options: &TypesetOptions,
) -> Rendered {
    if markup.is_empty() {
        return Rendered::Unfilled;
    }
    match engine.typeset(markup, options) {
        Ok(html) => Rendered::Markup(html),
        Err(err) => {
            log::warn!("{err}");
            Rendered::Error(err.to_string())
        }
    }
}

/// Render one block. Never modifies the block.
pub fn render_block<T: Typesetter + ?Sized>(
    engine: &T,
    block: &Block,
    config: &ExpandConfig,
    options: &TypesetOptions,
) -> Rendered {
    if block.content.is_empty() {
        return Rendered::Unfilled;
    }
    let markup = block_markup(block, config);
    let rendered = render_markup(engine, &markup, options);
    if rendered.is_error() {
        log::warn!("block {} failed to render", block.id);
    }
    rendered
}
