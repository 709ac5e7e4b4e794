//! Cross-page link markup.
//!
//! A link token is a `[` followed by everything up to the next `]` on the same line. Tokens are
//! found leftmost-first and never overlap or nest, so `[A][B]` is two links and `[[A]` is one
//! link to `[A`. The captured text is used verbatim as both the destination title and the
//! label.
//!
//! The renderer runs over text that has already been HTML-escaped by the templates, which is
//! what allows it to inject live `<a>` markup while the rest of the page stays inert.

use regex::{Captures, Regex};
use std::borrow::Cow;

/// Route prefix the default renderer points links at.
pub const DEFAULT_ROUTE_PREFIX: &str = "/view/";

const LINK_PATTERN: &str = r"\[([^\]\n]*)\]";

#[derive(Debug, Clone)]
pub struct LinkRenderer {
    pattern: Regex,
    route_prefix: String,
}

impl LinkRenderer {
    pub fn new(route_prefix: impl Into<String>) -> Self {
        LinkRenderer {
            pattern: Regex::new(LINK_PATTERN).expect("link pattern is a valid regex"),
            route_prefix: route_prefix.into(),
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// Rewrite every `[Title]` token in `text` into `<a href="{prefix}Title">Title</a>`.
    ///
    /// Text without tokens is returned borrowed and unchanged. An empty token `[]` is left as
    /// literal text.
    pub fn render<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, |caps: &Captures| {
            let title = &caps[1];
            if title.is_empty() {
                caps[0].to_string()
            } else {
                format!("<a href=\"{}{title}\">{title}</a>", self.route_prefix)
            }
        })
    }

    /// The non-empty link titles in `text`, in document order.
    pub fn links<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|title| !title.is_empty())
            .collect()
    }
}

impl Default for LinkRenderer {
    fn default() -> Self {
        LinkRenderer::new(DEFAULT_ROUTE_PREFIX)
    }
}
