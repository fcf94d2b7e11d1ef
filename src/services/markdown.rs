//! Markdown rendering service
//!
//! Markdown to HTML conversion for post content using pulldown-cmark.
//! Rendering happens at read time so stored posts stay plain markdown.

use pulldown_cmark::{html, Options, Parser};

/// A thread-safe Markdown renderer.
///
/// Supports the common extensions readers expect from blog content:
/// tables, strikethrough, task lists and smart punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Creates a new MarkdownRenderer
    pub fn new() -> Self {
        Self
    }

    /// Render markdown content to HTML
    pub fn render(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let parser = Parser::new_ext(content, options);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        html_output
    }
}
