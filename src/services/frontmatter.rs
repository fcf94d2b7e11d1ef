//! Frontmatter (de)serialization
//!
//! Posts travel as markdown documents with a YAML frontmatter block for
//! import and export:
//!
//! ```text
//! ---
//! title: "My Post"
//! date: 2024-01-15
//! tags: ["rust", "web"]
//! ---
//!
//! Post content here.
//! ```

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::{CreatePostInput, Post, PostStatus};

/// Errors from frontmatter parsing
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// The document has no frontmatter block
    #[error("Invalid markdown document: frontmatter block not found")]
    MissingBlock,

    /// The frontmatter block is not valid YAML
    #[error("Invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Post metadata carried in a frontmatter block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFrontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n?(.*)\z").expect("frontmatter regex is valid")
    })
}

/// Parse a markdown document into its frontmatter and content
pub fn parse_document(markdown: &str) -> Result<(PostFrontmatter, String), FrontmatterError> {
    let captures = frontmatter_regex()
        .captures(markdown)
        .ok_or(FrontmatterError::MissingBlock)?;

    let frontmatter: PostFrontmatter = serde_yaml::from_str(&captures[1])?;
    let content = captures[2].trim().to_string();

    Ok((frontmatter, content))
}

/// Render a post as a markdown document with a frontmatter block
pub fn render_document(post: &Post) -> Result<String, FrontmatterError> {
    let frontmatter = PostFrontmatter {
        slug: Some(post.slug.clone()),
        title: post.title.clone(),
        date: Some(post.date),
        author: Some(post.author.clone()),
        tags: post.tags.clone(),
        category: post.category.clone(),
        excerpt: post.excerpt.clone(),
        cover_image: post.cover_image.clone(),
        status: Some(post.status),
    };

    let yaml = serde_yaml::to_string(&frontmatter)?;
    Ok(format!("---\n{}---\n\n{}\n", yaml, post.content))
}

impl From<PostFrontmatter> for CreatePostInput {
    fn from(fm: PostFrontmatter) -> Self {
        CreatePostInput {
            slug: fm.slug,
            title: fm.title,
            date: fm.date,
            author: fm.author.unwrap_or_default(),
            tags: fm.tags,
            category: fm.category,
            excerpt: fm.excerpt,
            cover_image: fm.cover_image,
            content: String::new(),
            status: fm.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_document() {
        let doc = "---\ntitle: \"Hello\"\ndate: 2024-01-15\ntags: [\"rust\", \"web\"]\ncategory: Engineering\n---\n\n# Body\n\nText.";
        let (fm, content) = parse_document(doc).unwrap();

        assert_eq!(fm.title, "Hello");
        assert_eq!(fm.date, Some("2024-01-15".parse().unwrap()));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert_eq!(fm.category, "Engineering");
        assert_eq!(content, "# Body\n\nText.");
    }

    #[test]
    fn test_parse_missing_block() {
        let err = parse_document("# Just markdown").unwrap_err();
        assert!(matches!(err, FrontmatterError::MissingBlock));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let doc = "---\ntitle: [unclosed\n---\nbody";
        assert!(matches!(
            parse_document(doc),
            Err(FrontmatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_render_then_parse_roundtrip() {
        let now = Utc::now();
        let post = Post {
            id: 7,
            slug: "hello-world".to_string(),
            title: "Hello, World!".to_string(),
            date: "2024-01-15".parse().unwrap(),
            author: "Alexandre".to_string(),
            tags: vec!["rust".to_string()],
            category: "Engineering".to_string(),
            excerpt: "A greeting".to_string(),
            cover_image: Some("🌍".to_string()),
            content: "# Hi\n\nBody text.".to_string(),
            status: PostStatus::Published,
            created_at: now,
            updated_at: now,
        };

        let doc = render_document(&post).unwrap();
        let (fm, content) = parse_document(&doc).unwrap();

        assert_eq!(fm.slug.as_deref(), Some("hello-world"));
        assert_eq!(fm.title, "Hello, World!");
        assert_eq!(fm.status, Some(PostStatus::Published));
        assert_eq!(content, "# Hi\n\nBody text.");
    }

    #[test]
    fn test_frontmatter_into_create_input() {
        let fm = PostFrontmatter {
            title: "T".to_string(),
            author: Some("A".to_string()),
            ..PostFrontmatter::default()
        };
        let input: CreatePostInput = fm.into();
        assert_eq!(input.title, "T");
        assert_eq!(input.author, "A");
        assert!(input.slug.is_none());
    }
}
