//! HTML fragments shared by the content kinds and the pathway.

use crate::providers::{BookVolume, VideoSnippet};
use crate::types::{ContentKind, ContentRequest};
use std::fmt::Write;

/// Shown when video search found nothing that passed the relevance filter
pub const NO_RELEVANT_VIDEOS: &str =
    "<p>No sufficiently relevant educational videos found for this topic and stage.</p>";

/// Escape text for inclusion in HTML element content or a quoted attribute
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Outer container every stage-content response is delivered in
pub fn content_wrapper(inner: &str) -> String {
    format!("<div class=\"content-wrapper\">{inner}</div>")
}

/// Fragment stored in place of content when generation fails
pub fn apology(kind: &ContentKind) -> String {
    content_wrapper(&format!(
        "<p>Error generating {} content. Please try again.</p>",
        escape_html(kind.as_str())
    ))
}

/// Placeholder for content kinds without a generator
pub(crate) fn unsupported(kind: &str) -> String {
    format!(
        "<p>Content type {} is not supported yet.</p>",
        escape_html(kind)
    )
}

/// `<h2>` heading naming the topic, level and (optionally) the stage
pub(crate) fn heading(label: &str, request: &ContentRequest, with_stage: bool) -> String {
    let mut heading = format!(
        "<h2>{label} for {} ({} level)",
        escape_html(&request.topic),
        escape_html(&request.grade)
    );
    if with_stage {
        let _ = write!(heading, " - {}", escape_html(&request.stage));
    }
    heading.push_str("</h2>");
    heading
}

/// Model-written introduction paragraph; empty text renders nothing
pub(crate) fn intro(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.trim().is_empty() => format!("<p>{}</p>", text.trim()),
        _ => String::new(),
    }
}

pub(crate) fn video_list(videos: &[VideoSnippet]) -> String {
    if videos.is_empty() {
        return NO_RELEVANT_VIDEOS.to_string();
    }
    let mut html = String::from("<ul>");
    for video in videos {
        // the search API already entity-encodes titles
        let _ = write!(
            html,
            "<li><a href=\"https://www.youtube.com/watch?v={}\" target=\"_blank\">{}</a></li>",
            escape_html(&video.video_id),
            video.title
        );
    }
    html.push_str("</ul>");
    html
}

pub(crate) fn book_list(books: &[BookVolume]) -> String {
    let mut html = String::from("<ul>");
    for book in books {
        let authors = if book.authors.is_empty() {
            "Unknown".to_string()
        } else {
            book.authors.join(", ")
        };
        let _ = write!(
            html,
            "<li><a href=\"{}\" target=\"_blank\">{}</a> by {}</li>",
            escape_html(book.info_link.as_deref().unwrap_or("#")),
            escape_html(&book.title),
            escape_html(&authors)
        );
    }
    html.push_str("</ul>");
    html
}

/// Text that opens every failed-stage block in a pathway
pub const STAGE_ERROR_MARKER: &str = "Error generating stage ";

/// Inline block replacing a pathway stage the model failed to produce
pub(crate) fn stage_error(stage_number: u32) -> String {
    format!(
        "<div class=\"study-pathway\">{STAGE_ERROR_MARKER}{stage_number}. Please try again.</div>"
    )
}
