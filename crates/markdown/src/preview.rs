use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Number of characters kept in a preview before it is cut with an ellipsis.
pub const PREVIEW_LENGTH: usize = 50;

/// Preview text plus the image URLs and link fragments found in markdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewContent {
    pub preview: String,
    pub images: Vec<String>,
    pub links: Vec<String>,
}

/// Raw long-text cell value as stored in a row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LongText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl LongText {
    /// Build the stored cell for a markdown text.
    pub fn from_markdown(text: &str) -> Self {
        let PreviewContent {
            preview,
            images,
            links,
        } = extract_preview(text);
        Self {
            text: text.to_string(),
            preview,
            images,
            links,
        }
    }
}

fn href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[.+\]\(\S+\)|<img src=(\S+).+/>|!\[\]\(\S+\)|<\S+>").expect("valid regex")
    })
}

fn image_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^<img src="(\S+)" .+/>"#).expect("valid regex"))
}

fn image_md_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!\[\]\((\S+)\)").expect("valid regex"))
}

fn link_md_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[.+\]\(\S+\)").expect("valid regex"))
}

fn link_angle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<\S+>$").expect("valid regex"))
}

/// Extract a plain-text preview and the image/link fragments of markdown text.
///
/// The preview drops every link and image fragment, skips `#` heading
/// markers and turns newlines into spaces. It is cut after
/// [`PREVIEW_LENGTH`] characters; whenever the preview differs in length
/// from the stripped text an ellipsis is appended.
///
/// # Example
/// ```
/// use dtable_markdown::extract_preview;
///
/// let content = extract_preview("# Title\n![](http://x/img.png) see [docs](http://x/docs)");
/// assert_eq!(content.images, vec!["http://x/img.png"]);
/// assert_eq!(content.links, vec!["[docs](http://x/docs)"]);
/// ```
pub fn extract_preview(markdown: &str) -> PreviewContent {
    let stripped = href_re().replace_all(markdown, "");
    let stripped_len = stripped.chars().count();

    let mut preview = String::new();
    let mut copied = 0;
    for c in stripped.chars() {
        match c {
            '#' => continue,
            '\n' => preview.push(' '),
            _ => preview.push(c),
        }
        copied += 1;
        if copied == PREVIEW_LENGTH {
            break;
        }
    }
    if copied != stripped_len {
        preview.push_str("...");
    }

    let mut images = Vec::new();
    let mut links = Vec::new();
    for found in href_re().find_iter(markdown) {
        let href = found.as_str();
        if link_md_re().is_match(href) || link_angle_re().is_match(href) {
            links.push(href.to_string());
        } else if let Some(caps) = image_tag_re()
            .captures(href)
            .or_else(|| image_md_re().captures(href))
        {
            images.push(caps[1].to_string());
        }
    }

    PreviewContent {
        preview,
        images,
        links,
    }
}
