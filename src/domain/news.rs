//! TechCrunch page digesting
//!
//! Turns a fetched HTML page into the short text digest returned by the
//! `fetch_from_techcrunch` tool.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::domain::utils::truncate_chars;
use crate::news_client::NewsPage;

pub const CATEGORIES: [&str; 5] = ["ai", "startup", "security", "venture", "latest"];
pub const DEFAULT_CATEGORY: &str = "latest";
pub const MAX_HEADLINES: usize = 5;
pub const MIN_HEADLINE_CHARS: usize = 10;
pub const MAX_DIGEST_CHARS: usize = 2_000;
pub const MAX_FALLBACK_CHARS: usize = 1_000;

static ARTICLE_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, div").expect("valid container selector"));
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").expect("valid heading selector"));

const HIDDEN_TEXT_PARENTS: [&str; 3] = ["script", "style", "noscript"];

/// Returns the category to fetch, or `None` when the requested one is unsupported.
pub fn normalize_category(category: &str) -> Option<&'static str> {
    let normalized = category.trim().to_ascii_lowercase();
    CATEGORIES
        .iter()
        .copied()
        .find(|candidate| *candidate == normalized)
}

/// Titles of the first few article containers on the page.
///
/// Only the first [`MAX_HEADLINES`] containers are inspected; a container
/// whose title heading is missing or too short contributes nothing.
pub fn extract_headlines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ARTICLE_CONTAINER)
        .filter(|element| has_class_containing(element, &["post", "article"]))
        .take(MAX_HEADLINES)
        .filter_map(|container| {
            container
                .select(&HEADING)
                .find(|heading| has_class_containing(heading, &["title"]))
        })
        .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
        .filter(|title| title.chars().count() > MIN_HEADLINE_CHARS)
        .collect()
}

pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let fragments = document
        .root_element()
        .descendants()
        .filter(|node| {
            !node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|element| element.name()))
                .is_some_and(|name| HIDDEN_TEXT_PARENTS.contains(&name))
        })
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect::<Vec<_>>();

    collapse_whitespace(&fragments.join(" "))
}

pub fn summarize_page(category: &str, page: &NewsPage) -> String {
    if !page.is_success() {
        return format!(
            "Failed to fetch news from TechCrunch. HTTP Status: {}",
            page.status
        );
    }

    let headlines = extract_headlines(&page.body);
    if headlines.is_empty() {
        let text = page_text(&page.body);
        return format!(
            "TechCrunch {category} news content:\n{}",
            truncate_chars(&text, MAX_FALLBACK_CHARS)
        );
    }

    let listing = headlines
        .iter()
        .map(|title| format!("• {title}"))
        .collect::<Vec<_>>()
        .join("\n");
    let digest = format!("Latest TechCrunch {category} news:\n\n{listing}");
    truncate_chars(&digest, MAX_DIGEST_CHARS)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_class_containing(element: &ElementRef<'_>, needles: &[&str]) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_ascii_lowercase();
        needles.iter().any(|needle| class.contains(needle))
    })
}
