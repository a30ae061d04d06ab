//! Markdown rendering and outbound link discovery.
use std::collections::HashSet;

use pulldown_cmark::{Options, Parser, html};
use scraper::{Html, Selector};
use url::Url;

/// Render posting markdown to HTML the same way the site displays it.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Absolute `http`/`https` targets of every `<a href>` in `fragment`, first occurrence
/// order, without duplicates.
pub fn extract_links(fragment: &str) -> Vec<Url> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_fragment(fragment);

    let mut seen = HashSet::new();
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| Url::parse(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Links a reader can follow out of a markdown posting.
pub fn outbound_links(markdown: &str) -> Vec<Url> {
    extract_links(&render_markdown(markdown))
}
