use scraper::{Html, Selector};
use url::Url;

/// Anchor targets of `html`, resolved against `base`, fragments removed.
/// Malformed documents degrade to however many anchors the parser recovers.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(url) = resolve_href(base, href)
        {
            links.push(url);
        }
    }
    links
}

/// Visible text of the main content elements (paragraphs, headings, list
/// items), joined with single spaces.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p, h1, h2, h3, h4, h5, h6, li").unwrap();

    let blocks: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    blocks.join(" ").trim().to_string()
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    // Skip empty, fragment-only, javascript:, mailto:, tel:
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}
