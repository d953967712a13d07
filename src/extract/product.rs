//! Product detail page parsing.

use crate::extract::selectors::{images, product};
use crate::extract::text::{char_len, clean_title};
use crate::models::{ProductPage, UNKNOWN_TITLE};

/// Titles of this many characters or fewer are treated as noise
const MIN_TITLE_CHARS: usize = 3;

/// Parse a product page into its title and cover image
pub fn parse_product_page(html: &str) -> ProductPage {
    ProductPage {
        title: extract_title(html).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        thumbnail_url: extract_thumbnail(html),
    }
}

/// Product title: dedicated title element, then the heading span, then `og:title`
pub fn extract_title(html: &str) -> Option<String> {
    product::TITLE_PATTERNS.iter().find_map(|pattern| {
        let raw = pattern.captures(html)?.get(1)?.as_str();
        let title = clean_title(raw);
        (char_len(&title) > MIN_TITLE_CHARS).then_some(title)
    })
}

/// Cover image: `og:image` first, then the main image host patterns
pub fn extract_thumbnail(html: &str) -> Option<String> {
    if let Some(url) = images::OG_IMAGE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    {
        return Some(url);
    }

    images::PRODUCT_IMAGE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(html).map(|m| m.as_str().to_string()))
}
