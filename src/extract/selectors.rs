//! CSS selectors and markup patterns for catalog pages.
//!
//! Everything that depends on the catalog's markup lives here. When
//! extraction starts missing, capture a page sample, update the selectors or
//! patterns, and add the sample as a test fixture.

use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for search results pages.
pub mod search {
    use super::*;

    /// Result card container.
    pub static RESULT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[data-component-type='s-search-result']").unwrap());

    /// Identifier attribute on the result card.
    pub const IDENTIFIER_ATTR: &str = "data-asin";

    /// Primary heading.
    pub static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

    /// Any anchor; the first one under the heading is the heading link.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    /// Label spans inside a link.
    pub static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

    /// "Search link" styled anchor.
    pub static SEARCH_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[class*='s-link']").unwrap());

    /// "Normal text" styled spans.
    pub static NORMAL_TEXT_SPANS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[class*='a-text-normal']").unwrap());

    /// Image candidates, most specific first.
    pub static IMAGES: LazyLock<[Selector; 3]> = LazyLock::new(|| {
        [
            Selector::parse("img[class*='s-image']").unwrap(),
            Selector::parse("img[data-image-latency]").unwrap(),
            Selector::parse("img").unwrap(),
        ]
    });

    /// Image attributes carrying the URL, in priority order.
    pub const IMAGE_ATTRS: [&str; 5] = [
        "src",
        "data-src",
        "data-lazy-src",
        "data-image-src",
        "data-old-src",
    ];
}

/// Image host URL patterns found in raw result markup.
pub mod images {
    use super::*;

    /// Two hosts, three size-suffix variants each.
    pub static RESULT_IMAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r#"https://m\.media-amazon\.com/images/I/[^"\s<>]+\._AC_SL\d+_[^"\s<>]*\.(?:jpg|png)"#,
            r#"https://m\.media-amazon\.com/images/I/[^"\s<>]+\._AC_UL\d+_[^"\s<>]*\.(?:jpg|png)"#,
            r#"https://m\.media-amazon\.com/images/I/[^"\s<>]+\._AC_SY\d+_[^"\s<>]*\.(?:jpg|png)"#,
            r#"https://images-na\.ssl-images-amazon\.com/images/I/[^"\s<>]+\._AC_SL\d+_[^"\s<>]*\.(?:jpg|png)"#,
            r#"https://images-na\.ssl-images-amazon\.com/images/I/[^"\s<>]+\._SL\d+_[^"\s<>]*\.(?:jpg|png)"#,
            r#"https://images-na\.ssl-images-amazon\.com/images/I/[^"\s<>]+\._AC_UL\d+_[^"\s<>]*\.(?:jpg|png)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    /// Main product image patterns on a detail page.
    pub static PRODUCT_IMAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r#"https://images-na\.ssl-images-amazon\.com/images/I/[^"\s]+\._SL\d+_\.jpg"#,
            r#"https://m\.media-amazon\.com/images/I/[^"\s]+\._SL\d+_\.jpg"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    /// Open Graph image meta tag.
    pub static OG_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<meta\s+property="og:image"\s+content="([^"]+)""#).unwrap()
    });
}

/// Patterns for product detail pages.
pub mod product {
    use super::*;

    /// Title patterns, most reliable first.
    pub static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r#"(?is)<span[^>]*id="productTitle"[^>]*>([^<]+)</span>"#,
            r#"(?is)<h1[^>]*id="title"[^>]*>.*?<span[^>]*>([^<]+)</span>"#,
            r#"(?is)<meta\s+property="og:title"\s+content="([^"]+)""#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });
}

/// Patterns for scanning a results page without a DOM.
pub mod fallback {
    use super::*;

    /// Relative detail-page links.
    pub static PRODUCT_LINK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"href="(/dp/[A-Z0-9]{10}|/gp/product/[A-Z0-9]{10})"#).unwrap()
    });

    /// Title patterns near a result's identifier marker, most specific first.
    pub static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r#"(?is)<h2[^>]*>.*?<a[^>]*>.*?<span[^>]*>([^<]+)</span>"#,
            r#"(?is)<a[^>]*class="[^"]*s-link[^"]*"[^>]*>.*?<span[^>]*>([^<]+)</span>"#,
            r#"(?is)<span[^>]*class="[^"]*a-text-normal[^"]*"[^>]*>([^<]+)</span>"#,
            r#"(?is)<span[^>]*>([^<]{10,150})</span>"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    /// Texts the catalog uses as title placeholders.
    pub const PLACEHOLDER_TITLES: [&str; 3] = ["タイトル不明", "title", "商品名"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_compile() {
        LazyLock::force(&search::RESULT);
        LazyLock::force(&search::HEADING);
        LazyLock::force(&search::LINK);
        LazyLock::force(&search::SPAN);
        LazyLock::force(&search::SEARCH_LINK);
        LazyLock::force(&search::NORMAL_TEXT_SPANS);
        LazyLock::force(&search::IMAGES);
    }

    #[test]
    fn test_patterns_compile() {
        assert_eq!(images::RESULT_IMAGE_PATTERNS.len(), 6);
        assert_eq!(images::PRODUCT_IMAGE_PATTERNS.len(), 2);
        assert_eq!(product::TITLE_PATTERNS.len(), 3);
        assert_eq!(fallback::TITLE_PATTERNS.len(), 4);
        assert!(fallback::PRODUCT_LINK.is_match(r#"<a href="/dp/4873115655">"#));
    }

    #[test]
    fn test_fallback_link_pattern_requires_uppercase() {
        assert!(!fallback::PRODUCT_LINK.is_match(r#"<a href="/dp/b00abcdefg">"#));
        assert!(fallback::PRODUCT_LINK.is_match(r#"<a href="/gp/product/B00ABCDEFG">"#));
    }
}
