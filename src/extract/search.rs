//! Structured extraction of search result cards.

use scraper::{ElementRef, Html};

use crate::extract::selectors::{images, search};
use crate::extract::text::{char_len, collapse_whitespace, join_fragments};
use crate::models::{Candidate, CandidateBuilder};
use crate::sources::CatalogSource;

/// A title shorter than this is not a title
const MIN_TITLE_CHARS: usize = 3;

/// Normal-text spans considered by the last title strategy
const NORMAL_TEXT_SPAN_LIMIT: usize = 3;

/// One result card as found on the page, before any backfilling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub identifier: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

type Strategy = fn(&ElementRef<'_>) -> Option<String>;

/// Title strategies, in the order they are tried
const TITLE_STRATEGIES: &[(&str, Strategy)] = &[
    ("heading link spans", title_from_heading_link),
    ("heading text", title_from_heading),
    ("search link spans", title_from_search_link),
    ("normal text spans", title_from_normal_text),
];

/// Thumbnail strategies that work on the card alone
const THUMBNAIL_STRATEGIES: &[(&str, Strategy)] = &[
    ("image element", thumbnail_from_image),
    ("markup scan", thumbnail_from_markup),
];

/// Parse every result card that carries an identifier and a title
///
/// Cards are returned in page order. A missing thumbnail is left as `None`
/// for the caller to backfill.
pub fn parse_search_results(html: &str) -> Vec<RawEntry> {
    let document = Html::parse_document(html);

    let entries: Vec<RawEntry> = document
        .select(&search::RESULT)
        .filter_map(|card| parse_card(&card))
        .collect();

    tracing::debug!("Parsed {} result cards with a title", entries.len());
    entries
}

fn parse_card(card: &ElementRef<'_>) -> Option<RawEntry> {
    let identifier = card
        .value()
        .attr(search::IDENTIFIER_ATTR)
        .map(str::trim)
        .filter(|id| !id.is_empty())?
        .to_string();

    let Some(title) = first_match(card, TITLE_STRATEGIES, |t| char_len(t) >= MIN_TITLE_CHARS)
    else {
        tracing::debug!("No usable title in result card {}", identifier);
        return None;
    };

    let thumbnail_url = first_match(card, THUMBNAIL_STRATEGIES, |url| !url.is_empty());

    Some(RawEntry {
        identifier,
        title,
        thumbnail_url,
    })
}

fn first_match(
    card: &ElementRef<'_>,
    strategies: &[(&str, Strategy)],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    strategies.iter().find_map(|(name, strategy)| {
        let value = strategy(card).filter(|v| accept(v.as_str()));
        if value.is_none() {
            tracing::trace!("Strategy '{}' found nothing", name);
        }
        value
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn join_texts<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    let texts: Vec<String> = elements.map(element_text).collect();
    join_fragments(texts.iter().map(String::as_str))
}

fn title_from_heading_link(card: &ElementRef<'_>) -> Option<String> {
    let heading = card.select(&search::HEADING).next()?;
    let link = heading.select(&search::LINK).next()?;
    join_texts(link.select(&search::SPAN))
}

fn title_from_heading(card: &ElementRef<'_>) -> Option<String> {
    card.select(&search::HEADING)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn title_from_search_link(card: &ElementRef<'_>) -> Option<String> {
    let link = card.select(&search::SEARCH_LINK).next()?;
    join_texts(link.select(&search::SPAN))
}

fn title_from_normal_text(card: &ElementRef<'_>) -> Option<String> {
    join_texts(
        card.select(&search::NORMAL_TEXT_SPANS)
            .take(NORMAL_TEXT_SPAN_LIMIT)
            .filter(|span| char_len(&element_text(*span)) > 3),
    )
}

fn thumbnail_from_image(card: &ElementRef<'_>) -> Option<String> {
    let image = search::IMAGES
        .iter()
        .find_map(|selector| card.select(selector).next())?;

    search::IMAGE_ATTRS
        .iter()
        .filter_map(|attr| image.value().attr(attr))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

fn thumbnail_from_markup(card: &ElementRef<'_>) -> Option<String> {
    let markup = card.html();
    images::RESULT_IMAGE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(&markup).map(|m| m.as_str().to_string()))
}

/// Turn a results page into candidates, backfilling thumbnails from product pages
///
/// Stops once `limit` candidates with a thumbnail are collected. Cards whose
/// thumbnail cannot be found anywhere are left out.
pub async fn collect_candidates(
    source: &dyn CatalogSource,
    html: &str,
    limit: usize,
) -> Vec<Candidate> {
    let entries = parse_search_results(html);
    tracing::info!("Found {} result cards", entries.len());

    let mut candidates = Vec::new();
    for entry in entries {
        if candidates.len() >= limit {
            break;
        }

        let link = source.product_url(&entry.identifier);
        let thumbnail_url = match entry.thumbnail_url {
            Some(url) => Some(url),
            None => {
                tracing::debug!("No thumbnail in card {}, trying product page", entry.identifier);
                source.product_page(&link).await.thumbnail_url
            }
        };

        let Some(thumbnail_url) = thumbnail_url else {
            tracing::warn!("No thumbnail found for {}", link);
            continue;
        };

        candidates.push(
            CandidateBuilder::new(entry.identifier, link, entry.title)
                .thumbnail_url(thumbnail_url)
                .build(),
        );
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductPage;
    use crate::sources::MockSource;

    fn card(id: &str, inner: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result" data-asin="{}" class="s-result-item">{}</div>"#,
            id, inner
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><div class=\"s-main-slot\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    fn image(id: &str) -> String {
        format!(
            r#"<img class="s-image" src="https://m.media-amazon.com/images/I/{}._AC_UY218_.jpg">"#,
            id
        )
    }

    #[test]
    fn test_title_from_heading_link_spans() {
        let html = page(&[card(
            "4873115655",
            &format!(
                r#"<h2><a href="/dp/4873115655"><span>リーダブルコード</span> <span>より良いコードを書くためのシンプルで実践的なテクニック</span></a></h2>{}"#,
                image("51MgH8Jmr3L")
            ),
        )]);

        let entries = parse_search_results(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "4873115655");
        assert_eq!(
            entries[0].title,
            "リーダブルコード より良いコードを書くためのシンプルで実践的なテクニック"
        );
        assert_eq!(
            entries[0].thumbnail_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/51MgH8Jmr3L._AC_UY218_.jpg")
        );
    }

    #[test]
    fn test_title_reads_first_heading_link_only() {
        let html = page(&[card(
            "B000000011",
            &format!(
                r#"<h2 class="a-size-mini"><a href="/stores/brand"><span>Brand Name</span></a><a href="/dp/B000000011"><span>Same Heading Link</span></a></h2>
                   <h2><a href="/dp/B000000011"><span>Real Title</span></a></h2>{}"#,
                image("h")
            ),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "Brand Name");
    }

    #[test]
    fn test_short_heading_link_falls_through_to_heading_text() {
        let html = page(&[card(
            "B000000012",
            &format!(
                r#"<h2><a href="/dp/B000000012"><span>ab</span></a> Continued Heading</h2>{}"#,
                image("i")
            ),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "ab Continued Heading");
    }

    #[test]
    fn test_title_from_heading_text() {
        let html = page(&[card(
            "B000000001",
            &format!("<h2>\n  Plain   Heading Title \n</h2>{}", image("a")),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "Plain Heading Title");
    }

    #[test]
    fn test_title_from_search_link() {
        let html = page(&[card(
            "B000000002",
            &format!(
                r#"<a class="a-link-normal s-link-style" href="/dp/B000000002"><span>Linked Title</span></a>{}"#,
                image("b")
            ),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "Linked Title");
    }

    #[test]
    fn test_title_reads_first_search_link_only() {
        let html = page(&[card(
            "B000000013",
            &format!(
                r#"<a class="a-link-normal s-link-style" href="/dp/B000000013"><span>Linked Title</span></a>
                   <a class="a-link-normal s-underline-text s-link-style" href="/dp/B000000013#reviews"><span>5つ星のうち4.5</span> <span>1,234</span></a>
                   <a class="a-link-normal s-link-style a-text-normal" href="/dp/B000000013"><span class="a-price">￥2,640</span></a>{}"#,
                image("j")
            ),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "Linked Title");
    }

    #[test]
    fn test_title_from_normal_text_spans() {
        let html = page(&[card(
            "B000000003",
            &format!(
                r#"<span class="a-size-base a-text-normal">abc</span><span class="a-size-medium a-text-normal">Normal Text Title</span>{}"#,
                image("c")
            ),
        )]);
        assert_eq!(parse_search_results(&html)[0].title, "Normal Text Title");
    }

    #[test]
    fn test_card_without_identifier_or_title_is_skipped() {
        let html = page(&[
            card("", &format!("<h2>Has title but no id</h2>{}", image("d"))),
            card("B000000004", &image("e")),
            card("B000000005", &format!("<h2>ok</h2>{}", image("f"))),
        ]);
        assert!(parse_search_results(&html).is_empty());
    }

    #[test]
    fn test_long_heading_is_truncated_by_candidate() {
        let long = "長".repeat(300);
        let html = page(&[card("B000000006", &format!("<h2>{}</h2>{}", long, image("g")))]);
        let entry = &parse_search_results(&html)[0];
        let candidate = CandidateBuilder::new(&entry.identifier, "link", &entry.title).build();
        assert_eq!(candidate.title.chars().count(), crate::models::MAX_TITLE_CHARS);
    }

    #[test]
    fn test_lazy_image_attributes() {
        let html = page(&[card(
            "B000000007",
            r#"<h2>Lazy Image Book</h2><img data-image-latency="s-product-image" data-src="https://m.media-amazon.com/images/I/lazy._AC_UL320_.jpg">"#,
        )]);
        assert_eq!(
            parse_search_results(&html)[0].thumbnail_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/lazy._AC_UL320_.jpg")
        );
    }

    #[test]
    fn test_thumbnail_from_markup_scan() {
        let html = page(&[card(
            "B000000008",
            r#"<h2>Scanned Image Book</h2><div data-srcset="https://images-na.ssl-images-amazon.com/images/I/41scan._SL160_.jpg 1x"></div>"#,
        )]);
        assert_eq!(
            parse_search_results(&html)[0].thumbnail_url.as_deref(),
            Some("https://images-na.ssl-images-amazon.com/images/I/41scan._SL160_.jpg")
        );
    }

    #[test]
    fn test_zero_cards() {
        assert!(parse_search_results("<html><body>No results</body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_collect_backfills_from_product_page() {
        let source = MockSource::new();
        source.set_product_page(
            &source.product_url("B000000009"),
            ProductPage {
                title: "Backfilled".to_string(),
                thumbnail_url: Some("https://m.media-amazon.com/images/I/backfill.jpg".to_string()),
            },
        );

        let html = page(&[
            card("B000000009", "<h2>Needs Backfill</h2>"),
            card("B000000010", "<h2>No Image Anywhere</h2>"),
        ]);

        let candidates = collect_candidates(&source, &html, 10).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "B000000009");
        assert_eq!(candidates[0].title, "Needs Backfill");
        assert_eq!(
            candidates[0].thumbnail_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/backfill.jpg")
        );
        assert_eq!(source.product_page_calls(), 2);
    }

    #[tokio::test]
    async fn test_collect_stops_at_limit() {
        let source = MockSource::new();
        let cards: Vec<String> = (0..5)
            .map(|i| {
                let id = format!("B00000002{}", i);
                card(&id, &format!("<h2>Book number {}</h2>{}", i, image(&id)))
            })
            .collect();

        let candidates = collect_candidates(&source, &page(&cards), 3).await;
        let ids: Vec<&str> = candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["B000000020", "B000000021", "B000000022"]);
        assert_eq!(source.product_page_calls(), 0);
        assert_eq!(candidates[0].link, source.product_url("B000000020"));
    }
}
