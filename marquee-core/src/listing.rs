use marquee_model::RawFragment;
use scraper::{ElementRef, Html, Selector};

use crate::error::{CatalogError, Result};

const MOVIE_SELECTOR: &str = "div.movie";
const TITLE_SELECTOR: &str = "span.resultTitle";
const TITLE_LINK_SELECTOR: &str = "a";
const INFO_SELECTOR: &str = "span.resultInfo";

/// Pull up to `limit` listing fragments out of a showtimes page, in
/// document order.
///
/// Each `div.movie` yields one fragment. The title comes from the link
/// inside `span.resultTitle` (or the span's own text when there is no
/// link) and the info from `span.resultInfo`; either may be absent.
pub fn extract_fragments(html: &str, limit: usize) -> Result<Vec<RawFragment>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let document = Html::parse_document(html);
    let movie_selector = selector(MOVIE_SELECTOR)?;
    let title_selector = selector(TITLE_SELECTOR)?;
    let link_selector = selector(TITLE_LINK_SELECTOR)?;
    let info_selector = selector(INFO_SELECTOR)?;

    let fragments = document
        .select(&movie_selector)
        .take(limit)
        .map(|movie| {
            let title = movie
                .select(&title_selector)
                .next()
                .map(|span| {
                    span.select(&link_selector)
                        .next()
                        .map(element_text)
                        .unwrap_or_else(|| element_text(span))
                })
                .filter(|text| !text.is_empty());

            let info = movie
                .select(&info_selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty());

            RawFragment { title, info }
        })
        .collect();

    Ok(fragments)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CatalogError::Html(e.to_string()))
}

/// Text content with whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
