use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::time_parser::parse_posted_at;
use crate::api::ListingItem;

const ROW: &str = "a.item_row_flex";
const TITLE: &str = "div.li-title";
const PRICE: &str = "p.list_price";
const POSTED_AT: &str = "div.date_image";
const IMAGE: &str = "img.item_image";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {selector:?}: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

/// A parsed search results page.
pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }
}

pub struct ListingExtractor {
    row: Selector,
    title: Selector,
    price: Selector,
    posted_at: Selector,
    image: Selector,
}

impl ListingExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            row: selector(ROW)?,
            title: selector(TITLE)?,
            price: selector(PRICE)?,
            posted_at: selector(POSTED_AT)?,
            image: selector(IMAGE)?,
        })
    }

    /// Listing rows of `page` in document order.
    ///
    /// Rows without an href, a title or a parseable posting time are
    /// skipped. The sequence is lazy and borrows the page, so newer listings
    /// need a fresh fetch.
    pub fn items<'a>(
        &'a self,
        page: &'a ListingPage,
        now: NaiveDateTime,
    ) -> impl Iterator<Item = ListingItem> + 'a {
        page.document
            .select(&self.row)
            .filter_map(move |row| self.extract_row(row, now))
    }

    fn extract_row(&self, row: ElementRef<'_>, now: NaiveDateTime) -> Option<ListingItem> {
        let href = row.value().attr("href").map(str::trim);
        let Some(url) = href.filter(|h| !h.is_empty()) else {
            tracing::debug!("Skipping listing row without href");
            return None;
        };

        let Some(title) = self.first_text(row, &self.title) else {
            tracing::debug!("Skipping {}: no title", url);
            return None;
        };
        let Some(posted_text) = self.first_text(row, &self.posted_at) else {
            tracing::debug!("Skipping {}: no posting time", url);
            return None;
        };

        let posted_at = match parse_posted_at(&posted_text, now) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("Skipping {}: unrecognized date {:?}: {}", url, posted_text, e);
                return None;
            }
        };

        let price = self.first_text(row, &self.price);
        let image_url = row
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        Some(ListingItem::new(title, price, posted_at, url, image_url))
    }

    fn first_text(&self, row: ElementRef<'_>, selector: &Selector) -> Option<String> {
        row.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}
