use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const PRICE_NOT_AVAILABLE: &str = "Price not available";
pub const NO_IMAGE_AVAILABLE: &str = "No image available";

/// One classified ad scraped from a listing page. The url is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    title: String,
    price: String,
    posted_at: NaiveDateTime,
    url: String,
    image_url: String,
}

impl ListingItem {
    /// Absent price or image fall back to the display sentinels.
    pub fn new(
        title: impl Into<String>,
        price: Option<String>,
        posted_at: NaiveDateTime,
        url: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string()),
            posted_at,
            url: url.into(),
            image_url: image_url.unwrap_or_else(|| NO_IMAGE_AVAILABLE.to_string()),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn posted_at(&self) -> NaiveDateTime {
        self.posted_at
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse {
    #[serde(default)]
    pub description: Option<String>,
}
