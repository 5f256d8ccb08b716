pub mod extractor;
pub mod new_listings;
pub mod time_parser;

pub use extractor::{ListingExtractor, ListingPage};
pub use new_listings::{CycleReport, NewListingDetector};
pub use time_parser::{parse_posted_at, TimeParseError};
