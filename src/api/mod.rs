pub mod telegram;
pub mod tori;
pub mod types;

pub use telegram::{Notifier, TelegramNotifier};
pub use tori::{ListingSource, ToriClient};
pub use types::*;
