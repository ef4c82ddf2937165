pub mod option_traits;
pub mod page_traits;

pub use option_traits::OptionStore;
pub use page_traits::FeedPage;
