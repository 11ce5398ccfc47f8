pub mod fetch;
pub mod site;

#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchError, FetchErrorKind, Fetcher};
pub use site::{LocalSite, StaticSite};
