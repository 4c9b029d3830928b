pub mod search_analytics;
pub mod sitemaps;
pub mod sites;
