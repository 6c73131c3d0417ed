// HTTP routes
pub mod health;
pub mod proxies;
pub mod scrape;
pub mod workflows;

pub use health::*;
pub use proxies::*;
pub use scrape::*;
pub use workflows::*;
