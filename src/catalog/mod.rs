pub mod query;
pub mod stac;

pub use query::SearchQuery;
pub use stac::StacClient;
