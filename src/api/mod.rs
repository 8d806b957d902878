pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use router::api_router;
