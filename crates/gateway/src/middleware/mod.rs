//! Request middleware and extractors.

mod api_key;

pub use api_key::RequireApiKey;
