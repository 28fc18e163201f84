pub mod api;
pub mod markdown;
pub mod richtext;

pub use api::ApiClient;
