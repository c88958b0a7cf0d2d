pub mod api;

pub use api::{build_http_client, ApiClient, ProtectedRequest, RequestBody};
