pub mod client;
pub mod common;
pub mod dhcp;
pub mod error;
pub mod object;

pub use client::{extract_resource_ref, Client, ClientConfig, DEFAULT_WAPI_VERSION};
pub use common::{ApiQueryParams, ExtAttr, ExtAttrs};
pub use error::ApiError;
pub use object::{ClearedFields, ListFilter, ObjectApi, WapiObject};
