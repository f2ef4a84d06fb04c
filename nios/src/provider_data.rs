//! State handed from provider configure to every resource and data source

use crate::api::Client;
use std::sync::Arc;

/// One WAPI client per configured provider
///
/// Every resource and data source instance the provider's factories create
/// clones this and shares the same client, along with its connection pool
/// and grid credentials.
#[derive(Clone)]
pub struct NiosProviderData {
    pub client: Arc<Client>,
}

impl NiosProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
