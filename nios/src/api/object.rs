//! Generic CRUD and list operations over WAPI object types

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tfplug::context::Context;

use super::client::Client;
use super::common::{ApiQueryParams, ExtAttrs, WapiPage, WapiResult};
use super::error::ApiError;

/// Maximum objects requested per page when listing
pub const PAGE_SIZE: u32 = 1000;

/// Fields an update resets, keyed by wire name, with the value that unsets them
pub type ClearedFields = serde_json::Map<String, serde_json::Value>;

/// PUT body: the object's set fields plus explicit resets
#[derive(Serialize)]
struct UpdateBody<'a, T> {
    #[serde(flatten)]
    object: &'a T,
    #[serde(flatten)]
    cleared: &'a ClearedFields,
}

/// A WAPI object type as it travels on the wire
pub trait WapiObject: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Object type name in WAPI paths, e.g. `fixedaddress`
    const OBJECT_TYPE: &'static str;

    /// Non-default fields requested back on every call
    const RETURN_FIELDS: &'static str;

    /// Whether the server supports extensible attributes on this type
    const EXT_ATTRS: bool = true;

    /// Server-assigned `_ref`, absent on objects not yet created
    fn reference(&self) -> Option<&str>;

    fn ext_attrs(&self) -> Option<&ExtAttrs> {
        None
    }

    fn set_ext_attrs(&mut self, _ext_attrs: Option<ExtAttrs>) {}
}

/// Search criteria for list calls
///
/// Fields match exactly (`name=office`), extensible attributes are prefixed
/// with `*` (`*Site=DC1`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub fields: Vec<(String, String)>,
    pub ext_attrs: Vec<(String, String)>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn ext_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.ext_attrs.push((name.into(), value.into()));
        self
    }

    fn to_query_params(&self) -> ApiQueryParams {
        let params = self
            .fields
            .iter()
            .fold(ApiQueryParams::new(), |params, (k, v)| params.add(k.as_str(), v));
        self.ext_attrs
            .iter()
            .fold(params, |params, (k, v)| params.add(format!("*{}", k), v))
    }
}

/// Operations the reconciler needs from a WAPI backend
#[async_trait]
pub trait ObjectApi<T: WapiObject>: Send + Sync {
    async fn create_object(&self, ctx: &Context, object: &T) -> Result<T, ApiError>;

    async fn read_object(&self, ctx: &Context, reference: &str) -> Result<T, ApiError>;

    /// Writes the set fields of `object` and resets every field in `cleared`
    async fn update_object(
        &self,
        ctx: &Context,
        reference: &str,
        object: &T,
        cleared: &ClearedFields,
    ) -> Result<T, ApiError>;

    /// Replaces only the extensible attributes of an object
    async fn update_ext_attrs(
        &self,
        ctx: &Context,
        reference: &str,
        ext_attrs: &ExtAttrs,
    ) -> Result<T, ApiError>;

    async fn delete_object(&self, ctx: &Context, reference: &str) -> Result<(), ApiError>;

    /// Returns every match, following pagination
    async fn list_objects(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<T>, ApiError>;
}

#[async_trait]
impl<T: WapiObject> ObjectApi<T> for Client {
    async fn create_object(&self, ctx: &Context, object: &T) -> Result<T, ApiError> {
        let params = ApiQueryParams::new().return_fields(T::RETURN_FIELDS);
        let response: WapiResult<T> = self.post(ctx, T::OBJECT_TYPE, &params, object).await?;
        Ok(response.result)
    }

    async fn read_object(&self, ctx: &Context, reference: &str) -> Result<T, ApiError> {
        let params = ApiQueryParams::new().return_fields(T::RETURN_FIELDS);
        let response: WapiResult<T> = self.get(ctx, reference, &params).await?;
        Ok(response.result)
    }

    async fn update_object(
        &self,
        ctx: &Context,
        reference: &str,
        object: &T,
        cleared: &ClearedFields,
    ) -> Result<T, ApiError> {
        let params = ApiQueryParams::new().return_fields(T::RETURN_FIELDS);
        let body = UpdateBody { object, cleared };
        let response: WapiResult<T> = self.put(ctx, reference, &params, &body).await?;
        Ok(response.result)
    }

    async fn update_ext_attrs(
        &self,
        ctx: &Context,
        reference: &str,
        ext_attrs: &ExtAttrs,
    ) -> Result<T, ApiError> {
        let params = ApiQueryParams::new().return_fields(T::RETURN_FIELDS);
        let body = serde_json::json!({ "extattrs": ext_attrs });
        let response: WapiResult<T> = self.put(ctx, reference, &params, &body).await?;
        Ok(response.result)
    }

    async fn delete_object(&self, ctx: &Context, reference: &str) -> Result<(), ApiError> {
        self.delete(ctx, reference).await
    }

    async fn list_objects(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<T>, ApiError> {
        let mut objects = Vec::new();
        let mut params = filter
            .to_query_params()
            .add("_paging", 1)
            .add("_max_results", PAGE_SIZE)
            .return_fields(T::RETURN_FIELDS);

        loop {
            let page: WapiPage<T> = self.get(ctx, T::OBJECT_TYPE, &params).await?;
            objects.extend(page.result);

            match page.next_page_id {
                Some(page_id) if !page_id.is_empty() => {
                    tracing::debug!("Fetching next {} page", T::OBJECT_TYPE);
                    params = ApiQueryParams::new()
                        .add("_page_id", page_id)
                        .add("_return_as_object", 1);
                }
                _ => break,
            }
        }

        Ok(objects)
    }
}
