//! Terraform data sources for NIOS objects
//!
//! Every searchable object type is served by [`NiosDataSource`], which lists
//! matching objects and flattens them with the type's [`NiosModel`].

use crate::api::object::ListFilter;
use crate::api::{ApiError, ObjectApi};
use crate::extattrs::from_wire;
use crate::provider_data::NiosProviderData;
use crate::resources::convert::{string_map, ObjectReader, ObjectWriter};
use crate::resources::{ext_attrs_attributes, ref_attribute, NiosModel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Attributes of each element of `result`
fn result_attributes<T: NiosModel>() -> Vec<Attribute> {
    let mut attributes = vec![ref_attribute()];
    attributes.extend(T::attributes());
    if T::EXT_ATTRS {
        attributes.extend(
            ext_attrs_attributes()
                .into_iter()
                .filter(|a| a.name == "extattrs"),
        );
    }
    attributes
}

pub fn data_source_schema<T: NiosModel>() -> Schema {
    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(&format!("Lists {} objects", T::OBJECT_TYPE))
        .attribute(
            AttributeBuilder::new("filters", AttributeType::map_of(AttributeType::String))
                .description("Field values the objects must match")
                .optional()
                .build(),
        );
    if T::EXT_ATTRS {
        builder = builder.attribute(
            AttributeBuilder::new("extattrfilters", AttributeType::map_of(AttributeType::String))
                .description("Extensible attribute values the objects must match")
                .optional()
                .build(),
        );
    }
    builder
        .attribute(
            AttributeBuilder::new(
                "result",
                AttributeType::list_of(AttributeType::object_of(&result_attributes::<T>())),
            )
            .description("The matching objects")
            .computed()
            .build(),
        )
        .build()
}

/// Search criteria from data source configuration, sorted by name
fn list_filter<T: NiosModel>(config: &ObjectReader<'_>) -> Result<ListFilter, Diagnostic> {
    let mut fields: Vec<_> = config.string_map("filters")?.unwrap_or_default().into_iter().collect();
    fields.sort();

    let mut ext_attrs: Vec<_> = if T::EXT_ATTRS {
        config
            .string_map("extattrfilters")?
            .unwrap_or_default()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };
    ext_attrs.sort();

    let filter = fields
        .into_iter()
        .fold(ListFilter::new(), |filter, (k, v)| filter.field(k, v));
    Ok(ext_attrs
        .into_iter()
        .fold(filter, |filter, (k, v)| filter.ext_attr(k, v)))
}

fn flatten_result<T: NiosModel>(object: &T) -> Result<Dynamic, Diagnostic> {
    let mut out = ObjectWriter::new();
    out.set("ref", object.reference().map(str::to_string));
    object.flatten(&mut out);
    if T::EXT_ATTRS {
        let ext_attrs = match object.ext_attrs() {
            Some(returned) => from_wire(returned).map_err(|e| {
                Diagnostic::error(
                    format!("Failed to read {} extensible attributes", T::OBJECT_TYPE),
                    e.to_string(),
                )
            })?,
            None => HashMap::new(),
        };
        out.set("extattrs", string_map(&ext_attrs));
    }
    Ok(out.finish())
}

/// Terraform data source listing objects of one type
pub struct NiosDataSource<T> {
    provider_data: Option<NiosProviderData>,
    _model: PhantomData<fn() -> T>,
}

impl<T: NiosModel> NiosDataSource<T> {
    pub fn new() -> Self {
        Self {
            provider_data: None,
            _model: PhantomData,
        }
    }
}

impl<T: NiosModel> Default for NiosDataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: NiosModel> DataSource for NiosDataSource<T> {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: data_source_schema::<T>(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let reader = ObjectReader::new(&request.config);
        let diagnostics = match list_filter::<T>(&reader) {
            Ok(_) => vec![],
            Err(diag) => vec![diag],
        };
        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            ));
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        };

        let reader = ObjectReader::new(&request.config);
        let filter = match list_filter::<T>(&reader) {
            Ok(filter) => filter,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        tracing::debug!("Listing {} objects matching {:?}", T::OBJECT_TYPE, filter);

        let listed: Result<Vec<T>, ApiError> =
            provider_data.client.list_objects(&ctx, &filter).await;
        let objects = match listed {
            Ok(objects) => objects,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Failed to list {} objects", T::OBJECT_TYPE),
                    format!("API error: {}", e),
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let mut result = Vec::with_capacity(objects.len());
        for object in &objects {
            match flatten_result(object) {
                Ok(value) => result.push(value),
                Err(diag) => diagnostics.push(diag),
            }
        }

        let mut state = request.config;
        if let Err(e) = state.set(&AttributePath::new("result"), Dynamic::List(result)) {
            diagnostics.push(Diagnostic::error("Failed to set result", e.to_string()));
        }

        ReadDataSourceResponse { state, diagnostics }
    }
}

#[async_trait]
impl<T: NiosModel> DataSourceWithConfigure for NiosDataSource<T> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<NiosProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                tracing::error!("Failed to downcast provider data to NiosProviderData");
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract NiosProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            ));
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
