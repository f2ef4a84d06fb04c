//! Terraform resources for NIOS objects
//!
//! Every object type is served by the same [`NiosResource`]; the per-type
//! behavior lives in its [`NiosModel`] implementation.

pub mod convert;
pub mod dhcp;

use crate::api::object::{ClearedFields, WapiObject};
use crate::api::Client;
use crate::extattrs::{ExtAttrMap, INTERNAL_ID_EXT_ATTR};
use crate::provider_data::NiosProviderData;
use crate::reconciler::{PriorState, ReadOutcome, ReconcileError, Reconciler, Tracked};
use async_trait::async_trait;
use convert::{string_map, ObjectReader, ObjectWriter};
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceMetadataRequest,
    ResourceMetadataResponse, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

/// Terraform-facing description of one WAPI object type
pub trait NiosModel: WapiObject {
    /// Resource and data source type name, e.g. `nios_dhcp_filtermac`
    const TYPE_NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Attributes of the object itself, without `ref` and extensible attributes
    fn attributes() -> Vec<Attribute>;

    /// Builds the wire object from configuration or planned state
    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic>;

    fn flatten(&self, out: &mut ObjectWriter);

    /// Cross-field checks run at plan time
    fn validate(_config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Wire value that unsets an optional attribute dropped from configuration
    fn cleared_value(attribute: &Attribute) -> serde_json::Value {
        cleared_value_by_type(attribute)
    }
}

/// Empty string for strings, empty array for lists, null otherwise
pub fn cleared_value_by_type(attribute: &Attribute) -> serde_json::Value {
    match attribute.r#type {
        AttributeType::String => serde_json::Value::String(String::new()),
        AttributeType::List(_) | AttributeType::Set(_) => serde_json::Value::Array(Vec::new()),
        _ => serde_json::Value::Null,
    }
}

pub fn ref_attribute() -> Attribute {
    AttributeBuilder::new("ref", AttributeType::String)
        .description("The reference to the object")
        .computed()
        .build()
}

pub fn ext_attrs_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("extattrs", AttributeType::map_of(AttributeType::String))
            .description("Extensible attributes of the object")
            .optional()
            .build(),
        AttributeBuilder::new("extattrs_all", AttributeType::map_of(AttributeType::String))
            .description(
                "Extensible attributes of the object, including inherited and internal ones",
            )
            .computed()
            .build(),
    ]
}

pub fn resource_schema<T: NiosModel>() -> Schema {
    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(T::DESCRIPTION)
        .attribute(ref_attribute())
        .attributes(T::attributes());
    if T::EXT_ATTRS {
        builder = builder.attributes(ext_attrs_attributes());
    }
    builder.build()
}

/// State value for a tracked object
pub fn state_from<T: NiosModel>(tracked: &Tracked<T>) -> DynamicValue {
    let mut out = ObjectWriter::new();
    out.set("ref", tracked.reference().map(str::to_string));
    tracked.object.flatten(&mut out);
    if T::EXT_ATTRS {
        out.set(
            "extattrs",
            tracked
                .ext_attrs
                .as_ref()
                .map(string_map)
                .unwrap_or(Dynamic::Null),
        );
        out.set("extattrs_all", string_map(&tracked.ext_attrs_all));
    }
    DynamicValue::new(out.finish())
}

fn prior_state(state: &DynamicValue) -> Result<PriorState, Diagnostic> {
    let reader = ObjectReader::new(state);
    let reference = reader.string("ref")?.ok_or_else(|| {
        Diagnostic::error(
            "Invalid state",
            ReconcileError::InvalidState("the object reference is missing".to_string())
                .to_string(),
        )
    })?;
    Ok(PriorState {
        reference,
        ext_attrs: reader.string_map("extattrs")?,
        ext_attrs_all: reader.string_map("extattrs_all")?,
    })
}

/// Optional attributes set in `prior` that `planned` drops
///
/// Computed attributes are left alone; an unset value there adopts the
/// server's.
pub fn cleared_fields<T: NiosModel>(
    prior: &ObjectReader<'_>,
    planned: &ObjectReader<'_>,
) -> ClearedFields {
    T::attributes()
        .iter()
        .filter(|attr| attr.optional && !attr.computed)
        .filter(|attr| prior.is_set(&attr.name) && planned.is_null(&attr.name))
        .map(|attr| (attr.name.clone(), T::cleared_value(attr)))
        .collect()
}

/// Reads back reset attributes as null when the server echoes an empty value
fn settle_cleared(mut state: DynamicValue, cleared: &ClearedFields) -> DynamicValue {
    if let Dynamic::Map(attrs) = &mut state.value {
        for name in cleared.keys() {
            let emptied = match attrs.get(name) {
                Some(Dynamic::String(s)) => s.is_empty(),
                Some(Dynamic::List(items)) => items.is_empty(),
                _ => false,
            };
            if emptied {
                attrs.insert(name.clone(), Dynamic::Null);
            }
        }
    }
    state
}

fn declared_ext_attrs<T: NiosModel>(
    reader: &ObjectReader<'_>,
) -> Result<Option<ExtAttrMap>, Diagnostic> {
    if T::EXT_ATTRS {
        reader.string_map("extattrs")
    } else {
        Ok(None)
    }
}

fn api_diagnostic(summary: &str, err: &ReconcileError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

/// Terraform resource backed by the shared reconciler
pub struct NiosResource<T> {
    provider_data: Option<NiosProviderData>,
    _model: PhantomData<fn() -> T>,
}

impl<T: NiosModel> NiosResource<T> {
    pub fn new() -> Self {
        Self {
            provider_data: None,
            _model: PhantomData,
        }
    }

    fn provider_data(&self, diagnostics: &mut Vec<Diagnostic>) -> Option<&NiosProviderData> {
        if self.provider_data.is_none() {
            diagnostics.push(Diagnostic::error(
                "Provider not configured",
                "The provider has not been configured. Please ensure the provider is properly configured.",
            ));
        }
        self.provider_data.as_ref()
    }
}

impl<T: NiosModel> Default for NiosResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: NiosModel> Resource for NiosResource<T> {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: resource_schema::<T>(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let reader = ObjectReader::new(&request.config);
        let mut diagnostics = T::validate(&reader);

        match declared_ext_attrs::<T>(&reader) {
            Ok(Some(declared)) if declared.contains_key(INTERNAL_ID_EXT_ATTR) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Reserved extensible attribute",
                        format!(
                            "'{}' is managed by the provider and cannot be set",
                            INTERNAL_ID_EXT_ATTR
                        ),
                    )
                    .with_attribute(reader.path("extattrs").key(INTERNAL_ID_EXT_ATTR)),
                );
            }
            Ok(_) => {}
            Err(diag) => diagnostics.push(diag),
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = self.provider_data(&mut diagnostics) else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let reader = ObjectReader::new(&request.planned_state);
        let expanded = T::expand(&reader)
            .and_then(|object| Ok((object, declared_ext_attrs::<T>(&reader)?)));
        let (object, declared) = match expanded {
            Ok(expanded) => expanded,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let reconciler = Reconciler::<T, Client>::new(&provider_data.client);
        match reconciler.create(&ctx, object, declared).await {
            Ok(tracked) => CreateResourceResponse {
                new_state: state_from(&tracked),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_diagnostic(
                    &format!("Failed to create {}", T::OBJECT_TYPE),
                    &e,
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = self.provider_data(&mut diagnostics) else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        let prior = match prior_state(&request.current_state) {
            Ok(prior) => prior,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let reconciler = Reconciler::<T, Client>::new(&provider_data.client);
        match reconciler.read(&ctx, &prior).await {
            Ok(ReadOutcome::Found(tracked)) => ReadResourceResponse {
                new_state: Some(state_from(&tracked)),
                diagnostics,
            },
            Ok(ReadOutcome::Removed) => {
                tracing::info!(
                    "{} {} no longer exists, removing from state",
                    T::OBJECT_TYPE,
                    prior.reference
                );
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_diagnostic(
                    &format!("Failed to read {}", T::OBJECT_TYPE),
                    &e,
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = self.provider_data(&mut diagnostics) else {
            return UpdateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let reader = ObjectReader::new(&request.planned_state);
        let cleared = cleared_fields::<T>(&ObjectReader::new(&request.prior_state), &reader);
        let expanded = prior_state(&request.prior_state).and_then(|prior| {
            let object = T::expand(&reader)?;
            Ok((prior, object, declared_ext_attrs::<T>(&reader)?))
        });
        let (prior, object, declared) = match expanded {
            Ok(expanded) => expanded,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let reconciler = Reconciler::<T, Client>::new(&provider_data.client);
        match reconciler
            .update(&ctx, &prior, object, declared, &cleared)
            .await
        {
            Ok(tracked) => UpdateResourceResponse {
                new_state: settle_cleared(state_from(&tracked), &cleared),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_diagnostic(
                    &format!("Failed to update {}", T::OBJECT_TYPE),
                    &e,
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = self.provider_data(&mut diagnostics) else {
            return DeleteResourceResponse { diagnostics };
        };

        let prior = match prior_state(&request.prior_state) {
            Ok(prior) => prior,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let reconciler = Reconciler::<T, Client>::new(&provider_data.client);
        if let Err(e) = reconciler.delete(&ctx, &prior.reference).await {
            diagnostics.push(api_diagnostic(
                &format!("Failed to delete {}", T::OBJECT_TYPE),
                &e,
            ));
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl<T: NiosModel> ResourceWithConfigure for NiosResource<T> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<NiosProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract NiosProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<T: NiosModel> ResourceWithImportState for NiosResource<T> {
    /// The import ID is the object reference
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut diagnostics = vec![];
        let mut imported_resources = vec![];

        let Some(provider_data) = self.provider_data(&mut diagnostics) else {
            return ImportResourceStateResponse {
                imported_resources,
                diagnostics,
            };
        };

        let reference = crate::api::extract_resource_ref(&request.id);
        let reconciler = Reconciler::<T, Client>::new(&provider_data.client);
        match reconciler.import(&ctx, &reference).await {
            Ok(tracked) => imported_resources.push(ImportedResource {
                type_name: request.type_name,
                state: state_from(&tracked),
            }),
            Err(e) => diagnostics.push(api_diagnostic(
                &format!("Failed to import {}", T::OBJECT_TYPE),
                &e,
            )),
        }

        ImportResourceStateResponse {
            imported_resources,
            diagnostics,
        }
    }
}
