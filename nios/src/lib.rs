//! Terraform provider for Infoblox NIOS DHCP objects
//!
//! Objects created by the provider are tagged with the
//! [`extattrs::INTERNAL_ID_EXT_ATTR`] extensible attribute so they can be
//! found again when their server reference changes.

pub mod api;
pub mod data_sources;
pub mod extattrs;
pub mod provider_data;
pub mod reconciler;
pub mod resources;

use api::dhcp::{
    FilterFingerprint, FilterMac, FilterNac, FilterRelayAgent, FixedAddress, Ipv6Range,
    Ipv6RangeTemplate, OptionDefinition, OptionSpace, SharedNetwork,
};
use async_trait::async_trait;
use data_sources::NiosDataSource;
use provider_data::NiosProviderData;
use resources::convert::ObjectReader;
use resources::{NiosModel, NiosResource};
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

/// Provider for the `nios_dhcp_*` resources and data sources
#[derive(Default)]
pub struct NiosProvider;

impl NiosProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn resource_factory<T: NiosModel>() -> (String, ResourceFactory) {
    (
        T::TYPE_NAME.to_string(),
        Box::new(|| Box::new(NiosResource::<T>::new()) as Box<dyn ResourceWithConfigure>),
    )
}

fn data_source_factory<T: NiosModel>() -> (String, DataSourceFactory) {
    (
        T::TYPE_NAME.to_string(),
        Box::new(|| Box::new(NiosDataSource::<T>::new()) as Box<dyn DataSourceWithConfigure>),
    )
}

/// Configuration value, falling back to an environment variable
fn string_setting(
    config: &ObjectReader<'_>,
    name: &str,
    env: &str,
) -> Result<Option<String>, Diagnostic> {
    Ok(config
        .string(name)?
        .or_else(|| std::env::var(env).ok())
        .filter(|v| !v.is_empty()))
}

fn bool_setting(config: &ObjectReader<'_>, name: &str, env: &str) -> Result<bool, Diagnostic> {
    if let Some(value) = config.bool(name)? {
        return Ok(value);
    }
    match std::env::var(env) {
        Ok(value) if !value.is_empty() => value.parse::<bool>().map_err(|_| {
            Diagnostic::error(
                "Invalid provider configuration",
                format!("{} must be true or false, got '{}'", env, value),
            )
            .with_attribute(AttributePath::new(name))
        }),
        _ => Ok(false),
    }
}

fn missing_setting(name: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        format!("{} is required", name),
        format!(
            "Set {} in the provider configuration or the {} environment variable",
            name, env
        ),
    )
    .with_attribute(AttributePath::new(name))
}

#[async_trait]
impl Provider for NiosProvider {
    fn type_name(&self) -> &str {
        "nios"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Infoblox NIOS DHCP provider")
            .attribute(
                AttributeBuilder::new("nios_host_url", AttributeType::String)
                    .description("URL of the grid master, e.g. https://gm.example.com. May also be set with NIOS_HOST_URL")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("nios_username", AttributeType::String)
                    .description("WAPI user name. May also be set with NIOS_USERNAME")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("nios_password", AttributeType::String)
                    .description("WAPI password. May also be set with NIOS_PASSWORD")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("wapi_version", AttributeType::String)
                    .description("WAPI version, defaults to 2.13.6. May also be set with NIOS_WAPI_VERSION")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification. May also be set with NIOS_INSECURE")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];
        let config = ObjectReader::new(&request.config);

        let mut setting = |name: &str, env: &str| match string_setting(&config, name, env) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                diagnostics.push(missing_setting(name, env));
                None
            }
            Err(diag) => {
                diagnostics.push(diag);
                None
            }
        };
        let host_url = setting("nios_host_url", "NIOS_HOST_URL");
        let username = setting("nios_username", "NIOS_USERNAME");
        let password = setting("nios_password", "NIOS_PASSWORD");

        let wapi_version = match string_setting(&config, "wapi_version", "NIOS_WAPI_VERSION") {
            Ok(version) => version.unwrap_or_else(|| api::DEFAULT_WAPI_VERSION.to_string()),
            Err(diag) => {
                diagnostics.push(diag);
                api::DEFAULT_WAPI_VERSION.to_string()
            }
        };
        let insecure = bool_setting(&config, "insecure", "NIOS_INSECURE").unwrap_or_else(|diag| {
            diagnostics.push(diag);
            false
        });

        let (Some(host_url), Some(username), Some(password)) = (host_url, username, password)
        else {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };
        if !diagnostics.is_empty() {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let client_config = api::ClientConfig::new(host_url, username, password)
            .with_wapi_version(wapi_version)
            .with_insecure(insecure);

        match api::Client::new(client_config) {
            Ok(client) => {
                tracing::info!("Configured NIOS client for {}", client.base_url());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(NiosProviderData::new(client))),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        HashMap::from([
            resource_factory::<FixedAddress>(),
            resource_factory::<SharedNetwork>(),
            resource_factory::<Ipv6Range>(),
            resource_factory::<Ipv6RangeTemplate>(),
            resource_factory::<FilterMac>(),
            resource_factory::<FilterNac>(),
            resource_factory::<FilterRelayAgent>(),
            resource_factory::<FilterFingerprint>(),
            resource_factory::<OptionSpace>(),
            resource_factory::<OptionDefinition>(),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::from([
            data_source_factory::<FixedAddress>(),
            data_source_factory::<SharedNetwork>(),
            data_source_factory::<Ipv6Range>(),
            data_source_factory::<Ipv6RangeTemplate>(),
            data_source_factory::<FilterMac>(),
            data_source_factory::<FilterNac>(),
            data_source_factory::<FilterRelayAgent>(),
            data_source_factory::<FilterFingerprint>(),
            data_source_factory::<OptionSpace>(),
            data_source_factory::<OptionDefinition>(),
        ])
    }
}
