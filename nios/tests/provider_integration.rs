//! Provider lifecycle against a mock grid master

use mockito::{Matcher, Server, ServerGuard};
use nios::NiosProvider;
use serde_json::json;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, Resource, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest,
};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

const FILTER_MAC: &str = "nios_dhcp_filtermac";
const REF: &str = "filtermac/ZG5zLmZpbHRlcl9tYWMkbGFi:lab-devices";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

async fn configured_resource(
    server: &ServerGuard,
    type_name: &str,
) -> Box<dyn ResourceWithConfigure> {
    init_tracing();
    let mut provider = NiosProvider::new();

    let mut config = DynamicValue::object();
    let _ = config.set_string(&AttributePath::new("nios_host_url"), server.url());
    let _ = config.set_string(&AttributePath::new("nios_username"), "admin".to_string());
    let _ = config.set_string(&AttributePath::new("nios_password"), "secret".to_string());

    let configure_response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(configure_response.diagnostics.is_empty());

    let factories = provider.resources();
    let mut resource = factories.get(type_name).unwrap()();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: configure_response.provider_data,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

fn string_map(pairs: &[(&str, &str)]) -> Dynamic {
    Dynamic::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Dynamic::from(*v)))
            .collect(),
    )
}

fn state(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
    ))
}

fn prior_state(reference: &str) -> DynamicValue {
    state(vec![
        ("ref", Dynamic::from(reference)),
        ("name", Dynamic::from("lab-devices")),
        ("extattrs", string_map(&[("Site", "DC1")])),
        (
            "extattrs_all",
            string_map(&[
                ("Site", "DC1"),
                ("Owner", "netops"),
                ("Terraform Internal ID", "abc123"),
            ]),
        ),
    ])
}

fn server_object(reference: &str) -> String {
    json!({
        "result": {
            "_ref": reference,
            "name": "lab-devices",
            "never_expires": true,
            "extattrs": {
                "Site": {"value": "DC1"},
                "Owner": {"value": "netops", "inheritance_source": {"_ref": "grid/b25lLmNsdXN0ZXIkMA:Infoblox"}},
                "Terraform Internal ID": {"value": "abc123"}
            }
        }
    })
    .to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_tags_object_and_splits_ext_attrs() {
    let mut server = Server::new_async().await;
    let create_mock = server
        .mock("POST", "/wapi/v2.13.6/filtermac")
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "name": "lab-devices",
                "extattrs": {"Site": {"value": "DC1"}}
            })),
            Matcher::Regex("Terraform Internal ID".to_string()),
        ]))
        .with_status(201)
        .with_body(server_object(REF))
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let planned = state(vec![
        ("ref", Dynamic::Unknown),
        ("name", Dynamic::from("lab-devices")),
        ("never_expires", Dynamic::Unknown),
        ("extattrs", string_map(&[("Site", "DC1")])),
        ("extattrs_all", Dynamic::Unknown),
    ]);

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: FILTER_MAC.to_string(),
                planned_state: planned.clone(),
                config: planned,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.new_state;
    assert_eq!(new_state.get_string(&AttributePath::new("ref")).unwrap(), REF);
    assert!(new_state
        .get_bool(&AttributePath::new("never_expires"))
        .unwrap());
    assert_eq!(
        new_state.get_map(&AttributePath::new("extattrs")).unwrap().len(),
        1
    );
    assert_eq!(
        new_state
            .get_string(&AttributePath::new("extattrs_all").key("Owner"))
            .unwrap(),
        "netops"
    );
    create_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn read_recovers_stale_reference_through_internal_id() {
    let mut server = Server::new_async().await;
    let stale = server
        .mock("GET", "/wapi/v2.13.6/filtermac/ZG5zOnN0YWxl:lab-devices")
        .with_status(404)
        .with_body(r#"{"Error": "AdmConDataNotFoundError: Reference not found", "code": "Client.Ibap.Data.NotFound", "text": "Reference not found"}"#)
        .create_async()
        .await;
    let search = server
        .mock("GET", "/wapi/v2.13.6/filtermac")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("*Terraform Internal ID".into(), "abc123".into()),
            Matcher::UrlEncoded("_paging".into(), "1".into()),
        ]))
        .with_body(
            json!({
                "result": [{
                    "_ref": REF,
                    "name": "lab-devices",
                    "extattrs": {
                        "Site": {"value": "DC1"},
                        "Terraform Internal ID": {"value": "abc123"}
                    }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: FILTER_MAC.to_string(),
                current_state: prior_state("filtermac/ZG5zOnN0YWxl:lab-devices"),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.new_state.unwrap();
    assert_eq!(new_state.get_string(&AttributePath::new("ref")).unwrap(), REF);
    stale.assert_async().await;
    search.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn read_drops_object_missing_everywhere() {
    let mut server = Server::new_async().await;
    let _stale = server
        .mock("GET", "/wapi/v2.13.6/filtermac/ZG5zOnN0YWxl:lab-devices")
        .with_status(404)
        .create_async()
        .await;
    let _search = server
        .mock("GET", "/wapi/v2.13.6/filtermac")
        .match_query(Matcher::UrlEncoded(
            "*Terraform Internal ID".into(),
            "abc123".into(),
        ))
        .with_body(r#"{"result": []}"#)
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: FILTER_MAC.to_string(),
                current_state: prior_state("filtermac/ZG5zOnN0YWxl:lab-devices"),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_carries_inherited_attributes_and_clears_dropped_fields() {
    let mut server = Server::new_async().await;
    let update_mock = server
        .mock("PUT", format!("/wapi/v2.13.6/{}", REF).as_str())
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .match_body(Matcher::Json(json!({
            "name": "lab-devices",
            "comment": "",
            "extattrs": {
                "Site": {"value": "DC2"},
                "Owner": {"value": "netops"},
                "Terraform Internal ID": {"value": "abc123"}
            }
        })))
        .with_body(
            json!({
                "result": {
                    "_ref": REF,
                    "name": "lab-devices",
                    "never_expires": true,
                    "extattrs": {
                        "Site": {"value": "DC2"},
                        "Owner": {"value": "netops", "inheritance_source": {"_ref": "grid/b25lLmNsdXN0ZXIkMA:Infoblox"}},
                        "Terraform Internal ID": {"value": "abc123"}
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let prior = state(vec![
        ("ref", Dynamic::from(REF)),
        ("name", Dynamic::from("lab-devices")),
        ("comment", Dynamic::from("temporary")),
        ("never_expires", Dynamic::Bool(true)),
        ("extattrs", string_map(&[("Site", "DC1"), ("Tier", "gold")])),
        (
            "extattrs_all",
            string_map(&[
                ("Site", "DC1"),
                ("Tier", "gold"),
                ("Owner", "netops"),
                ("Terraform Internal ID", "abc123"),
            ]),
        ),
    ]);
    let planned = state(vec![
        ("ref", Dynamic::from(REF)),
        ("name", Dynamic::from("lab-devices")),
        ("comment", Dynamic::Null),
        ("never_expires", Dynamic::Unknown),
        ("extattrs", string_map(&[("Site", "DC2")])),
        ("extattrs_all", Dynamic::Unknown),
    ]);

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: FILTER_MAC.to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.new_state;
    let declared = new_state.get_map(&AttributePath::new("extattrs")).unwrap();
    assert_eq!(declared.len(), 1);
    assert_eq!(
        new_state
            .get_string(&AttributePath::new("extattrs").key("Site"))
            .unwrap(),
        "DC2"
    );
    let all = new_state.get_map(&AttributePath::new("extattrs_all")).unwrap();
    assert_eq!(all.len(), 3);
    assert!(!all.contains_key("Tier"));
    assert!(all.contains_key("Owner"));
    assert_eq!(
        new_state
            .get_string(&AttributePath::new("extattrs_all").key("Terraform Internal ID"))
            .unwrap(),
        "abc123"
    );
    assert_eq!(
        new_state.get(&AttributePath::new("comment")),
        Some(&Dynamic::Null)
    );
    update_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_treats_missing_object_as_deleted() {
    let mut server = Server::new_async().await;
    let delete_mock = server
        .mock("DELETE", format!("/wapi/v2.13.6/{}", REF).as_str())
        .with_status(404)
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: FILTER_MAC.to_string(),
                prior_state: prior_state(REF),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    delete_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn import_tags_untagged_object() {
    let mut server = Server::new_async().await;
    let read_mock = server
        .mock("GET", format!("/wapi/v2.13.6/{}", REF).as_str())
        .with_body(
            json!({
                "result": {
                    "_ref": REF,
                    "name": "lab-devices",
                    "extattrs": {
                        "Site": {"value": "DC1"},
                        "Owner": {"value": "netops", "inheritance_source": {"_ref": "grid/b25lLmNsdXN0ZXIkMA:Infoblox"}}
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let tag_mock = server
        .mock("PUT", format!("/wapi/v2.13.6/{}", REF).as_str())
        .match_body(Matcher::PartialJson(json!({
            "extattrs": {"Site": {"value": "DC1"}}
        })))
        .with_body(server_object(REF))
        .create_async()
        .await;

    let resource = configured_resource(&server, FILTER_MAC).await;
    let importer = resource.as_import_state().unwrap();
    let response = importer
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: FILTER_MAC.to_string(),
                id: REF.to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.imported_resources.len(), 1);
    let imported = &response.imported_resources[0].state;
    let declared = imported.get_map(&AttributePath::new("extattrs")).unwrap();
    assert_eq!(declared.len(), 1);
    assert!(declared.contains_key("Site"));
    assert_eq!(
        imported
            .get_string(&AttributePath::new("extattrs_all").key("Terraform Internal ID"))
            .unwrap(),
        "abc123"
    );
    read_mock.assert_async().await;
    tag_mock.assert_async().await;
}

#[tokio::test]
async fn resources_require_configuration() {
    let provider = NiosProvider::new();
    let factories = provider.resources();
    let resource = factories.get("nios_dhcp_optionspace").unwrap()();

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "nios_dhcp_optionspace".to_string(),
                prior_state: state(vec![("ref", Dynamic::from("dhcpoptionspace/ZG5z:pxe"))]),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Provider not configured");
}
