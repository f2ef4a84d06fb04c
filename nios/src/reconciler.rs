//! Generic create/read/update/delete/import flow shared by every object type
//!
//! The reconciler owns the extensible-attribute bookkeeping: it tags new
//! objects with an internal ID, keeps inherited attributes out of the
//! user-declared view, and recovers objects whose reference went stale by
//! looking them up through that ID.

use crate::api::common::ExtAttrs;
use crate::api::error::ApiError;
use crate::api::object::{ClearedFields, ListFilter, ObjectApi, WapiObject};
use crate::extattrs::{
    add_inherited_ext_attrs, add_internal_id_to_ext_attrs, internal_id, local_ext_attrs,
    remove_inherited_ext_attrs, to_wire, ExtAttrError, ExtAttrMap, INTERNAL_ID_EXT_ATTR,
};
use std::marker::PhantomData;
use tfplug::context::Context;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    ExtAttrs(#[from] ExtAttrError),

    #[error("found {count} {object_type} objects with internal ID '{internal_id}', expected at most one")]
    Ambiguous {
        object_type: &'static str,
        internal_id: String,
        count: usize,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// A server object together with both views of its extensible attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    pub object: T,
    /// Attributes the user declared, with server values
    pub ext_attrs: Option<ExtAttrMap>,
    /// Every attribute on the server object
    pub ext_attrs_all: ExtAttrMap,
}

impl<T: WapiObject> Tracked<T> {
    pub fn reference(&self) -> Option<&str> {
        self.object.reference()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Found(Tracked<T>),
    /// The object is gone and should be dropped from state
    Removed,
}

/// What state remembers about an object between runs
#[derive(Debug, Clone, Default)]
pub struct PriorState {
    pub reference: String,
    pub ext_attrs: Option<ExtAttrMap>,
    pub ext_attrs_all: Option<ExtAttrMap>,
}

impl PriorState {
    fn internal_id(&self) -> Option<&str> {
        self.ext_attrs_all
            .as_ref()?
            .get(INTERNAL_ID_EXT_ATTR)
            .map(String::as_str)
    }
}

pub struct Reconciler<'a, T, C> {
    api: &'a C,
    _object: PhantomData<fn() -> T>,
}

impl<'a, T, C> Reconciler<'a, T, C>
where
    T: WapiObject,
    C: ObjectApi<T>,
{
    pub fn new(api: &'a C) -> Self {
        Self {
            api,
            _object: PhantomData,
        }
    }

    /// Creates `object`, tagging it with a fresh internal ID
    ///
    /// `declared` is the user's attribute map as configured, without the ID.
    pub async fn create(
        &self,
        ctx: &Context,
        mut object: T,
        declared: Option<ExtAttrMap>,
    ) -> Result<Tracked<T>, ReconcileError> {
        if T::EXT_ATTRS {
            let with_id = add_internal_id_to_ext_attrs(declared.clone());
            object.set_ext_attrs(Some(to_wire(&with_id)));
        }

        let created = self.api.create_object(ctx, &object).await?;
        tracing::info!(
            "Created {} {}",
            T::OBJECT_TYPE,
            created.reference().unwrap_or_default()
        );

        self.track(created, declared.as_ref())
    }

    /// Reads the object behind `prior`, falling back to the internal ID when
    /// the reference no longer points at it
    pub async fn read(
        &self,
        ctx: &Context,
        prior: &PriorState,
    ) -> Result<ReadOutcome<T>, ReconcileError> {
        let prior_id = if T::EXT_ATTRS {
            prior.internal_id()
        } else {
            None
        };

        match self.api.read_object(ctx, &prior.reference).await {
            Ok(object) => {
                if let Some(id) = prior_id {
                    let server_id = internal_id(object.ext_attrs());
                    if server_id.as_deref() != Some(id) {
                        tracing::warn!(
                            "{} {} no longer carries internal ID {}, searching by ID",
                            T::OBJECT_TYPE,
                            prior.reference,
                            id
                        );
                        return self
                            .read_by_internal_id(ctx, id, prior.ext_attrs.as_ref())
                            .await;
                    }
                }
                Ok(ReadOutcome::Found(
                    self.track(object, prior.ext_attrs.as_ref())?,
                ))
            }
            Err(e) if e.is_not_found() => match prior_id {
                Some(id) => {
                    tracing::warn!(
                        "{} {} not found, searching by internal ID {}",
                        T::OBJECT_TYPE,
                        prior.reference,
                        id
                    );
                    self.read_by_internal_id(ctx, id, prior.ext_attrs.as_ref())
                        .await
                }
                None => {
                    tracing::debug!("{} {} not found", T::OBJECT_TYPE, prior.reference);
                    Ok(ReadOutcome::Removed)
                }
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Lists objects tagged with `id`; zero matches means the object is gone
    pub async fn read_by_internal_id(
        &self,
        ctx: &Context,
        id: &str,
        declared: Option<&ExtAttrMap>,
    ) -> Result<ReadOutcome<T>, ReconcileError> {
        let filter = ListFilter::new().ext_attr(INTERNAL_ID_EXT_ATTR, id);
        let mut matches = self.api.list_objects(ctx, &filter).await?;

        match matches.len() {
            0 => {
                tracing::debug!("No {} tagged with internal ID {}", T::OBJECT_TYPE, id);
                Ok(ReadOutcome::Removed)
            }
            1 => {
                let object = matches.remove(0);
                tracing::info!(
                    "Recovered {} {} through internal ID {}",
                    T::OBJECT_TYPE,
                    object.reference().unwrap_or_default(),
                    id
                );
                Ok(ReadOutcome::Found(self.track(object, declared)?))
            }
            count => Err(ReconcileError::Ambiguous {
                object_type: T::OBJECT_TYPE,
                internal_id: id.to_string(),
                count,
            }),
        }
    }

    /// Writes `object` over the one behind `prior`
    ///
    /// Attributes the user removed since the last apply are dropped; all
    /// other attributes from `prior.ext_attrs_all` are carried over so
    /// inherited values and the internal ID survive the write. Fields in
    /// `cleared` are reset on the server.
    pub async fn update(
        &self,
        ctx: &Context,
        prior: &PriorState,
        mut object: T,
        declared: Option<ExtAttrMap>,
        cleared: &ClearedFields,
    ) -> Result<Tracked<T>, ReconcileError> {
        if T::EXT_ATTRS {
            let carried = prior.ext_attrs_all.as_ref().map(|all| {
                all.iter()
                    .filter(|(name, _)| !removed_by_user(name, prior, declared.as_ref()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect::<ExtAttrMap>()
            });
            let merged = add_inherited_ext_attrs(declared.clone(), carried.as_ref());
            let with_id = add_internal_id_to_ext_attrs(merged);
            object.set_ext_attrs(Some(to_wire(&with_id)));
        }

        let updated = self
            .api
            .update_object(ctx, &prior.reference, &object, cleared)
            .await?;
        tracing::info!("Updated {} {}", T::OBJECT_TYPE, prior.reference);

        self.track(updated, declared.as_ref())
    }

    /// Deletes the object; one that is already gone counts as deleted
    pub async fn delete(&self, ctx: &Context, reference: &str) -> Result<(), ReconcileError> {
        match self.api.delete_object(ctx, reference).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", T::OBJECT_TYPE, reference);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} already deleted", T::OBJECT_TYPE, reference);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Adopts an existing object, tagging it with an internal ID if needed
    ///
    /// The declared view becomes the attributes set directly on the object.
    pub async fn import(
        &self,
        ctx: &Context,
        reference: &str,
    ) -> Result<Tracked<T>, ReconcileError> {
        let mut object = self.api.read_object(ctx, reference).await?;

        if !T::EXT_ATTRS {
            tracing::info!("Imported {} {}", T::OBJECT_TYPE, reference);
            return self.track(object, None);
        }

        let returned = object.ext_attrs().cloned().unwrap_or_default();
        let local = local_ext_attrs(&returned)?;

        if internal_id(Some(&returned)).is_none() {
            // Only non-inherited attributes are written back
            let with_id = add_internal_id_to_ext_attrs(Some(local.clone()));
            object = self
                .api
                .update_ext_attrs(ctx, reference, &to_wire(&with_id))
                .await?;
            tracing::debug!("Tagged imported {} {} with internal ID", T::OBJECT_TYPE, reference);
        }

        tracing::info!("Imported {} {}", T::OBJECT_TYPE, reference);
        let declared = (!local.is_empty()).then_some(local);
        self.track(object, declared.as_ref())
    }

    fn track(
        &self,
        object: T,
        declared: Option<&ExtAttrMap>,
    ) -> Result<Tracked<T>, ReconcileError> {
        if !T::EXT_ATTRS {
            return Ok(Tracked {
                object,
                ext_attrs: None,
                ext_attrs_all: ExtAttrMap::new(),
            });
        }

        let empty = ExtAttrs::new();
        let returned = object.ext_attrs().unwrap_or(&empty);
        let (ext_attrs, ext_attrs_all) = remove_inherited_ext_attrs(declared, returned)?;

        Ok(Tracked {
            object,
            ext_attrs,
            ext_attrs_all,
        })
    }
}

/// Declared in the prior run but no longer declared now
fn removed_by_user(name: &str, prior: &PriorState, declared: Option<&ExtAttrMap>) -> bool {
    let previously = prior
        .ext_attrs
        .as_ref()
        .is_some_and(|d| d.contains_key(name));
    let now = declared.is_some_and(|d| d.contains_key(name));
    previously && !now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ExtAttr;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        #[serde(rename = "_ref", default, skip_serializing)]
        reference: Option<String>,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extattrs: Option<ExtAttrs>,
    }

    impl WapiObject for Widget {
        const OBJECT_TYPE: &'static str = "widget";
        const RETURN_FIELDS: &'static str = "name,extattrs";

        fn reference(&self) -> Option<&str> {
            self.reference.as_deref()
        }

        fn ext_attrs(&self) -> Option<&ExtAttrs> {
            self.extattrs.as_ref()
        }

        fn set_ext_attrs(&mut self, ext_attrs: Option<ExtAttrs>) {
            self.extattrs = ext_attrs;
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Plain {
        #[serde(rename = "_ref", default, skip_serializing)]
        reference: Option<String>,
        name: String,
    }

    impl WapiObject for Plain {
        const OBJECT_TYPE: &'static str = "plain";
        const RETURN_FIELDS: &'static str = "name";
        const EXT_ATTRS: bool = false;

        fn reference(&self) -> Option<&str> {
            self.reference.as_deref()
        }
    }

    /// In-memory WAPI keyed by reference
    struct FakeApi<T> {
        objects: Mutex<HashMap<String, T>>,
        next: Mutex<u32>,
        inherited: ExtAttrs,
        list_calls: Mutex<Vec<ListFilter>>,
        updates: Mutex<Vec<String>>,
        cleared: Mutex<Vec<ClearedFields>>,
    }

    impl<T: WapiObject> Default for FakeApi<T> {
        fn default() -> Self {
            Self::with_inherited(&[])
        }
    }

    impl<T: WapiObject> FakeApi<T> {
        fn with_inherited(pairs: &[(&str, &str)]) -> Self {
            let inherited = pairs
                .iter()
                .map(|(k, v)| {
                    let attr = ExtAttr {
                        value: serde_json::Value::String(v.to_string()),
                        inheritance_source: Some(serde_json::json!({"_ref": "network/parent"})),
                    };
                    (k.to_string(), attr)
                })
                .collect();
            Self {
                objects: Mutex::new(HashMap::new()),
                next: Mutex::new(0),
                inherited,
                list_calls: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
                cleared: Mutex::new(Vec::new()),
            }
        }

        fn insert(&self, reference: &str, mut object: T) {
            set_reference(&mut object, reference);
            self.objects
                .lock()
                .unwrap()
                .insert(reference.to_string(), object);
        }

        fn get(&self, reference: &str) -> Option<T> {
            self.objects.lock().unwrap().get(reference).cloned()
        }

        fn remove(&self, reference: &str) -> Option<T> {
            self.objects.lock().unwrap().remove(reference)
        }

        /// Round-trips through JSON so server-side field handling matches WAPI
        fn store(&self, reference: &str, object: &T, keep: Option<&T>) -> T {
            let mut value = serde_json::to_value(object).unwrap();
            value["_ref"] = serde_json::Value::String(reference.to_string());
            let mut stored: T = serde_json::from_value(value).unwrap();
            if T::EXT_ATTRS {
                let mut ext_attrs = match (stored.ext_attrs(), keep) {
                    (Some(sent), _) => sent.clone(),
                    (None, Some(previous)) => previous.ext_attrs().cloned().unwrap_or_default(),
                    (None, None) => ExtAttrs::new(),
                };
                for (name, attr) in &self.inherited {
                    ext_attrs.entry(name.clone()).or_insert_with(|| attr.clone());
                }
                stored.set_ext_attrs(Some(ext_attrs));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(reference.to_string(), stored.clone());
            stored
        }
    }

    fn set_reference<T: WapiObject>(object: &mut T, reference: &str) {
        let mut value = serde_json::to_value(&*object).unwrap();
        value["_ref"] = serde_json::Value::String(reference.to_string());
        *object = serde_json::from_value(value).unwrap();
    }

    fn not_found(reference: &str) -> ApiError {
        ApiError::NotFound(reference.to_string())
    }

    #[async_trait]
    impl<T: WapiObject> ObjectApi<T> for FakeApi<T> {
        async fn create_object(&self, _ctx: &Context, object: &T) -> Result<T, ApiError> {
            let reference = {
                let mut next = self.next.lock().unwrap();
                *next += 1;
                format!("{}/ref{}", T::OBJECT_TYPE, next)
            };
            Ok(self.store(&reference, object, None))
        }

        async fn read_object(&self, _ctx: &Context, reference: &str) -> Result<T, ApiError> {
            self.get(reference).ok_or_else(|| not_found(reference))
        }

        async fn update_object(
            &self,
            _ctx: &Context,
            reference: &str,
            object: &T,
            cleared: &ClearedFields,
        ) -> Result<T, ApiError> {
            let previous = self.get(reference).ok_or_else(|| not_found(reference))?;
            self.updates.lock().unwrap().push(reference.to_string());
            self.cleared.lock().unwrap().push(cleared.clone());
            Ok(self.store(reference, object, Some(&previous)))
        }

        async fn update_ext_attrs(
            &self,
            _ctx: &Context,
            reference: &str,
            ext_attrs: &ExtAttrs,
        ) -> Result<T, ApiError> {
            let mut object = self.get(reference).ok_or_else(|| not_found(reference))?;
            self.updates.lock().unwrap().push(reference.to_string());
            object.set_ext_attrs(Some(ext_attrs.clone()));
            Ok(self.store(reference, &object, None))
        }

        async fn delete_object(&self, _ctx: &Context, reference: &str) -> Result<(), ApiError> {
            self.remove(reference)
                .map(|_| ())
                .ok_or_else(|| not_found(reference))
        }

        async fn list_objects(
            &self,
            _ctx: &Context,
            filter: &ListFilter,
        ) -> Result<Vec<T>, ApiError> {
            self.list_calls.lock().unwrap().push(filter.clone());
            let objects = self.objects.lock().unwrap();
            Ok(objects
                .values()
                .filter(|object| {
                    filter.ext_attrs.iter().all(|(name, value)| {
                        object
                            .ext_attrs()
                            .and_then(|ea| ea.get(name))
                            .is_some_and(|attr| attr.value.as_str() == Some(value.as_str()))
                    })
                })
                .cloned()
                .collect())
        }
    }

    fn map(pairs: &[(&str, &str)]) -> ExtAttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn widget(name: &str) -> Widget {
        Widget {
            reference: None,
            name: name.to_string(),
            extattrs: None,
        }
    }

    fn prior_of(tracked: &Tracked<Widget>) -> PriorState {
        PriorState {
            reference: tracked.reference().unwrap().to_string(),
            ext_attrs: tracked.ext_attrs.clone(),
            ext_attrs_all: Some(tracked.ext_attrs_all.clone()),
        }
    }

    #[tokio::test]
    async fn create_tags_object_and_hides_id_from_declared_view() {
        let api = FakeApi::<Widget>::with_inherited(&[("Owner", "netops")]);
        let reconciler = Reconciler::new(&api);

        let tracked = reconciler
            .create(&Context::new(), widget("w1"), Some(map(&[("Site", "DC1")])))
            .await
            .unwrap();

        assert_eq!(tracked.ext_attrs, Some(map(&[("Site", "DC1")])));
        assert_eq!(tracked.ext_attrs_all["Site"], "DC1");
        assert_eq!(tracked.ext_attrs_all["Owner"], "netops");
        let id = &tracked.ext_attrs_all[INTERNAL_ID_EXT_ATTR];
        assert!(uuid::Uuid::parse_str(id).is_ok());

        let stored = api.get(tracked.reference().unwrap()).unwrap();
        assert_eq!(internal_id(stored.ext_attrs()).as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn create_without_declared_ext_attrs_keeps_declared_view_null() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);

        let tracked = reconciler
            .create(&Context::new(), widget("w1"), None)
            .await
            .unwrap();

        assert_eq!(tracked.ext_attrs, None);
        assert!(tracked.ext_attrs_all.contains_key(INTERNAL_ID_EXT_ATTR));
    }

    #[tokio::test]
    async fn read_by_reference_when_id_matches() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(&Context::new(), widget("w1"), Some(map(&[("Site", "DC1")])))
            .await
            .unwrap();

        let outcome = reconciler
            .read(&Context::new(), &prior_of(&created))
            .await
            .unwrap();

        assert_eq!(outcome, ReadOutcome::Found(created));
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_with_stale_reference_finds_object_by_id() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(&Context::new(), widget("w1"), Some(map(&[("Site", "DC1")])))
            .await
            .unwrap();

        // The server renamed the object, changing its reference
        let old_ref = created.reference().unwrap().to_string();
        let object = api.remove(&old_ref).unwrap();
        api.insert("widget/renamed", object);

        let outcome = reconciler
            .read(&Context::new(), &prior_of(&created))
            .await
            .unwrap();

        let ReadOutcome::Found(found) = outcome else {
            panic!("Expected object to be recovered");
        };
        assert_eq!(found.reference(), Some("widget/renamed"));
        assert_eq!(found.ext_attrs, Some(map(&[("Site", "DC1")])));

        let calls = api.list_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].ext_attrs,
            vec![(
                INTERNAL_ID_EXT_ATTR.to_string(),
                created.ext_attrs_all[INTERNAL_ID_EXT_ATTR].clone()
            )]
        );
    }

    #[tokio::test]
    async fn read_with_stale_reference_and_no_match_removes() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/gone".to_string(),
            ext_attrs: None,
            ext_attrs_all: Some(map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])),
        };

        let outcome = reconciler.read(&Context::new(), &prior).await.unwrap();

        assert_eq!(outcome, ReadOutcome::Removed);
        assert_eq!(api.list_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn read_with_stale_reference_and_one_match_populates_state() {
        let api = FakeApi::<Widget>::default();
        let mut object = widget("w1");
        object.extattrs = Some(to_wire(&map(&[
            (INTERNAL_ID_EXT_ATTR, "abc123"),
            ("Site", "DC1"),
        ])));
        api.insert("widget/current", object);

        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/old".to_string(),
            ext_attrs: Some(map(&[("Site", "DC1")])),
            ext_attrs_all: Some(map(&[(INTERNAL_ID_EXT_ATTR, "abc123"), ("Site", "DC1")])),
        };

        let outcome = reconciler.read(&Context::new(), &prior).await.unwrap();

        let ReadOutcome::Found(found) = outcome else {
            panic!("Expected object to be found");
        };
        assert_eq!(found.reference(), Some("widget/current"));
        assert_eq!(found.object.name, "w1");
    }

    #[tokio::test]
    async fn read_with_ambiguous_id_is_error() {
        let api = FakeApi::<Widget>::default();
        for reference in ["widget/a", "widget/b"] {
            let mut object = widget(reference);
            object.extattrs = Some(to_wire(&map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])));
            api.insert(reference, object);
        }

        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/gone".to_string(),
            ext_attrs: None,
            ext_attrs_all: Some(map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])),
        };

        let err = reconciler.read(&Context::new(), &prior).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Ambiguous { count: 2, .. }));
    }

    #[tokio::test]
    async fn read_detects_reference_reused_by_another_object() {
        let api = FakeApi::<Widget>::default();
        let mut impostor = widget("other");
        impostor.extattrs = Some(to_wire(&map(&[(INTERNAL_ID_EXT_ATTR, "other-id")])));
        api.insert("widget/shared", impostor);
        let mut ours = widget("ours");
        ours.extattrs = Some(to_wire(&map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])));
        api.insert("widget/moved", ours);

        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/shared".to_string(),
            ext_attrs: None,
            ext_attrs_all: Some(map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])),
        };

        let outcome = reconciler.read(&Context::new(), &prior).await.unwrap();

        let ReadOutcome::Found(found) = outcome else {
            panic!("Expected object to be recovered");
        };
        assert_eq!(found.object.name, "ours");
        assert_eq!(found.reference(), Some("widget/moved"));
    }

    #[tokio::test]
    async fn read_missing_object_without_id_removes_without_listing() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/gone".to_string(),
            ..Default::default()
        };

        let outcome = reconciler.read(&Context::new(), &prior).await.unwrap();

        assert_eq!(outcome, ReadOutcome::Removed);
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_preserves_inherited_and_internal_id() {
        let api = FakeApi::<Widget>::with_inherited(&[("Owner", "netops")]);
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(&Context::new(), widget("w1"), Some(map(&[("Site", "DC1")])))
            .await
            .unwrap();

        let updated = reconciler
            .update(
                &Context::new(),
                &prior_of(&created),
                widget("w1-renamed"),
                Some(map(&[("Site", "DC2")])),
                &ClearedFields::new(),
            )
            .await
            .unwrap();

        assert_eq!(updated.object.name, "w1-renamed");
        assert_eq!(updated.ext_attrs, Some(map(&[("Site", "DC2")])));
        assert_eq!(updated.ext_attrs_all["Owner"], "netops");
        assert_eq!(
            updated.ext_attrs_all[INTERNAL_ID_EXT_ATTR],
            created.ext_attrs_all[INTERNAL_ID_EXT_ATTR]
        );
    }

    #[tokio::test]
    async fn update_drops_attributes_removed_from_configuration() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(
                &Context::new(),
                widget("w1"),
                Some(map(&[("Site", "DC1"), ("Tier", "gold")])),
            )
            .await
            .unwrap();

        let updated = reconciler
            .update(
                &Context::new(),
                &prior_of(&created),
                widget("w1"),
                Some(map(&[("Site", "DC1")])),
                &ClearedFields::new(),
            )
            .await
            .unwrap();

        assert!(!updated.ext_attrs_all.contains_key("Tier"));
        assert!(updated.ext_attrs_all.contains_key(INTERNAL_ID_EXT_ATTR));
        assert_eq!(updated.ext_attrs, Some(map(&[("Site", "DC1")])));
    }

    #[tokio::test]
    async fn update_passes_cleared_fields_to_the_server() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(&Context::new(), widget("w1"), None)
            .await
            .unwrap();
        let mut cleared = ClearedFields::new();
        cleared.insert("comment".to_string(), serde_json::json!(""));

        reconciler
            .update(&Context::new(), &prior_of(&created), widget("w1"), None, &cleared)
            .await
            .unwrap();

        assert_eq!(*api.cleared.lock().unwrap(), vec![cleared]);
    }

    #[tokio::test]
    async fn delete_treats_missing_object_as_deleted() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);
        let created = reconciler
            .create(&Context::new(), widget("w1"), None)
            .await
            .unwrap();
        let reference = created.reference().unwrap().to_string();

        reconciler.delete(&Context::new(), &reference).await.unwrap();
        assert!(api.get(&reference).is_none());

        reconciler.delete(&Context::new(), &reference).await.unwrap();
    }

    #[tokio::test]
    async fn import_tags_untagged_object_with_local_attributes_only() {
        let api = FakeApi::<Widget>::with_inherited(&[("Owner", "netops")]);
        let mut object = widget("legacy");
        object.extattrs = Some(to_wire(&map(&[("Site", "DC1")])));
        api.store("widget/legacy", &object, None);

        let reconciler = Reconciler::new(&api);
        let imported = reconciler
            .import(&Context::new(), "widget/legacy")
            .await
            .unwrap();

        assert_eq!(imported.ext_attrs, Some(map(&[("Site", "DC1")])));
        assert!(imported.ext_attrs_all.contains_key(INTERNAL_ID_EXT_ATTR));
        assert_eq!(imported.ext_attrs_all["Owner"], "netops");

        let stored = api.get("widget/legacy").unwrap();
        let stored_attrs = stored.ext_attrs().unwrap();
        assert!(!stored_attrs["Site"].is_inherited());
        assert!(stored_attrs["Owner"].is_inherited());
        assert_eq!(api.updates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_of_tagged_object_does_not_write() {
        let api = FakeApi::<Widget>::default();
        let mut object = widget("tagged");
        object.extattrs = Some(to_wire(&map(&[(INTERNAL_ID_EXT_ATTR, "abc123")])));
        api.insert("widget/tagged", object);

        let reconciler = Reconciler::new(&api);
        let imported = reconciler
            .import(&Context::new(), "widget/tagged")
            .await
            .unwrap();

        assert_eq!(imported.ext_attrs, None);
        assert_eq!(imported.ext_attrs_all[INTERNAL_ID_EXT_ATTR], "abc123");
        assert!(api.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_of_missing_object_is_error() {
        let api = FakeApi::<Widget>::default();
        let reconciler = Reconciler::new(&api);

        let err = reconciler
            .import(&Context::new(), "widget/none")
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Api(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn types_without_ext_attrs_skip_bookkeeping() {
        let api = FakeApi::<Plain>::default();
        let reconciler = Reconciler::new(&api);

        let created = reconciler
            .create(
                &Context::new(),
                Plain {
                    reference: None,
                    name: "space".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        assert!(created.ext_attrs_all.is_empty());

        let reference = created.reference().unwrap().to_string();
        api.remove(&reference);
        let prior = PriorState {
            reference,
            ..Default::default()
        };

        let outcome = reconciler.read(&Context::new(), &prior).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Removed);
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn structured_server_value_fails_the_operation() {
        let api = FakeApi::<Widget>::default();
        let mut object = widget("odd");
        let mut ext_attrs = ExtAttrs::new();
        ext_attrs.insert(
            "Contacts".to_string(),
            ExtAttr::new(serde_json::json!(["a", "b"])),
        );
        object.extattrs = Some(ext_attrs);
        api.insert("widget/odd", object);

        let reconciler = Reconciler::new(&api);
        let prior = PriorState {
            reference: "widget/odd".to_string(),
            ..Default::default()
        };

        let err = reconciler.read(&Context::new(), &prior).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ExtAttrs(_)));
    }
}
