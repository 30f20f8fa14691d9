//! Request planning
//!
//! Maps a validated descriptor to exactly one HTTP request. Identifier-based
//! addressing (PUT/DELETE on an instance) always wins over creation (POST on the
//! collection), so an update is never turned into a duplicate create.

use crate::descriptor::{DesiredState, Fields, ResourceDescriptor};
use crate::error::ReconcileError;
use crate::model::{Discriminator, PathIds, PayloadField, ResourceModel, SUBINTERFACE_ID, VLAN_ID};
use serde::Serialize;
use serde_json::Value;
use trafficjam_client::{HttpMethod, Payload};

/// One concrete request against the TrafficJam API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPlan {
    pub method: HttpMethod,
    /// Absolute URL of the collection or instance
    pub url: String,
    /// Only fields that carry a value; `None` rather than an empty map
    pub payload: Option<Payload>,
    /// Duplicate scan to run first; set exactly for POST plans
    #[serde(skip)]
    pub existence_check: Option<ExistenceCheck>,
}

impl RequestPlan {
    fn new(method: HttpMethod, url: String, payload: Option<Payload>) -> Self {
        Self {
            method,
            url,
            payload,
            existence_check: None,
        }
    }

    /// Wire keys of the payload, sorted
    pub fn payload_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .payload
            .iter()
            .flat_map(|p| p.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// Collection to list and entry key/value that would make a POST a duplicate
#[derive(Debug, Clone, PartialEq)]
pub struct ExistenceCheck {
    /// Collection to list
    pub url: String,
    /// Key compared in each listed entry
    pub key: &'static str,
    /// Value about to be created
    pub value: Value,
    /// What is being created, for messages
    pub label: &'static str,
}

/// Plan the request for a descriptor that passed validation
///
/// Returns `NoMatchingRule` when no branch applies: that is a gap in the
/// validation rules, not a user error.
pub fn plan(descriptor: &ResourceDescriptor) -> Result<RequestPlan, ReconcileError> {
    let model = descriptor.kind.model();
    let planner = Planner {
        model,
        fields: &descriptor.fields,
        api_url: descriptor.connection.api_url(),
    };

    let plan = if descriptor.targets_subinterface() {
        planner.subinterface(descriptor.desired_state)
    } else {
        planner.resource(descriptor.desired_state)
    };

    plan.ok_or(ReconcileError::NoMatchingRule {
        kind: descriptor.kind,
        state: descriptor.desired_state,
        subinterface: descriptor.subinterface,
    })
}

struct Planner<'a> {
    model: &'static ResourceModel,
    fields: &'a Fields,
    api_url: String,
}

impl Planner<'_> {
    fn url(&self, subinterface: bool, ids: &PathIds) -> String {
        format!("{}/{}", self.api_url, self.model.resolve_path(subinterface, ids))
    }

    fn id(&self) -> Option<&Value> {
        self.model.id_field.and_then(|f| self.fields.get(f))
    }

    fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.fields.has(name))
    }

    fn existence_check(&self, url: &str, label: &'static str, discriminator: Discriminator) -> Option<ExistenceCheck> {
        let value = self.fields.get(discriminator.field)?;
        Some(ExistenceCheck {
            url: url.to_string(),
            key: discriminator.key,
            value: value.clone(),
            label,
        })
    }

    /// The kind itself: collection, instance or singleton
    fn resource(&self, state: DesiredState) -> Option<RequestPlan> {
        let model = self.model;
        let id = self.id();
        let collection_url = self.url(false, &PathIds::default());

        // Singletons have no id; their "instance" is the collection path
        let instance_url = if model.is_singleton() {
            Some(collection_url.clone())
        } else {
            id.map(|id| self.url(false, &PathIds::new(Some(id), None)))
        };

        match state {
            DesiredState::Query => {
                let url = instance_url.unwrap_or(collection_url);
                Some(RequestPlan::new(HttpMethod::Get, url, None))
            }
            DesiredState::Present => {
                if let (Some(update), Some(url)) = (&model.update, &instance_url) {
                    if self.has_all(update.key) {
                        let payload = build_payload(self.fields, update.payload);
                        return Some(RequestPlan::new(HttpMethod::Put, url.clone(), payload));
                    }
                }

                let create = model.create.as_ref()?;
                if !self.has_all(create.key) {
                    return None;
                }
                let payload = build_payload(self.fields, create.payload);
                let mut plan = RequestPlan::new(HttpMethod::Post, collection_url, payload);
                plan.existence_check = self.existence_check(&plan.url, model.label, create.discriminator);
                Some(plan)
            }
            DesiredState::Absent => {
                let url = instance_url?;
                let payload = model
                    .delete_payload
                    .and_then(|fields| build_payload(self.fields, fields));
                Some(RequestPlan::new(HttpMethod::Delete, url, payload))
            }
        }
    }

    /// Subinterfaces below a parent instance
    fn subinterface(&self, state: DesiredState) -> Option<RequestPlan> {
        let child = self.model.subinterfaces.as_ref()?;
        let parent = self.id()?;
        let sub_id = self.fields.get(SUBINTERFACE_ID);

        let collection_url = self.url(true, &PathIds::new(Some(parent), None));
        let instance_url = sub_id.map(|sub| self.url(true, &PathIds::new(Some(parent), Some(sub))));

        match state {
            DesiredState::Query => {
                let url = instance_url.unwrap_or(collection_url);
                Some(RequestPlan::new(HttpMethod::Get, url, None))
            }
            DesiredState::Present => {
                if let Some(url) = instance_url {
                    let payload = build_payload(self.fields, child.update_payload);
                    return Some(RequestPlan::new(HttpMethod::Put, url, payload));
                }

                if !self.fields.has(VLAN_ID) {
                    return None;
                }
                let payload = build_payload(self.fields, child.create_payload);
                let mut plan = RequestPlan::new(HttpMethod::Post, collection_url, payload);
                plan.existence_check = self.existence_check(&plan.url, child.label, child.discriminator());
                Some(plan)
            }
            DesiredState::Absent => {
                let url = instance_url?;
                Some(RequestPlan::new(HttpMethod::Delete, url, None))
            }
        }
    }
}

/// Copy the set fields into a payload under their wire keys
fn build_payload(fields: &Fields, spec: &[PayloadField]) -> Option<Payload> {
    let payload: Payload = spec
        .iter()
        .filter_map(|p| fields.get(p.field).map(|v| (p.key.to_string(), v.clone())))
        .collect();

    if payload.is_empty() { None } else { Some(payload) }
}
