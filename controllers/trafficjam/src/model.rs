//! Resource model
//!
//! Static description of every TrafficJam resource kind: where it lives in the
//! API, which fields it accepts, which rules those fields obey and how each
//! desired state maps onto a request. The validator and the planner are generic
//! over these tables; nothing kind-specific lives outside this module.

use crate::descriptor::DesiredState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Path prefix of the TrafficJam REST API
pub const API_BASE_PATH: &str = "/trafficjam/api";

/// Field naming a subinterface instance
pub const SUBINTERFACE_ID: &str = "subinterface_id";

/// Field creating a subinterface (one per VLAN)
pub const VLAN_ID: &str = "vlan_id";

/// Kinds of TrafficJam resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Bridge interfaces, with VLAN subinterfaces
    Bridge,
    /// Host NICs; updated, never created
    Physical,
    /// Dummy interfaces
    Dummy,
    /// The single loopback interface
    Loopback,
    /// Virtual routing and forwarding tables
    Vrf,
    /// Read-only view across every interface kind
    #[serde(rename = "interfaces")]
    InterfaceCollection,
}

impl ResourceKind {
    /// Every kind, in declaration order
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Bridge,
        ResourceKind::Physical,
        ResourceKind::Dummy,
        ResourceKind::Loopback,
        ResourceKind::Vrf,
        ResourceKind::InterfaceCollection,
    ];

    /// Static model for the kind
    pub fn model(self) -> &'static ResourceModel {
        match self {
            ResourceKind::Bridge => &BRIDGE,
            ResourceKind::Physical => &PHYSICAL,
            ResourceKind::Dummy => &DUMMY,
            ResourceKind::Loopback => &LOOPBACK,
            ResourceKind::Vrf => &VRF,
            ResourceKind::InterfaceCollection => &INTERFACES,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model().label)
    }
}

/// JSON type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string
    Str,
    /// JSON integer
    Int,
}

impl FieldType {
    /// Whether `value` has this type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Str => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
        }
    }

    /// Article and type name, for messages
    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Str => "a string",
            FieldType::Int => "an integer",
        }
    }
}

/// A field the kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Descriptor field name
    pub name: &'static str,
    /// Required JSON type
    pub ty: FieldType,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec { name, ty: FieldType::Str }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec { name, ty: FieldType::Int }
}

/// A descriptor field copied into a request payload under `key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadField {
    /// Descriptor field name
    pub field: &'static str,
    /// Wire key
    pub key: &'static str,
}

const fn same(field: &'static str) -> PayloadField {
    PayloadField { field, key: field }
}

const fn renamed(field: &'static str, key: &'static str) -> PayloadField {
    PayloadField { field, key }
}

/// In `state`, at least one alternative must have every one of its fields set
#[derive(Debug, Clone, Copy)]
pub struct RequiredOneOf {
    /// State the rule applies to
    pub state: DesiredState,
    /// Field sets, any one of which satisfies the rule
    pub alternatives: &'static [&'static [&'static str]],
}

/// Consistency rules of one kind
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    /// Pairs that may not both be set
    pub mutually_exclusive: &'static [(&'static str, &'static str)],
    /// `(a, b)`: when `a` is set, `b` must be set too
    pub required_by: &'static [(&'static str, &'static str)],
    /// Applies to the kind itself, not to its subinterfaces
    pub required_one_of: &'static [RequiredOneOf],
}

/// Descriptor field compared against the `key` of existing entries before a POST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator {
    /// Descriptor field holding the value being created
    pub field: &'static str,
    /// Key of the same value in listed entries
    pub key: &'static str,
}

/// POST to the collection
#[derive(Debug, Clone, Copy)]
pub struct CreateSpec {
    /// Fields that must all be set to create
    pub key: &'static [&'static str],
    /// Fields sent with the POST
    pub payload: &'static [PayloadField],
    /// Duplicate check before the POST
    pub discriminator: Discriminator,
}

/// PUT to the instance
#[derive(Debug, Clone, Copy)]
pub struct UpdateSpec {
    /// Fields that must all be set to update, besides the instance id
    pub key: &'static [&'static str],
    /// Fields sent with the PUT
    pub payload: &'static [PayloadField],
}

/// Subinterfaces under `{parent_id}/subinterfaces`
///
/// Created by `vlan_id`, addressed by `subinterface_id`.
#[derive(Debug, Clone, Copy)]
pub struct ChildModel {
    /// Human-readable name, used in messages
    pub label: &'static str,
    /// Fields sent when creating by `vlan_id`
    pub create_payload: &'static [PayloadField],
    /// Fields sent when updating by `subinterface_id`
    pub update_payload: &'static [PayloadField],
}

impl ChildModel {
    /// Subinterfaces are unique per VLAN
    pub fn discriminator(&self) -> Discriminator {
        Discriminator { field: VLAN_ID, key: VLAN_ID }
    }
}

/// Everything the engine knows about one kind
#[derive(Debug)]
pub struct ResourceModel {
    /// Kind this model describes
    pub kind: ResourceKind,
    /// Human-readable name, used in messages
    pub label: &'static str,
    /// Collection path below [`API_BASE_PATH`]
    pub collection: &'static str,
    /// Field naming one instance; `None` for singletons and aggregates
    pub id_field: Option<&'static str>,
    /// Only `state: query` is allowed
    pub query_only: bool,
    /// Every accepted field
    pub fields: &'static [FieldSpec],
    pub rules: RuleSet,
    /// `None` when the kind cannot be created
    pub create: Option<CreateSpec>,
    pub update: Option<UpdateSpec>,
    /// Payload sent along with DELETE, if any
    pub delete_payload: Option<&'static [PayloadField]>,
    /// Child collection under each instance, if any
    pub subinterfaces: Option<ChildModel>,
}

impl ResourceModel {
    /// Declaration of a field, if the kind accepts it
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Loopback: one instance, addressed by the collection path itself
    pub fn is_singleton(&self) -> bool {
        self.id_field.is_none() && !self.query_only
    }

    /// Path of the collection, instance, child collection or child instance
    /// selected by `ids`, relative to [`API_BASE_PATH`]
    ///
    /// Without a parent id the collection is addressed, whatever `subinterface`
    /// says. The child segment is only appended for kinds with subinterfaces.
    pub fn resolve_path(&self, subinterface: bool, ids: &PathIds) -> String {
        let mut path = self.collection.to_string();
        if self.id_field.is_none() {
            return path;
        }

        let Some(parent) = &ids.parent else {
            return path;
        };
        path.push('/');
        path.push_str(parent);

        if subinterface && self.subinterfaces.is_some() {
            path.push_str("/subinterfaces");
            if let Some(child) = &ids.child {
                path.push('/');
                path.push_str(child);
            }
        }

        path
    }
}

/// Identifier path segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIds {
    /// Instance of the kind
    pub parent: Option<String>,
    /// Subinterface under the instance
    pub child: Option<String>,
}

impl PathIds {
    /// Render identifier values as path segments
    pub fn new(parent: Option<&Value>, child: Option<&Value>) -> Self {
        Self {
            parent: parent.map(segment),
            child: child.map(segment),
        }
    }
}

/// Render an identifier as a path segment (strings without quotes)
fn segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve the API path for a kind
pub fn resolve_path(kind: ResourceKind, subinterface: bool, ids: &PathIds) -> String {
    kind.model().resolve_path(subinterface, ids)
}

static BRIDGE: ResourceModel = ResourceModel {
    kind: ResourceKind::Bridge,
    label: "bridge interface",
    collection: "interfaces/bridges",
    id_field: Some("bridge_id"),
    query_only: false,
    fields: &[
        text("name"),
        text("description"),
        text("v4_address"),
        text("v6_address"),
        int("vrf_id"),
        int("interface_id"),
        int(SUBINTERFACE_ID),
        int("bridge_id"),
        int(VLAN_ID),
    ],
    rules: RuleSet {
        mutually_exclusive: &[
            ("name", "bridge_id"),
            ("name", VLAN_ID),
            ("interface_id", VLAN_ID),
            ("interface_id", SUBINTERFACE_ID),
            (VLAN_ID, SUBINTERFACE_ID),
        ],
        required_by: &[],
        required_one_of: &[
            RequiredOneOf {
                state: DesiredState::Present,
                alternatives: &[&["name"], &["bridge_id"]],
            },
            RequiredOneOf {
                state: DesiredState::Absent,
                alternatives: &[&["bridge_id"]],
            },
        ],
    },
    create: Some(CreateSpec {
        key: &["name"],
        payload: &[
            same("name"),
            same("description"),
            same("interface_id"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
        ],
        discriminator: Discriminator { field: "name", key: "name" },
    }),
    update: Some(UpdateSpec {
        key: &[],
        payload: &[
            same("description"),
            same("interface_id"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
        ],
    }),
    delete_payload: None,
    subinterfaces: Some(ChildModel {
        label: "bridge subinterface",
        create_payload: &[
            same("description"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
            same(VLAN_ID),
        ],
        update_payload: &[
            same("description"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
        ],
    }),
};

// Physical interfaces exist on the host: they are updated, never created.
static PHYSICAL: ResourceModel = ResourceModel {
    kind: ResourceKind::Physical,
    label: "physical interface",
    collection: "interfaces/physicals",
    id_field: Some("physical_id"),
    query_only: false,
    fields: &[
        text("description"),
        text("v4_address"),
        text("v6_address"),
        int("vrf_id"),
        int("physical_id"),
        int(SUBINTERFACE_ID),
        int("bridge_id"),
        int(VLAN_ID),
        int("mtu"),
    ],
    rules: RuleSet {
        mutually_exclusive: &[(SUBINTERFACE_ID, VLAN_ID)],
        required_by: &[],
        required_one_of: &[
            RequiredOneOf {
                state: DesiredState::Present,
                alternatives: &[&["physical_id"]],
            },
            RequiredOneOf {
                state: DesiredState::Absent,
                alternatives: &[&["physical_id"]],
            },
        ],
    },
    create: None,
    update: Some(UpdateSpec {
        key: &[],
        payload: PHYSICAL_PAYLOAD,
    }),
    delete_payload: Some(PHYSICAL_PAYLOAD),
    subinterfaces: Some(ChildModel {
        label: "physical subinterface",
        create_payload: &[
            same("description"),
            same("v4_address"),
            same("v6_address"),
            same("vrf_id"),
            same("bridge_id"),
            same(VLAN_ID),
        ],
        update_payload: &[
            same("description"),
            same("v4_address"),
            same("v6_address"),
            same("vrf_id"),
            same("bridge_id"),
        ],
    }),
};

const PHYSICAL_PAYLOAD: &[PayloadField] = &[
    same("description"),
    same("v4_address"),
    same("v6_address"),
    same("vrf_id"),
    same("bridge_id"),
    same("mtu"),
];

static DUMMY: ResourceModel = ResourceModel {
    kind: ResourceKind::Dummy,
    label: "dummy interface",
    collection: "interfaces/dummies",
    id_field: Some("dummy_id"),
    query_only: false,
    fields: &[
        text("name"),
        text("description"),
        text("v4_address"),
        text("v6_address"),
        int("vrf_id"),
        int("dummy_id"),
    ],
    rules: RuleSet {
        mutually_exclusive: &[("name", "dummy_id")],
        required_by: &[],
        required_one_of: &[
            RequiredOneOf {
                state: DesiredState::Present,
                alternatives: &[&["name"], &["dummy_id"]],
            },
            RequiredOneOf {
                state: DesiredState::Absent,
                alternatives: &[&["dummy_id"]],
            },
        ],
    },
    create: Some(CreateSpec {
        key: &["name"],
        payload: &[
            same("name"),
            same("description"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
        ],
        discriminator: Discriminator { field: "name", key: "name" },
    }),
    update: Some(UpdateSpec {
        key: &[],
        payload: &[
            same("description"),
            same("vrf_id"),
            same("v4_address"),
            same("v6_address"),
        ],
    }),
    delete_payload: None,
    subinterfaces: None,
};

const LOOPBACK_PAYLOAD: &[PayloadField] = &[
    same("description"),
    same("vrf_id"),
    same("v4_address"),
    same("v6_address"),
];

const LOOPBACK_ANY_FIELD: &[&[&str]] = &[&["description"], &["vrf_id"], &["v4_address"], &["v6_address"]];

static LOOPBACK: ResourceModel = ResourceModel {
    kind: ResourceKind::Loopback,
    label: "loopback interface",
    collection: "interfaces/loopback",
    id_field: None,
    query_only: false,
    fields: &[
        text("description"),
        text("v4_address"),
        text("v6_address"),
        int("vrf_id"),
    ],
    rules: RuleSet {
        mutually_exclusive: &[],
        required_by: &[],
        required_one_of: &[
            RequiredOneOf {
                state: DesiredState::Present,
                alternatives: LOOPBACK_ANY_FIELD,
            },
            RequiredOneOf {
                state: DesiredState::Absent,
                alternatives: LOOPBACK_ANY_FIELD,
            },
        ],
    },
    create: None,
    update: Some(UpdateSpec {
        key: &[],
        payload: LOOPBACK_PAYLOAD,
    }),
    delete_payload: Some(LOOPBACK_PAYLOAD),
    subinterfaces: None,
};

static VRF: ResourceModel = ResourceModel {
    kind: ResourceKind::Vrf,
    label: "vrf",
    collection: "vrfs",
    id_field: Some("vrf_id"),
    query_only: false,
    fields: &[
        text("vrf_name"),
        int("vrf_id"),
        int("vrf_table_id"),
        int("interface_id"),
    ],
    rules: RuleSet {
        mutually_exclusive: &[("vrf_name", "interface_id"), ("vrf_table_id", "interface_id")],
        required_by: &[("vrf_name", "vrf_table_id"), ("vrf_table_id", "vrf_name")],
        required_one_of: &[
            RequiredOneOf {
                state: DesiredState::Present,
                alternatives: &[&["vrf_name", "vrf_table_id"], &["vrf_id", "interface_id"]],
            },
            RequiredOneOf {
                state: DesiredState::Absent,
                alternatives: &[&["vrf_id"]],
            },
        ],
    },
    create: Some(CreateSpec {
        key: &["vrf_name", "vrf_table_id"],
        payload: &[renamed("vrf_name", "name"), renamed("vrf_table_id", "table")],
        discriminator: Discriminator { field: "vrf_name", key: "name" },
    }),
    // Binds the VRF to an interface
    update: Some(UpdateSpec {
        key: &["interface_id"],
        payload: &[same("interface_id")],
    }),
    delete_payload: None,
    subinterfaces: None,
};

static INTERFACES: ResourceModel = ResourceModel {
    kind: ResourceKind::InterfaceCollection,
    label: "interfaces",
    collection: "interfaces",
    id_field: None,
    query_only: true,
    fields: &[],
    rules: RuleSet {
        mutually_exclusive: &[],
        required_by: &[],
        required_one_of: &[],
    },
    create: None,
    update: None,
    delete_payload: None,
    subinterfaces: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(parent: Option<Value>, child: Option<Value>) -> PathIds {
        PathIds::new(parent.as_ref(), child.as_ref())
    }

    #[test]
    fn test_models_match_their_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.model().kind, kind);
        }
    }

    #[test]
    fn test_rule_fields_are_declared() {
        // Every field named by a rule, payload or discriminator must be legal for the kind
        for kind in ResourceKind::ALL {
            let model = kind.model();
            let rules = &model.rules;
            let mut named: Vec<&str> = Vec::new();
            for (a, b) in rules.mutually_exclusive.iter().chain(rules.required_by) {
                named.push(a);
                named.push(b);
            }
            for rule in rules.required_one_of {
                named.extend(rule.alternatives.iter().flat_map(|alt| alt.iter().copied()));
            }
            if let Some(create) = &model.create {
                named.extend(create.key);
                named.extend(create.payload.iter().map(|p| p.field));
                named.push(create.discriminator.field);
            }
            if let Some(update) = &model.update {
                named.extend(update.key);
                named.extend(update.payload.iter().map(|p| p.field));
            }
            if let Some(child) = &model.subinterfaces {
                named.extend(child.create_payload.iter().map(|p| p.field));
                named.extend(child.update_payload.iter().map(|p| p.field));
                named.push(SUBINTERFACE_ID);
            }
            named.extend(model.id_field);

            for name in named {
                assert!(model.field(name).is_some(), "{} uses undeclared field {}", kind, name);
            }
        }
    }

    #[test]
    fn test_resolve_bridge_paths() {
        let kind = ResourceKind::Bridge;
        assert_eq!(resolve_path(kind, false, &ids(None, None)), "interfaces/bridges");
        assert_eq!(resolve_path(kind, false, &ids(Some(json!(10)), None)), "interfaces/bridges/10");
        assert_eq!(
            resolve_path(kind, true, &ids(Some(json!(10)), None)),
            "interfaces/bridges/10/subinterfaces"
        );
        assert_eq!(
            resolve_path(kind, true, &ids(Some(json!(10)), Some(json!(20)))),
            "interfaces/bridges/10/subinterfaces/20"
        );
    }

    #[test]
    fn test_resolve_child_ignored_without_subinterfaces() {
        assert_eq!(
            resolve_path(ResourceKind::Dummy, true, &ids(Some(json!(3)), Some(json!(4)))),
            "interfaces/dummies/3"
        );
    }

    #[test]
    fn test_resolve_singleton_and_aggregate_ignore_ids() {
        let any = ids(Some(json!(1)), Some(json!(2)));
        assert_eq!(resolve_path(ResourceKind::Loopback, false, &any), "interfaces/loopback");
        assert_eq!(resolve_path(ResourceKind::InterfaceCollection, true, &any), "interfaces");
    }

    #[test]
    fn test_string_ids_are_not_quoted() {
        assert_eq!(
            resolve_path(ResourceKind::Vrf, false, &ids(Some(json!("7")), None)),
            "vrfs/7"
        );
    }

    #[test]
    fn test_kind_deserializes_from_selector() {
        let kind: ResourceKind = serde_json::from_value(json!("interfaces")).unwrap();
        assert_eq!(kind, ResourceKind::InterfaceCollection);
        let kind: ResourceKind = serde_json::from_value(json!("vrf")).unwrap();
        assert_eq!(kind, ResourceKind::Vrf);
    }

    #[test]
    fn test_only_loopback_is_singleton() {
        let singletons: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter(|k| k.model().is_singleton())
            .collect();
        assert_eq!(singletons, vec![ResourceKind::Loopback]);
    }
}
