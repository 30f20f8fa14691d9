//! Parameter validation
//!
//! Checks a descriptor against its kind's rule table before any request is
//! made. Rules run in a fixed order and the first failure wins.

use crate::descriptor::{DesiredState, Fields, ResourceDescriptor};
use crate::error::ValidationError;
use crate::model::{ResourceModel, RuleSet, SUBINTERFACE_ID, VLAN_ID};

/// Validate a descriptor
///
/// Order: supported state, supported fields, field types, mutual exclusion,
/// required-by pairs, then either the subinterface dependencies or the kind's
/// required alternatives for the desired state.
pub fn validate(descriptor: &ResourceDescriptor) -> Result<(), ValidationError> {
    let model = descriptor.kind.model();
    let fields = &descriptor.fields;

    check_state(model, descriptor.desired_state)?;
    check_supported(model, fields)?;
    check_types(model, fields)?;
    check_mutually_exclusive(&model.rules, fields)?;
    check_required_by(&model.rules, fields)?;

    match (&model.subinterfaces, descriptor.subinterface, model.id_field) {
        (Some(_), true, Some(parent)) => check_subinterface(parent, descriptor.desired_state, fields),
        _ => check_required_one_of(&model.rules, descriptor.desired_state, fields),
    }
}

fn check_state(model: &ResourceModel, state: DesiredState) -> Result<(), ValidationError> {
    if model.query_only && state != DesiredState::Query {
        return Err(ValidationError::new(format!(
            "value of state must be one of: query, got: {}",
            state
        )));
    }
    Ok(())
}

fn check_supported(model: &ResourceModel, fields: &Fields) -> Result<(), ValidationError> {
    let unsupported: Vec<&str> = fields
        .keys()
        .filter(|name| model.field(name).is_none())
        .collect();

    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "unsupported parameter(s) for {}: {}",
            model.label,
            unsupported.join(", ")
        )))
    }
}

fn check_types(model: &ResourceModel, fields: &Fields) -> Result<(), ValidationError> {
    for (name, value) in fields.iter() {
        if let Some(spec) = model.field(name) {
            if !spec.ty.accepts(value) {
                return Err(ValidationError::new(format!(
                    "parameter {} must be {}",
                    name,
                    spec.ty.describe()
                )));
            }
        }
    }
    Ok(())
}

fn check_mutually_exclusive(rules: &RuleSet, fields: &Fields) -> Result<(), ValidationError> {
    for (a, b) in rules.mutually_exclusive {
        if fields.has(a) && fields.has(b) {
            return Err(ValidationError::new(format!(
                "parameter {} is mutually exclusive with {}",
                a, b
            )));
        }
    }
    Ok(())
}

fn check_required_by(rules: &RuleSet, fields: &Fields) -> Result<(), ValidationError> {
    for (field, required) in rules.required_by {
        if fields.has(field) && !fields.has(required) {
            return Err(ValidationError::new(format!(
                "missing parameter(s) required by '{}': {}",
                field, required
            )));
        }
    }
    Ok(())
}

fn check_required_one_of(
    rules: &RuleSet,
    state: DesiredState,
    fields: &Fields,
) -> Result<(), ValidationError> {
    for rule in rules.required_one_of.iter().filter(|r| r.state == state) {
        let satisfied = rule
            .alternatives
            .iter()
            .any(|alt| alt.iter().all(|name| fields.has(name)));

        if !satisfied {
            let wanted: Vec<String> = rule.alternatives.iter().map(|alt| alt.join(",")).collect();
            return Err(ValidationError::new(format!(
                "missing parameter(s) required: {}",
                wanted.join("|")
            )));
        }
    }
    Ok(())
}

fn check_subinterface(
    parent: &str,
    state: DesiredState,
    fields: &Fields,
) -> Result<(), ValidationError> {
    let has_parent = fields.has(parent);
    let has_vlan = fields.has(VLAN_ID);
    let has_sub = fields.has(SUBINTERFACE_ID);

    let ok = match state {
        DesiredState::Query => has_parent,
        DesiredState::Present => has_parent && (has_vlan != has_sub),
        DesiredState::Absent => has_parent && has_sub,
    };
    if ok {
        return Ok(());
    }

    let wanted = match state {
        DesiredState::Query => parent.to_string(),
        DesiredState::Present => format!("{parent}|{VLAN_ID} or {parent}|{SUBINTERFACE_ID}"),
        DesiredState::Absent => format!("{parent}|{SUBINTERFACE_ID}"),
    };
    Err(ValidationError::new(format!(
        "missing parameter(s) required by 'subinterface': {}",
        wanted
    )))
}
