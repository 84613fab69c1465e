//! Request documents for every directory operation.
//!
//! Each builder is a pure function from typed inputs to a JSON document that
//! is serialized once when the request is signed. Key order inside objects is
//! irrelevant to the service; array order (attribute lists, identity order,
//! batch entries) is preserved as given.

use crate::model::{
    AttributeAction, AttributeUpdate, BatchOperation, Facet, ObjectSelector, TypedLinkFacet,
    TypedLinkSpecifier, GROUP_FACET,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Page size for directory, child and object attribute listings.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Page size for facet attribute listings.
pub const FACET_ATTRIBUTES_PAGE_SIZE: u32 = 100;

fn object_reference(selector: &ObjectSelector) -> Value {
    json!({ "Selector": selector.path() })
}

fn with_token(mut payload: Value, next_token: Option<&str>) -> Value {
    if let Some(token) = next_token.filter(|t| !t.is_empty()) {
        payload["NextToken"] = Value::String(token.to_string());
    }
    payload
}

// ── Read operations ─────────────────────────────────────────────────────

pub fn list_directories(next_token: Option<&str>) -> Value {
    with_token(
        json!({ "MaxResults": DEFAULT_PAGE_SIZE, "state": "ENABLED" }),
        next_token,
    )
}

pub fn list_object_children(selector: &ObjectSelector, next_token: Option<&str>) -> Value {
    with_token(
        json!({
            "MaxResults": DEFAULT_PAGE_SIZE,
            "ObjectReference": object_reference(selector),
        }),
        next_token,
    )
}

pub fn list_object_attributes(
    schema_arn: &str,
    facet_name: &str,
    selector: &ObjectSelector,
    next_token: Option<&str>,
) -> Value {
    with_token(
        json!({
            "FacetFilter": { "FacetName": facet_name, "SchemaArn": schema_arn },
            "MaxResults": DEFAULT_PAGE_SIZE,
            "ObjectReference": object_reference(selector),
        }),
        next_token,
    )
}

pub fn list_facet_attributes(facet_name: &str, next_token: Option<&str>) -> Value {
    with_token(
        json!({ "MaxResults": FACET_ATTRIBUTES_PAGE_SIZE, "Name": facet_name }),
        next_token,
    )
}

/// Shared by incoming and outgoing typed link listings.
pub fn list_typed_links(
    schema_arn: &str,
    facet_name: Option<&str>,
    selector: &ObjectSelector,
    next_token: Option<&str>,
) -> Value {
    let mut payload = json!({ "ObjectReference": object_reference(selector) });
    if let Some(name) = facet_name.filter(|n| !n.is_empty()) {
        payload["FilterTypedLink"] = json!({ "SchemaArn": schema_arn, "TypedLinkName": name });
    }
    with_token(payload, next_token)
}

pub fn get_object_information(selector: &ObjectSelector) -> Value {
    json!({ "ObjectReference": object_reference(selector) })
}

/// Payload of both facet lookups: `{"Name": ...}`.
pub fn named(name: &str) -> Value {
    json!({ "Name": name })
}

// ── Schema operations ───────────────────────────────────────────────────

/// Attributes are immutable on the group facet and mutable everywhere else.
pub fn create_facet(facet: &Facet) -> Value {
    let immutable = facet.name == GROUP_FACET;
    let attributes: Vec<Value> = facet
        .attributes
        .iter()
        .map(|attr| {
            json!({
                "AttributeDefinition": {
                    "IsImmutable": immutable,
                    "Type": attr.attribute_type.as_str(),
                },
                "Name": attr.name,
                "RequiredBehavior": attr.required_behavior.as_str(),
            })
        })
        .collect();
    json!({ "Attributes": attributes, "Name": facet.name, "ObjectType": "NODE" })
}

/// Add (or redefine) optional string attributes on an existing facet.
pub fn update_facet<S: AsRef<str>>(facet_name: &str, attribute_names: &[S]) -> Value {
    let updates: Vec<Value> = attribute_names
        .iter()
        .map(|name| {
            json!({
                "Action": AttributeAction::CreateOrUpdate.as_str(),
                "Attribute": {
                    "AttributeDefinition": { "Type": "STRING" },
                    "Name": name.as_ref(),
                    "RequiredBehavior": "NOT_REQUIRED",
                },
            })
        })
        .collect();
    json!({ "AttributeUpdates": updates, "Name": facet_name })
}

pub fn create_typed_link_facet(facet: &TypedLinkFacet) -> Value {
    let attributes: Vec<Value> = facet
        .identity_attribute_order
        .iter()
        .map(|name| json!({ "Name": name, "RequiredBehavior": "REQUIRED_ALWAYS", "Type": "STRING" }))
        .collect();
    json!({
        "Facet": {
            "Attributes": attributes,
            "IdentityAttributeOrder": facet.identity_attribute_order,
            "Name": facet.name,
        }
    })
}

// ── Object and link mutations ───────────────────────────────────────────

pub fn create_object(
    schema_arn: &str,
    link_name: &str,
    facet_name: &str,
    parent: &ObjectSelector,
    attributes: &BTreeMap<String, String>,
) -> Value {
    let attribute_list: Vec<Value> = attributes
        .iter()
        .map(|(name, value)| {
            json!({
                "Key": { "FacetName": facet_name, "Name": name, "SchemaArn": schema_arn },
                "Value": { "StringValue": value },
            })
        })
        .collect();
    json!({
        "LinkName": link_name,
        "ObjectAttributeList": attribute_list,
        "ParentReference": object_reference(parent),
        "SchemaFacets": [{ "FacetName": facet_name, "SchemaArn": schema_arn }],
    })
}

pub fn attach_typed_link(
    schema_arn: &str,
    source: &ObjectSelector,
    target: &ObjectSelector,
    facet_name: &str,
    attributes: &BTreeMap<String, String>,
) -> Value {
    let attribute_list: Vec<Value> = attributes
        .iter()
        .map(|(name, value)| json!({ "AttributeName": name, "Value": { "StringValue": value } }))
        .collect();
    json!({
        "Attributes": attribute_list,
        "SourceObjectReference": object_reference(source),
        "TargetObjectReference": object_reference(target),
        "TypedLinkFacet": { "SchemaArn": schema_arn, "TypedLinkName": facet_name },
    })
}

pub fn detach_typed_link(specifier: &TypedLinkSpecifier) -> Value {
    json!({ "TypedLinkSpecifier": specifier.as_json() })
}

pub fn update_object_attributes(selector: &ObjectSelector, updates: &[AttributeUpdate]) -> Value {
    let entries: Vec<Value> = updates
        .iter()
        .map(|update| {
            let mut action = Map::new();
            action.insert(
                "ObjectAttributeActionType".to_string(),
                Value::String(update.action.as_str().to_string()),
            );
            if let (AttributeAction::CreateOrUpdate, Some(value)) = (update.action, &update.value) {
                action.insert(
                    "ObjectAttributeUpdateValue".to_string(),
                    json!({ "StringValue": value }),
                );
            }
            json!({
                "ObjectAttributeAction": Value::Object(action),
                "ObjectAttributeKey": update.key,
            })
        })
        .collect();
    json!({ "AttributeUpdates": entries, "ObjectReference": object_reference(selector) })
}

pub fn detach_object(link_name: &str, parent: &ObjectSelector) -> Value {
    json!({ "LinkName": link_name, "ParentReference": object_reference(parent) })
}

pub fn delete_object(selector: &ObjectSelector) -> Value {
    json!({ "ObjectReference": object_reference(selector) })
}

pub fn batch_write(operations: &[BatchOperation]) -> Value {
    json!({ "Operations": operations })
}
