//! Directory data model: selectors, facets, typed links, attribute updates
//! and the response shapes returned by the service.
//!
//! Reference: <https://docs.aws.amazon.com/clouddirectory/latest/APIReference/>

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Facet whose attributes are created immutable.
pub const GROUP_FACET: &str = "GROUP";

// ── Selectors ───────────────────────────────────────────────────────────

/// Reference to one object in the directory tree.
///
/// Either a `/`-delimited path such as `/users/alice`, or an object
/// identifier written as `$<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectSelector(String);

impl ObjectSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// The tree root.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Selector for an object identifier, e.g. one returned by a detach.
    pub fn identifier(id: &str) -> Self {
        Self(format!("${}", id))
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn is_identifier(&self) -> bool {
        self.0.starts_with('$')
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Selector of the child linked as `name` below this object.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self(format!("/{}", name))
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    /// Split a path selector into its parent and link name.
    ///
    /// `None` for the root, for identifiers and for relative paths.
    pub fn parent_and_name(&self) -> Option<(ObjectSelector, String)> {
        if self.is_identifier() || self.is_root() || !self.0.starts_with('/') {
            return None;
        }
        let idx = self.0.rfind('/')?;
        let name = &self.0[idx + 1..];
        if name.is_empty() {
            return None;
        }
        let parent = if idx == 0 {
            Self::root()
        } else {
            Self(self.0[..idx].to_string())
        };
        Some((parent, name.to_string()))
    }

    /// Every prefix of the path from the top: `/a/b/c` yields `/a`, `/a/b`,
    /// `/a/b/c`. Empty segments are skipped.
    pub fn prefixes(&self) -> Vec<ObjectSelector> {
        if self.is_identifier() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut current = Self::root();
        for segment in self.0.split('/').filter(|s| !s.is_empty()) {
            current = current.child(segment);
            out.push(current.clone());
        }
        out
    }
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectSelector {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl From<String> for ObjectSelector {
    fn from(selector: String) -> Self {
        Self(selector)
    }
}

// ── Facets ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequiredBehavior {
    RequiredAlways,
    NotRequired,
}

impl RequiredBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredAlways => "REQUIRED_ALWAYS",
            Self::NotRequired => "NOT_REQUIRED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    #[default]
    String,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
    pub required_behavior: RequiredBehavior,
}

/// Schema facet: a named attribute template for objects.
///
/// Attribute mutability is not part of the facet: attributes of
/// [`GROUP_FACET`] are always created immutable and all others mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub name: String,
    pub attributes: Vec<FacetAttribute>,
}

impl Facet {
    /// Build a facet of string attributes.
    pub fn with_attributes<'a, I>(name: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, RequiredBehavior)>,
    {
        Self {
            name: name.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(attr, required_behavior)| FacetAttribute {
                    name: attr.to_string(),
                    attribute_type: AttributeType::String,
                    required_behavior,
                })
                .collect(),
        }
    }
}

/// Typed link facet. The order of `identity_attribute_order` defines link
/// identity and is sent as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedLinkFacet {
    pub name: String,
    pub identity_attribute_order: Vec<String>,
}

impl TypedLinkFacet {
    pub fn new<S: AsRef<str>>(name: &str, identity_attribute_order: &[S]) -> Self {
        Self {
            name: name.to_string(),
            identity_attribute_order: identity_attribute_order
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
        }
    }
}

// ── Typed links ─────────────────────────────────────────────────────────

/// A typed link exactly as the service described it.
///
/// Specifiers are only ever obtained from list responses and echoed back
/// unchanged on detach; the wrapped document is never rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedLinkSpecifier(Value);

impl TypedLinkSpecifier {
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    pub fn facet_name(&self) -> Option<&str> {
        self.0["TypedLinkFacet"]["TypedLinkName"].as_str()
    }

    pub fn schema_arn(&self) -> Option<&str> {
        self.0["TypedLinkFacet"]["SchemaArn"].as_str()
    }

    pub fn source_selector(&self) -> Option<ObjectSelector> {
        self.0["SourceObjectReference"]["Selector"]
            .as_str()
            .map(ObjectSelector::from)
    }

    pub fn target_selector(&self) -> Option<ObjectSelector> {
        self.0["TargetObjectReference"]["Selector"]
            .as_str()
            .map(ObjectSelector::from)
    }

    /// Identity attribute name to string value.
    pub fn identity_attribute_values(&self) -> BTreeMap<String, String> {
        self.0["IdentityAttributeValues"]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|entry| {
                        let name = entry["AttributeName"].as_str()?;
                        let value = entry["Value"]["StringValue"].as_str()?;
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn identity_value(&self, attribute_name: &str) -> Option<String> {
        self.identity_attribute_values().remove(attribute_name)
    }

    /// Two specifiers denote the same link iff facet name and every identity
    /// attribute value match.
    pub fn is_same_link(&self, other: &TypedLinkSpecifier) -> bool {
        self.facet_name().is_some()
            && self.facet_name() == other.facet_name()
            && self.identity_attribute_values() == other.identity_attribute_values()
    }
}

// ── Attribute updates ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeAction {
    CreateOrUpdate,
    Delete,
}

impl AttributeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrUpdate => "CREATE_OR_UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Fully qualified attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeKey {
    #[serde(rename = "FacetName")]
    pub facet_name: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SchemaArn")]
    pub schema_arn: String,
}

impl AttributeKey {
    pub fn new(schema_arn: &str, facet_name: &str, name: &str) -> Self {
        Self {
            facet_name: facet_name.to_string(),
            name: name.to_string(),
            schema_arn: schema_arn.to_string(),
        }
    }
}

/// One attribute change. `value` is ignored for [`AttributeAction::Delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUpdate {
    pub action: AttributeAction,
    pub key: AttributeKey,
    pub value: Option<String>,
}

impl AttributeUpdate {
    pub fn set(key: AttributeKey, value: &str) -> Self {
        Self {
            action: AttributeAction::CreateOrUpdate,
            key,
            value: Some(value.to_string()),
        }
    }

    pub fn delete(key: AttributeKey) -> Self {
        Self {
            action: AttributeAction::Delete,
            key,
            value: None,
        }
    }

    /// One update per entry of `attributes`, all with the same action and
    /// facet.
    pub fn for_facet(
        action: AttributeAction,
        schema_arn: &str,
        facet_name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Vec<AttributeUpdate> {
        attributes
            .iter()
            .map(|(name, value)| AttributeUpdate {
                action,
                key: AttributeKey::new(schema_arn, facet_name, name),
                value: match action {
                    AttributeAction::CreateOrUpdate => Some(value.clone()),
                    AttributeAction::Delete => None,
                },
            })
            .collect()
    }
}

/// One entry of a batch write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BatchOperation {
    /// An update-object-attributes document, as built by
    /// [`crate::payload::update_object_attributes`].
    UpdateObjectAttributes(Value),
    DetachTypedLink {
        #[serde(rename = "TypedLinkSpecifier")]
        specifier: TypedLinkSpecifier,
    },
}

impl BatchOperation {
    pub fn update_object_attributes(selector: &ObjectSelector, updates: &[AttributeUpdate]) -> Self {
        Self::UpdateObjectAttributes(crate::payload::update_object_attributes(selector, updates))
    }

    pub fn detach_typed_link(specifier: TypedLinkSpecifier) -> Self {
        Self::DetachTypedLink { specifier }
    }
}

// ── Response shapes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryDescription {
    #[serde(rename = "DirectoryArn")]
    pub directory_arn: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "CreationDateTime", default)]
    pub creation_date_time: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypedAttributeValue {
    #[serde(rename = "StringValue", default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeKeyAndValue {
    #[serde(rename = "Key")]
    pub key: AttributeKey,
    #[serde(rename = "Value", default)]
    pub value: TypedAttributeValue,
}

impl AttributeKeyAndValue {
    pub fn string_value(&self) -> Option<&str> {
        self.value.string_value.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachedObject {
    #[serde(rename = "DetachedObjectIdentifier")]
    pub detached_object_identifier: String,
}

impl DetachedObject {
    /// Selector under which the detached object can still be deleted.
    pub fn selector(&self) -> ObjectSelector {
        ObjectSelector::identifier(&self.detached_object_identifier)
    }
}

/// One entry of a child listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectChild {
    pub link_name: String,
    pub object_identifier: String,
}

impl ObjectChild {
    /// Path selector of this child below `parent`.
    pub fn path_under(&self, parent: &ObjectSelector) -> ObjectSelector {
        parent.child(&self.link_name)
    }

    pub fn selector(&self) -> ObjectSelector {
        ObjectSelector::identifier(&self.object_identifier)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedObject {
    #[serde(rename = "ObjectIdentifier")]
    pub object_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFacetRef {
    #[serde(rename = "FacetName")]
    pub facet_name: String,
    #[serde(rename = "SchemaArn")]
    pub schema_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInformation {
    #[serde(rename = "ObjectIdentifier", default)]
    pub object_identifier: Option<String>,
    #[serde(rename = "SchemaFacets", default)]
    pub schema_facets: Vec<SchemaFacetRef>,
}

// ── List envelopes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DirectoryList {
    #[serde(rename = "Directories", default)]
    pub directories: Vec<DirectoryDescription>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChildrenList {
    #[serde(rename = "Children", default)]
    pub children: BTreeMap<String, String>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ObjectAttributeList {
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<AttributeKeyAndValue>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FacetAttributeList {
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<Value>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IncomingLinkList {
    #[serde(rename = "LinkSpecifiers", default)]
    pub link_specifiers: Vec<TypedLinkSpecifier>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OutgoingLinkList {
    #[serde(rename = "TypedLinkSpecifiers", default)]
    pub typed_link_specifiers: Vec<TypedLinkSpecifier>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}
