//! Cloud Directory REST client with SigV4 signing.
//!
//! Every operation follows the same single-shot lifecycle: build the payload,
//! sign it, perform one HTTP exchange, then map status 200 to a parsed body
//! and anything else to [`DirectoryError::RemoteRejection`]. There is no
//! retry, caching or shared mutable state; concurrent calls are independent.

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{
    AttributeAction, AttributeKeyAndValue, AttributeUpdate, BatchOperation, ChildrenList,
    CreatedObject, DetachedObject, DirectoryDescription, DirectoryList, Facet, FacetAttributeList,
    IncomingLinkList, ObjectAttributeList, ObjectChild, ObjectInformation, ObjectSelector,
    OutgoingLinkList, TypedLinkFacet, TypedLinkSpecifier,
};
use crate::operation::{
    Operation, Partition, CONSISTENCY_LEVEL_HEADER, HOST_HEADER, PARTITION_HEADER, SERIALIZABLE,
};
use crate::pagination::Page;
use crate::payload;
use crate::signing::SigV4Signer;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw outcome of one exchange, before status mapping.
#[derive(Debug, Clone)]
pub struct DirectoryResponse {
    pub status: u16,
    pub body: String,
    pub request_id: Option<String>,
}

/// Client bound to one directory and one schema.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// HTTP client.
    http: Client,
    config: DirectoryConfig,
    signer: SigV4Signer,
    /// Signed `host` header value.
    host: String,
    /// Scheme and authority requests go to.
    endpoint: String,
    /// `/amazonclouddirectory/<api_version>`.
    base_uri: String,
    user_agent: String,
}

#[derive(Debug, Default, Deserialize)]
struct AttachedTypedLink {
    #[serde(rename = "TypedLinkSpecifier", default)]
    typed_link_specifier: Option<TypedLinkSpecifier>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchWriteOutput {
    #[serde(rename = "Responses", default)]
    responses: Vec<Value>,
}

impl DirectoryClient {
    /// Validate `config` and build a client with its timeouts.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DirectoryError::config(format!("failed to build HTTP client: {}", e)))?;
        Self::with_http_client(config, http)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(config: DirectoryConfig, http: Client) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self {
            http,
            signer: SigV4Signer::new(config.credential()),
            host: config.host(),
            endpoint: config.endpoint(),
            base_uri: config.base_uri(),
            config,
            user_agent: format!("sorng-clouddirectory/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn directory_arn(&self) -> &str {
        &self.config.directory_arn
    }

    pub fn schema_arn(&self) -> &str {
        &self.config.schema_arn
    }

    fn partition_value(&self, partition: Partition) -> Option<&str> {
        match partition {
            Partition::None => None,
            Partition::Directory => Some(&self.config.directory_arn),
            Partition::Schema => Some(&self.config.schema_arn),
        }
    }

    /// Headers that are both signed and sent for `operation`.
    fn signed_headers(&self, operation: Operation) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(HOST_HEADER.to_string(), self.host.clone());
        if let Some(arn) = self.partition_value(operation.partition()) {
            headers.insert(PARTITION_HEADER.to_string(), arn.to_string());
        }
        if operation.is_serializable() {
            headers.insert(CONSISTENCY_LEVEL_HEADER.to_string(), SERIALIZABLE.to_string());
        }
        headers
    }

    /// Sign and send one request. The response is returned whatever its
    /// status; only transport failures are errors here.
    pub async fn send(
        &self,
        operation: Operation,
        payload: &Value,
    ) -> DirectoryResult<DirectoryResponse> {
        let body = serde_json::to_string(payload)?;
        let uri = format!("{}{}", self.base_uri, operation.path());
        let method = operation.method();
        let headers = self.signed_headers(operation);
        let signed = self
            .signer
            .sign(method.as_str(), &uri, &BTreeMap::new(), &headers, &body)?;

        log::debug!("{} {} {} payload: {}", operation, method, uri, body);

        let url = format!("{}{}", self.endpoint, uri);
        let mut req = self.http.request(method, &url);

        // Add signed headers
        for (key, value) in &headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in signed.pairs() {
            req = req.header(key, value);
        }
        req = req.header("user-agent", &self.user_agent);

        let resp = req.body(body).send().await.map_err(DirectoryError::from)?;

        let status = resp.status().as_u16();
        let request_id = resp
            .headers()
            .get("x-amzn-requestid")
            .or_else(|| resp.headers().get("x-amz-request-id"))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let resp_body = resp.text().await.map_err(|e| DirectoryError::Transport {
            status: Some(status),
            message: e.to_string(),
        })?;

        log::debug!(
            "{} answered HTTP {} (request id {:?})",
            operation,
            status,
            request_id
        );

        Ok(DirectoryResponse {
            status,
            body: resp_body,
            request_id,
        })
    }

    /// Send and require status 200.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        payload: &Value,
    ) -> DirectoryResult<T> {
        let response = self.send(operation, payload).await?;
        if response.status != 200 {
            log::error!(
                "{} rejected with HTTP {}: {}",
                operation,
                response.status,
                response.body
            );
            return Err(
                DirectoryError::rejection(operation.name(), response.status, response.body)
                    .with_request_id(response.request_id),
            );
        }
        decode(operation, &response)
    }

    /// Existence lookup. A non-200 reads as absent, except throttling and
    /// server errors, which say nothing about existence and are returned as
    /// [`DirectoryError::RemoteRejection`].
    async fn probe<T: DeserializeOwned>(
        &self,
        operation: Operation,
        payload: &Value,
    ) -> DirectoryResult<Option<T>> {
        let response = self.send(operation, payload).await?;
        if response.status == 200 {
            return decode(operation, &response).map(Some);
        }
        let err = DirectoryError::rejection(operation.name(), response.status, response.body)
            .with_request_id(response.request_id);
        if err.is_retryable() {
            log::error!("{} lookup failed: {}", operation, err);
            return Err(err);
        }
        log::debug!("{} found nothing: {}", operation, err);
        Ok(None)
    }

    // ── Listings ────────────────────────────────────────────────────────

    pub async fn list_directories(
        &self,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<DirectoryDescription>> {
        let list: DirectoryList = self
            .call(Operation::ListDirectories, &payload::list_directories(next_token))
            .await?;
        Ok(Page::new(list.directories, list.next_token))
    }

    pub async fn list_object_children(
        &self,
        selector: &ObjectSelector,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<ObjectChild>> {
        let list: ChildrenList = self
            .call(
                Operation::ListObjectChildren,
                &payload::list_object_children(selector, next_token),
            )
            .await?;
        let children = list
            .children
            .into_iter()
            .map(|(link_name, object_identifier)| ObjectChild {
                link_name,
                object_identifier,
            })
            .collect();
        Ok(Page::new(children, list.next_token))
    }

    pub async fn list_object_attributes(
        &self,
        facet_name: &str,
        selector: &ObjectSelector,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<AttributeKeyAndValue>> {
        let list: ObjectAttributeList = self
            .call(
                Operation::ListObjectAttributes,
                &payload::list_object_attributes(self.schema_arn(), facet_name, selector, next_token),
            )
            .await?;
        Ok(Page::new(list.attributes, list.next_token))
    }

    /// Attribute definitions of a facet, as returned by the service.
    pub async fn list_facet_attributes(
        &self,
        facet_name: &str,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<Value>> {
        let list: FacetAttributeList = self
            .call(
                Operation::ListFacetAttributes,
                &payload::list_facet_attributes(facet_name, next_token),
            )
            .await?;
        Ok(Page::new(list.attributes, list.next_token))
    }

    pub async fn list_incoming_typed_links(
        &self,
        facet_name: Option<&str>,
        selector: &ObjectSelector,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<TypedLinkSpecifier>> {
        let list: IncomingLinkList = self
            .call(
                Operation::ListIncomingTypedLinks,
                &payload::list_typed_links(self.schema_arn(), facet_name, selector, next_token),
            )
            .await?;
        Ok(Page::new(list.link_specifiers, list.next_token))
    }

    pub async fn list_outgoing_typed_links(
        &self,
        facet_name: Option<&str>,
        selector: &ObjectSelector,
        next_token: Option<&str>,
    ) -> DirectoryResult<Page<TypedLinkSpecifier>> {
        let list: OutgoingLinkList = self
            .call(
                Operation::ListOutgoingTypedLinks,
                &payload::list_typed_links(self.schema_arn(), facet_name, selector, next_token),
            )
            .await?;
        Ok(Page::new(list.typed_link_specifiers, list.next_token))
    }

    // ── Probes ──────────────────────────────────────────────────────────

    /// `None` when the object does not exist or the lookup was refused.
    pub async fn get_object_information(
        &self,
        selector: &ObjectSelector,
    ) -> DirectoryResult<Option<ObjectInformation>> {
        self.probe(
            Operation::GetObjectInformation,
            &payload::get_object_information(selector),
        )
        .await
    }

    pub async fn get_facet(&self, facet_name: &str) -> DirectoryResult<Option<Value>> {
        self.probe(Operation::GetFacet, &payload::named(facet_name))
            .await
    }

    pub async fn get_typed_link_facet_information(
        &self,
        name: &str,
    ) -> DirectoryResult<Option<Value>> {
        self.probe(Operation::GetTypedLinkFacetInformation, &payload::named(name))
            .await
    }

    // ── Schema ──────────────────────────────────────────────────────────

    pub async fn create_facet(&self, facet: &Facet) -> DirectoryResult<()> {
        let _: Value = self
            .call(Operation::CreateFacet, &payload::create_facet(facet))
            .await?;
        log::debug!("Created facet {}", facet.name);
        Ok(())
    }

    pub async fn update_facet<S: AsRef<str>>(
        &self,
        facet_name: &str,
        attribute_names: &[S],
    ) -> DirectoryResult<()> {
        let _: Value = self
            .call(
                Operation::UpdateFacet,
                &payload::update_facet(facet_name, attribute_names),
            )
            .await?;
        Ok(())
    }

    pub async fn create_typed_link_facet(&self, facet: &TypedLinkFacet) -> DirectoryResult<()> {
        let _: Value = self
            .call(
                Operation::CreateTypedLinkFacet,
                &payload::create_typed_link_facet(facet),
            )
            .await?;
        log::debug!("Created typed link facet {}", facet.name);
        Ok(())
    }

    // ── Objects ─────────────────────────────────────────────────────────

    /// Create an object with one facet and link it below `parent`.
    pub async fn create_object(
        &self,
        link_name: &str,
        facet_name: &str,
        parent: &ObjectSelector,
        attributes: &BTreeMap<String, String>,
    ) -> DirectoryResult<CreatedObject> {
        self.call(
            Operation::CreateObject,
            &payload::create_object(self.schema_arn(), link_name, facet_name, parent, attributes),
        )
        .await
    }

    /// Apply `action` to every attribute of `attributes` under one facet.
    pub async fn update_object_attributes(
        &self,
        action: AttributeAction,
        facet_name: &str,
        selector: &ObjectSelector,
        attributes: &BTreeMap<String, String>,
    ) -> DirectoryResult<()> {
        let updates = AttributeUpdate::for_facet(action, self.schema_arn(), facet_name, attributes);
        self.apply_attribute_updates(selector, &updates).await
    }

    pub async fn apply_attribute_updates(
        &self,
        selector: &ObjectSelector,
        updates: &[AttributeUpdate],
    ) -> DirectoryResult<()> {
        let _: Value = self
            .call(
                Operation::UpdateObjectAttributes,
                &payload::update_object_attributes(selector, updates),
            )
            .await?;
        Ok(())
    }

    /// Unlink `link_name` from `parent`. The returned identifier is the only
    /// way to reach the object afterwards; pass [`DetachedObject::selector`]
    /// to [`Self::delete_object`].
    pub async fn detach_object(
        &self,
        link_name: &str,
        parent: &ObjectSelector,
    ) -> DirectoryResult<DetachedObject> {
        self.call(
            Operation::DetachObject,
            &payload::detach_object(link_name, parent),
        )
        .await
    }

    /// Delete a detached object.
    ///
    /// `selector` must be the `$id` selector of an object that is already
    /// detached; the service refuses to delete objects still linked into the
    /// tree, and path selectors are passed through unchanged.
    pub async fn delete_object(&self, selector: &ObjectSelector) -> DirectoryResult<()> {
        if !selector.is_identifier() {
            log::debug!("Deleting by path selector {}", selector);
        }
        let _: Value = self
            .call(Operation::DeleteObject, &payload::delete_object(selector))
            .await?;
        Ok(())
    }

    // ── Typed links ─────────────────────────────────────────────────────

    /// Link `source` to `target`. Returns the specifier the service assigned,
    /// when it reported one.
    pub async fn attach_typed_link(
        &self,
        source: &ObjectSelector,
        target: &ObjectSelector,
        facet_name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> DirectoryResult<Option<TypedLinkSpecifier>> {
        let attached: AttachedTypedLink = self
            .call(
                Operation::AttachTypedLink,
                &payload::attach_typed_link(self.schema_arn(), source, target, facet_name, attributes),
            )
            .await?;
        Ok(attached.typed_link_specifier)
    }

    /// Remove a typed link. `specifier` must come from a listing.
    pub async fn detach_typed_link(&self, specifier: &TypedLinkSpecifier) -> DirectoryResult<()> {
        let _: Value = self
            .call(
                Operation::DetachTypedLink,
                &payload::detach_typed_link(specifier),
            )
            .await?;
        Ok(())
    }

    // ── Batch ───────────────────────────────────────────────────────────

    /// Send all `operations` in one exchange and return the per-entry
    /// responses. Entries are applied independently by the service; a
    /// failure part way through is not rolled back.
    pub async fn batch_write(&self, operations: &[BatchOperation]) -> DirectoryResult<Vec<Value>> {
        log::debug!("Batch write of {} operations", operations.len());
        let output: BatchWriteOutput = self
            .call(Operation::BatchWrite, &payload::batch_write(operations))
            .await?;
        Ok(output.responses)
    }
}

/// Parse a 200 body. An empty body reads as `{}`.
fn decode<T: DeserializeOwned>(
    operation: Operation,
    response: &DirectoryResponse,
) -> DirectoryResult<T> {
    let text = if response.body.trim().is_empty() {
        "{}"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(text).map_err(|e| DirectoryError::Parse {
        operation: operation.name().to_string(),
        status: response.status,
        body: response.body.clone(),
        message: e.to_string(),
    })
}
