//! End-to-end tests against an in-process mock of the Cloud Directory REST
//! endpoint. The mock records every request and answers from a per-test
//! responder.

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};
use sorng_clouddirectory::{
    AttributeAction, AttributeKey, AttributeUpdate, BatchOperation, DirectoryClient,
    DirectoryConfig, DirectoryError, Facet, ObjectSelector, RequiredBehavior, SigV4Signer,
    TypedLinkFacet,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const DIRECTORY_ARN: &str = "arn:aws:clouddirectory:us-west-2:123456789012:directory/AXQX";
const SCHEMA_ARN: &str =
    "arn:aws:clouddirectory:us-west-2:123456789012:directory/AXQX/schema/people/1.0";
const BASE: &str = "/amazonclouddirectory/2017-01-11";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    headers: BTreeMap<String, String>,
    raw_body: String,
    body: Value,
}

impl Recorded {
    /// Path below the API version prefix, e.g. `/object/children`.
    fn action(&self) -> &str {
        self.path.trim_start_matches(BASE)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

type Responder = Arc<dyn Fn(&Recorded) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Responder,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect(),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
        raw_body: body,
    };
    let (status, reply) = (state.responder)(&recorded);
    let mut requests = state.requests.lock().unwrap();
    let request_id = format!("req-{}", requests.len());
    requests.push(recorded);
    (
        StatusCode::from_u16(status).unwrap(),
        [("x-amzn-requestid", request_id)],
        reply,
    )
        .into_response()
}

/// Start the mock and return its base URL plus the request log.
async fn start_mock<F>(responder: F) -> (String, Arc<Mutex<Vec<Recorded>>>)
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        requests: requests.clone(),
        responder: Arc::new(responder),
    };
    let app = Router::new().fallback(handle).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), requests)
}

fn config(url: &str) -> DirectoryConfig {
    DirectoryConfig::new(
        "AKIAEXAMPLE",
        "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        "us-west-2",
        DIRECTORY_ARN,
        SCHEMA_ARN,
    )
    .with_endpoint(url)
}

fn client(url: &str) -> DirectoryClient {
    DirectoryClient::new(config(url)).unwrap()
}

fn ok(body: Value) -> (u16, String) {
    (200, body.to_string())
}

fn taken(requests: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    requests.lock().unwrap().clone()
}

// ── Pagination ──────────────────────────────────────────────────────────

#[tokio::test]
async fn pagination_stops_on_empty_token() {
    let (url, requests) = start_mock(|req| match req.body.get("NextToken") {
        None => ok(json!({"Children": {"alice": "AQ1"}, "NextToken": "t1"})),
        Some(_) => ok(json!({"Children": {"bob": "AQ2"}, "NextToken": ""})),
    })
    .await;

    let children = client(&url)
        .list_all_object_children(&"/users".into(), None)
        .await
        .unwrap();

    let names: Vec<&str> = children.iter().map(|c| c.link_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(children[1].selector().path(), "$AQ2");

    let log = taken(&requests);
    assert_eq!(log.len(), 2);
    assert!(log[0].body.get("NextToken").is_none());
    assert_eq!(log[1].body["NextToken"], "t1");
    assert!(log.iter().all(|r| r.action() == "/object/children"));
}

#[tokio::test]
async fn pagination_respects_overall_limit() {
    let (url, requests) = start_mock(|_| {
        ok(json!({"Children": {"a": "1", "b": "2"}, "NextToken": "more"}))
    })
    .await;

    let children = client(&url)
        .list_all_object_children(&"/users".into(), Some(3))
        .await
        .unwrap();

    assert_eq!(children.len(), 3);
    assert_eq!(taken(&requests).len(), 2);
}

#[tokio::test]
async fn directory_exists_walks_pages() {
    let (url, requests) = start_mock(|req| match req.body.get("NextToken") {
        None => ok(json!({
            "Directories": [{"DirectoryArn": "arn:other", "Name": "other", "State": "ENABLED"}],
            "NextToken": "p2"
        })),
        Some(_) => ok(json!({
            "Directories": [{"DirectoryArn": DIRECTORY_ARN, "Name": "people", "State": "ENABLED"}]
        })),
    })
    .await;

    let c = client(&url);
    assert!(c.directory_exists(DIRECTORY_ARN).await.unwrap());
    assert!(!c.directory_exists("arn:missing").await.unwrap());
    c.require_directory().await.unwrap();

    let log = taken(&requests);
    assert_eq!(log.len(), 6);
    assert_eq!(log[0].action(), "/directory/list");
    assert_eq!(log[0].body["state"], "ENABLED");
    assert_eq!(log[0].body["MaxResults"], 30);
    assert!(log[0].header("x-amz-data-partition").is_none());
}

// ── Batch and object lifecycle ──────────────────────────────────────────

#[tokio::test]
async fn batch_write_is_a_single_exchange() {
    let (url, requests) = start_mock(|req| {
        let n = req.body["Operations"].as_array().map_or(0, Vec::len);
        ok(json!({"Responses": vec![json!({"UpdateObjectAttributes": {}}); n]}))
    })
    .await;

    let operations: Vec<BatchOperation> = ["admin", "ops", "dev", "qa", "sec"]
        .iter()
        .map(|role| {
            BatchOperation::update_object_attributes(
                &ObjectSelector::from("/roles").child(role),
                &[AttributeUpdate::set(
                    AttributeKey::new(SCHEMA_ARN, "GROUP", "Members"),
                    "alice",
                )],
            )
        })
        .collect();

    let responses = client(&url).batch_write(&operations).await.unwrap();
    assert_eq!(responses.len(), 5);

    let log = taken(&requests);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method, "PUT");
    assert_eq!(log[0].action(), "/batchwrite");
    let ops = log[0].body["Operations"].as_array().unwrap();
    assert_eq!(ops.len(), 5);
    assert_eq!(
        ops[4]["UpdateObjectAttributes"]["ObjectReference"]["Selector"],
        "/roles/sec"
    );
}

#[tokio::test]
async fn detach_then_delete_uses_returned_identifier() {
    let (url, requests) = start_mock(|req| match req.action() {
        "/object/detach" => ok(json!({"DetachedObjectIdentifier": "AQGG_alice"})),
        "/object/delete" if req.body["ObjectReference"]["Selector"] == "$AQGG_alice" => {
            (200, String::new())
        }
        _ => (
            400,
            json!({"__type": "InvalidArnException", "Message": "unexpected"}).to_string(),
        ),
    })
    .await;

    let c = client(&url);
    let detached = c.detach_object("alice", &"/users".into()).await.unwrap();
    c.delete_object(&detached.selector()).await.unwrap();

    let log = taken(&requests);
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].action(), "/object/detach");
    assert_eq!(
        log[0].body,
        json!({"LinkName": "alice", "ParentReference": {"Selector": "/users"}})
    );
    assert_eq!(log[1].action(), "/object/delete");
    assert_eq!(log[1].body["ObjectReference"]["Selector"], "$AQGG_alice");
}

#[tokio::test]
async fn delete_by_path_is_passed_through_and_rejected() {
    let (url, requests) = start_mock(|_| {
        (
            400,
            json!({"__type": "ObjectNotDetachedException"}).to_string(),
        )
    })
    .await;

    let err = client(&url)
        .delete_object(&"/users/alice".into())
        .await
        .unwrap_err();
    assert!(err.mentions("ObjectNotDetachedException"));
    assert_eq!(
        taken(&requests)[0].body["ObjectReference"]["Selector"],
        "/users/alice"
    );
}

// ── Probes and failures ─────────────────────────────────────────────────

#[tokio::test]
async fn probes_read_non_200_as_absent() {
    let (url, requests) = start_mock(|_| {
        (
            404,
            json!({"__type": "ResourceNotFoundException"}).to_string(),
        )
    })
    .await;

    let c = client(&url);
    assert!(c
        .get_object_information(&"/users/ghost".into())
        .await
        .unwrap()
        .is_none());
    assert!(c.get_facet("USER").await.unwrap().is_none());
    assert!(c
        .get_typed_link_facet_information("USER_ROLE")
        .await
        .unwrap()
        .is_none());

    let actions: Vec<String> = taken(&requests)
        .iter()
        .map(|r| r.action().to_string())
        .collect();
    assert_eq!(
        actions,
        vec!["/object/information", "/facet", "/typedlink/facet/get"]
    );
}

#[tokio::test]
async fn probes_surface_throttling_and_server_errors() {
    let (url, requests) = start_mock(|req| match req.action() {
        "/object/information" => (
            429,
            json!({"__type": "LimitExceededException"}).to_string(),
        ),
        _ => (503, String::new()),
    })
    .await;

    let c = client(&url);
    let err = c
        .get_object_information(&"/users/alice".into())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.mentions("LimitExceededException"));
    assert!(err.request_id().is_some());

    let err = c.get_facet("USER").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());

    let err = c
        .ensure_object_path(&"/org/users".into(), "GROUP", "Name")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));

    let actions: Vec<String> = taken(&requests)
        .iter()
        .map(|r| r.action().to_string())
        .collect();
    assert!(!actions.iter().any(|a| a == "/object"));
}

#[tokio::test]
async fn probe_found_parses_body() {
    let (url, _requests) = start_mock(|_| {
        ok(json!({
            "ObjectIdentifier": "AQ9",
            "SchemaFacets": [{"FacetName": "USER", "SchemaArn": SCHEMA_ARN}]
        }))
    })
    .await;

    let info = client(&url)
        .get_object_information(&"/users/alice".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.object_identifier.as_deref(), Some("AQ9"));
    assert_eq!(info.schema_facets[0].facet_name, "USER");
}

#[tokio::test]
async fn rejection_carries_status_and_body() {
    let (url, _requests) = start_mock(|_| {
        (
            409,
            json!({"__type": "LinkNameAlreadyInUseException", "Message": "alice exists"}).to_string(),
        )
    })
    .await;

    let mut attributes = BTreeMap::new();
    attributes.insert("Name".to_string(), "alice".to_string());
    let err = client(&url)
        .create_object("alice", "USER", &"/users".into(), &attributes)
        .await
        .unwrap_err();

    match &err {
        DirectoryError::RemoteRejection {
            operation,
            status,
            body,
            parsed,
            request_id,
        } => {
            assert_eq!(operation, "CreateObject");
            assert_eq!(request_id.as_deref(), Some("req-0"));
            assert_eq!(*status, 409);
            assert!(body.contains("alice exists"));
            assert_eq!(
                parsed.as_ref().unwrap()["__type"],
                "LinkNameAlreadyInUseException"
            );
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unparseable_success_body_is_a_parse_error() {
    let (url, _requests) = start_mock(|_| (200, "<html>gateway</html>".to_string())).await;

    let err = client(&url)
        .list_object_children(&"/users".into(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Parse { status: 200, .. }));
    assert!(err.is_rejection());
}

#[tokio::test]
async fn closed_port_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .list_directories(None)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Transport { status: None, .. }));
    assert!(err.is_retryable());
}

/// Read one full HTTP request (headers plus `content-length` body).
async fn read_request(stream: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return buf;
        }
    }
}

#[tokio::test]
async fn truncated_body_keeps_the_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        stream
            .write_all(
                b"HTTP/1.1 503 Service Unavailable\r\n\
                  content-type: application/json\r\n\
                  content-length: 100\r\n\
                  connection: close\r\n\r\n{\"x\"",
            )
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    });

    let err = client(&format!("http://{}", addr))
        .list_directories(None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, DirectoryError::Transport { status: Some(503), .. }),
        "unexpected {:?}",
        err
    );
    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
}

// ── Headers and signing ─────────────────────────────────────────────────

#[tokio::test]
async fn headers_follow_routing_table() {
    let (url, requests) = start_mock(|_| ok(json!({}))).await;

    let c = client(&url);
    c.list_object_children(&"/users".into(), None).await.unwrap();
    c.create_facet(&Facet::with_attributes(
        "USER",
        [("Name", RequiredBehavior::RequiredAlways)],
    ))
    .await
    .unwrap();
    c.list_incoming_typed_links(Some("USER_ROLE"), &"/roles/admin".into(), None)
        .await
        .unwrap();

    let log = taken(&requests);
    let children = &log[0];
    assert_eq!(children.method, "POST");
    assert_eq!(children.path, format!("{}/object/children", BASE));
    assert_eq!(children.header("x-amz-data-partition"), Some(DIRECTORY_ARN));
    assert_eq!(children.header("x-amz-consistency-level"), Some("SERIALIZABLE"));
    let auth = children.header("authorization").unwrap();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIAEXAMPLE/"));
    assert!(auth.contains("/us-west-2/clouddirectory/aws4_request,"));
    assert!(auth.contains(
        "SignedHeaders=host;x-amz-consistency-level;x-amz-data-partition;x-amz-date,"
    ));
    assert!(children.header("x-amz-date").is_some());

    let facet = &log[1];
    assert_eq!(facet.method, "PUT");
    assert_eq!(facet.action(), "/facet/create");
    assert_eq!(facet.header("x-amz-data-partition"), Some(SCHEMA_ARN));
    assert!(facet.header("x-amz-consistency-level").is_none());
    assert!(facet
        .header("authorization")
        .unwrap()
        .contains("SignedHeaders=host;x-amz-data-partition;x-amz-date,"));
    assert_eq!(
        facet.body["Attributes"][0]["AttributeDefinition"]["IsImmutable"],
        false
    );

    let incoming = &log[2];
    assert_eq!(incoming.action(), "/typedlink/incoming");
    assert!(incoming.header("x-amz-consistency-level").is_none());
    assert_eq!(incoming.body["FilterTypedLink"]["TypedLinkName"], "USER_ROLE");
}

#[tokio::test]
async fn signature_verifies_against_received_request() {
    let (url, requests) = start_mock(|_| ok(json!({"Attributes": []}))).await;

    client(&url)
        .list_object_attributes("USER", &"/users/alice".into(), None)
        .await
        .unwrap();

    let req = taken(&requests).remove(0);
    let at = Utc.from_utc_datetime(
        &NaiveDateTime::parse_from_str(req.header("x-amz-date").unwrap(), "%Y%m%dT%H%M%SZ")
            .unwrap(),
    );
    let mut signed = BTreeMap::new();
    for name in ["host", "x-amz-data-partition", "x-amz-consistency-level"] {
        signed.insert(name.to_string(), req.header(name).unwrap().to_string());
    }

    let expected = SigV4Signer::new(config(&url).credential())
        .sign_at(&req.method, &req.path, &BTreeMap::new(), &signed, &req.raw_body, at)
        .unwrap();
    assert_eq!(req.header("authorization"), Some(expected.authorization.as_str()));
}

// ── Typed links ─────────────────────────────────────────────────────────

#[tokio::test]
async fn detach_typed_link_echoes_listed_specifier() {
    let specifier = json!({
        "IdentityAttributeValues": [
            {"AttributeName": "RoleName", "Value": {"StringValue": "admin"}},
            {"AttributeName": "UserName", "Value": {"StringValue": "alice"}}
        ],
        "SourceObjectReference": {"Selector": "$AQ_user"},
        "TargetObjectReference": {"Selector": "$AQ_role"},
        "TypedLinkFacet": {"SchemaArn": SCHEMA_ARN, "TypedLinkName": "USER_ROLE"}
    });
    let listed = specifier.clone();
    let (url, requests) = start_mock(move |req| match req.action() {
        "/typedlink/outgoing" => ok(json!({"TypedLinkSpecifiers": [listed.clone()]})),
        _ => ok(json!({})),
    })
    .await;

    let c = client(&url);
    let links = c
        .list_all_outgoing_typed_links(Some("USER_ROLE"), &"/users/alice".into(), None)
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].identity_value("RoleName").as_deref(), Some("admin"));

    c.detach_typed_link(&links[0]).await.unwrap();
    c.batch_write(&[BatchOperation::detach_typed_link(links[0].clone())])
        .await
        .unwrap();

    let log = taken(&requests);
    assert_eq!(log[1].action(), "/typedlink/detach");
    assert_eq!(log[1].body, json!({ "TypedLinkSpecifier": specifier }));
    assert_eq!(
        log[2].body["Operations"][0]["DetachTypedLink"]["TypedLinkSpecifier"],
        specifier
    );
}

#[tokio::test]
async fn attach_typed_link_returns_specifier() {
    let (url, requests) = start_mock(|req| {
        ok(json!({"TypedLinkSpecifier": {
            "TypedLinkFacet": req.body["TypedLinkFacet"].clone(),
            "SourceObjectReference": {"Selector": "$AQ_user"},
            "TargetObjectReference": {"Selector": "$AQ_role"},
            "IdentityAttributeValues": []
        }}))
    })
    .await;

    let mut attributes = BTreeMap::new();
    attributes.insert("UserName".to_string(), "alice".to_string());
    attributes.insert("RoleName".to_string(), "admin".to_string());
    let link = client(&url)
        .attach_typed_link(
            &"/users/alice".into(),
            &"/roles/admin".into(),
            "USER_ROLE",
            &attributes,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.facet_name(), Some("USER_ROLE"));

    let log = taken(&requests);
    assert_eq!(log[0].method, "PUT");
    assert_eq!(log[0].action(), "/typedlink/attach");
    assert_eq!(log[0].body["Attributes"].as_array().unwrap().len(), 2);
}

// ── Attributes and bootstrap ────────────────────────────────────────────

#[tokio::test]
async fn update_object_attributes_by_action() {
    let (url, requests) = start_mock(|_| ok(json!({}))).await;

    let mut attributes = BTreeMap::new();
    attributes.insert("Email".to_string(), "alice@example.com".to_string());
    let c = client(&url);
    c.update_object_attributes(
        AttributeAction::CreateOrUpdate,
        "USER",
        &"/users/alice".into(),
        &attributes,
    )
    .await
    .unwrap();
    c.update_object_attributes(AttributeAction::Delete, "USER", &"/users/alice".into(), &attributes)
        .await
        .unwrap();

    let log = taken(&requests);
    let set = &log[0].body["AttributeUpdates"][0];
    assert_eq!(set["ObjectAttributeAction"]["ObjectAttributeActionType"], "CREATE_OR_UPDATE");
    assert_eq!(
        set["ObjectAttributeAction"]["ObjectAttributeUpdateValue"]["StringValue"],
        "alice@example.com"
    );
    assert_eq!(set["ObjectAttributeKey"]["SchemaArn"], SCHEMA_ARN);

    let delete = &log[1].body["AttributeUpdates"][0]["ObjectAttributeAction"];
    assert_eq!(delete["ObjectAttributeActionType"], "DELETE");
    assert!(delete.get("ObjectAttributeUpdateValue").is_none());
    assert_eq!(log[1].action(), "/object/update");
}

#[tokio::test]
async fn ensure_object_path_creates_only_missing_nodes() {
    let (url, requests) = start_mock(|req| match req.action() {
        "/object/information" if req.body["ObjectReference"]["Selector"] == "/org" => {
            ok(json!({"ObjectIdentifier": "AQ_org"}))
        }
        "/object/information" => (404, json!({"__type": "ResourceNotFoundException"}).to_string()),
        "/object" => ok(json!({"ObjectIdentifier": "AQ_new"})),
        _ => (500, String::new()),
    })
    .await;

    let created = client(&url)
        .ensure_object_path(&"/org/users".into(), "GROUP", "Name")
        .await
        .unwrap();
    assert_eq!(created, vec![ObjectSelector::from("/org/users")]);

    let log = taken(&requests);
    let actions: Vec<&str> = log.iter().map(|r| r.action()).collect();
    assert_eq!(
        actions,
        vec!["/object/information", "/object/information", "/object"]
    );
    let create = &log[2].body;
    assert_eq!(create["LinkName"], "users");
    assert_eq!(create["ParentReference"]["Selector"], "/org");
    assert_eq!(create["ObjectAttributeList"][0]["Key"]["Name"], "Name");
    assert_eq!(create["ObjectAttributeList"][0]["Value"]["StringValue"], "users");
    assert_eq!(create["SchemaFacets"][0]["FacetName"], "GROUP");
}

#[tokio::test]
async fn ensure_facets_are_idempotent() {
    let (url, requests) = start_mock(|req| match req.action() {
        "/facet" if req.method == "POST" => ok(json!({"Facet": {"Name": "GROUP"}})),
        "/typedlink/facet/get" => (404, String::new()),
        "/facet/attributes" => ok(json!({"Attributes": [{"Name": "Name"}]})),
        _ => ok(json!({})),
    })
    .await;

    let c = client(&url);
    let group = Facet::with_attributes("GROUP", [("Name", RequiredBehavior::RequiredAlways)]);
    assert!(!c.ensure_facet(&group).await.unwrap());

    let link = TypedLinkFacet::new("USER_ROLE", &["UserName", "RoleName"]);
    assert!(c.ensure_typed_link_facet(&link).await.unwrap());

    let added = c
        .ensure_facet_attributes("GROUP", &["Name", "Email"])
        .await
        .unwrap();
    assert_eq!(added, vec!["Email".to_string()]);

    let log = taken(&requests);
    let routes: Vec<(String, String)> = log
        .iter()
        .map(|r| (r.method.clone(), r.action().to_string()))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("POST".to_string(), "/facet".to_string()),
            ("POST".to_string(), "/typedlink/facet/get".to_string()),
            ("PUT".to_string(), "/typedlink/facet/create".to_string()),
            ("POST".to_string(), "/facet/attributes".to_string()),
            ("PUT".to_string(), "/facet".to_string()),
        ]
    );
    assert_eq!(
        log[2].body["Facet"]["IdentityAttributeOrder"],
        json!(["UserName", "RoleName"])
    );
    assert_eq!(log[4].body["AttributeUpdates"][0]["Attribute"]["Name"], "Email");
    assert_eq!(log[4].body["AttributeUpdates"].as_array().unwrap().len(), 1);
}
