//! `Api` behaviour against a recording transport.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use assert2::{check, let_assert};
use bytes::Bytes;
use fetchkit::{
    Api, ApiBuilder, Body, Descriptors, EffectiveRequest, Error, Hooks, Method, OptionBag,
    ParamObject, ParamValue, QueryDescriptor, Response, Result, Scalar, StateCell, Transport,
    transport_fn,
};

/// Records every request and answers with a fixed status.
#[derive(Debug, Clone)]
struct Recorder {
    sent: Arc<Mutex<Vec<EffectiveRequest>>>,
    status: u16,
}

impl Recorder {
    fn new(status: u16) -> Self {
        Self {
            sent: Arc::default(),
            status,
        }
    }

    fn requests(&self) -> Vec<EffectiveRequest> {
        self.sent.lock().expect("lock").clone()
    }

    fn last(&self) -> EffectiveRequest {
        self.requests().pop().expect("one request")
    }
}

impl Transport for Recorder {
    fn send(&self, request: EffectiveRequest) -> impl Future<Output = Result<Response>> + Send {
        self.sent.lock().expect("lock").push(request.clone());
        let status = self.status;
        async move {
            Ok(Response::new(status, HashMap::new(), Bytes::new()).with_url(request.url()))
        }
    }
}

fn api(recorder: &Recorder) -> Api<Recorder> {
    ApiBuilder::new(recorder.clone())
        .shared_url("https://h")
        .shared_config(OptionBag::new())
        .build()
}

#[tokio::test]
async fn fetch_builds_url_and_leaves_options_empty() {
    let recorder = Recorder::new(200);
    let api = api(&recorder);

    api.fetch("/path", None, ParamObject::new().with("param", "val"))
        .await
        .expect("response");

    let request = recorder.last();
    check!(request.url() == "https://h/path?param=val");
    check!(request.options() == &OptionBag::new());
    check!(request.method().is_none());
}

#[tokio::test]
async fn get_merges_call_headers_over_base() {
    let recorder = Recorder::new(200);
    let api = ApiBuilder::new(recorder.clone())
        .url("https://h")
        .config(OptionBag::new().with_header("B", "2"))
        .build();

    let options = OptionBag::new().with_header("A", "1");
    api.get("/p", Some(&options), ()).await.expect("response");

    let expected = OptionBag::new()
        .with_method(Method::Get)
        .with_header("A", "1")
        .with_header("B", "2");
    check!(recorder.last().options() == &expected);
}

#[tokio::test]
async fn verbs_set_their_method_unless_overridden() {
    let recorder = Recorder::new(200);
    let api = api(&recorder);

    api.get("/p", None, ()).await.expect("get");
    api.post("/p", None, ()).await.expect("post");
    api.put("/p", None, ()).await.expect("put");
    api.del("/p", None, ()).await.expect("del");
    let patch = OptionBag::new().with_method(Method::Patch);
    api.post("/p", Some(&patch), ()).await.expect("override");

    let methods: Vec<_> = recorder
        .requests()
        .iter()
        .map(EffectiveRequest::method)
        .collect();
    check!(
        methods
            == vec![
                Some(Method::Get),
                Some(Method::Post),
                Some(Method::Put),
                Some(Method::Delete),
                Some(Method::Patch),
            ]
    );
}

#[tokio::test]
async fn undefined_in_call_options_removes_base_values() {
    let recorder = Recorder::new(200);
    let api = ApiBuilder::new(recorder.clone())
        .url("https://h")
        .config(
            OptionBag::new()
                .with_header("Authorization", "token")
                .with_option("credentials", serde_json::json!("include")),
        )
        .build();

    let options = OptionBag::new()
        .unset_header("Authorization")
        .unset_option("credentials");
    api.fetch("/public", Some(&options), ()).await.expect("response");

    let sent = recorder.last();
    check!(sent.options().header("Authorization").is_none());
    check!(sent.options().option("credentials").is_none());
    check!(sent.options().headers().is_some_and(|headers| headers.is_empty()));
}

#[tokio::test]
async fn stringify_body_flag_never_reaches_transport() {
    let recorder = Recorder::new(200);
    let api = ApiBuilder::new(recorder.clone())
        .url("https://h")
        .config(OptionBag::new().with_stringify_body(true))
        .build();

    let options = OptionBag::new().with_body(serde_json::json!({"param": "val"}));
    api.put("/p", Some(&options), ()).await.expect("response");

    let sent = recorder.last();
    check!(sent.options().body() == Some(&Body::from(r#"{"param":"val"}"#)));
    check!(!sent.options().stringify_body());
}

#[tokio::test]
async fn json_variants_force_content_type() {
    let recorder = Recorder::new(200);
    let api = api(&recorder);

    let options = OptionBag::new()
        .with_header("Content-Type", "text/plain")
        .with_body(serde_json::json!({"a": 1}));
    api.post_json("/p", Some(&options), ()).await.expect("post");

    let raw = OptionBag::new()
        .with_raw_body(true)
        .with_body(serde_json::json!({"a": 1}));
    api.put_json("/p", Some(&raw), ()).await.expect("put");

    api.get_json("/p", None, ()).await.expect("get");
    api.del_json("/p", None, ()).await.expect("del");

    let requests = recorder.requests();
    let_assert!([post, put, get, del] = requests.as_slice());

    check!(post.method() == Some(Method::Post));
    check!(post.options().header("Content-Type") == Some("application/json"));
    check!(post.options().body() == Some(&Body::from(r#"{"a":1}"#)));

    check!(put.options().body() == Some(&Body::Json(serde_json::json!({"a": 1}))));
    check!(!put.options().raw_body());

    check!(get.method() == Some(Method::Get));
    check!(get.options().header("Content-Type") == Some("application/json"));
    check!(del.method() == Some(Method::Delete));
}

#[tokio::test]
async fn invalid_params_fail_before_transport_and_hooks() {
    let recorder = Recorder::new(200);
    let rejected = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&rejected);
    let api = api(&recorder).with_hooks(Hooks::default().with_reject(move |err| {
        *counter.lock().expect("lock") += 1;
        Err(err)
    }));

    let_assert!(Err(Error::InvalidInputKind { kind }) = api.get("/p", None, "str").await);
    check!(kind == "string");
    let_assert!(Err(Error::InvalidInputKind { kind }) = api.get("/p", None, vec!["str"]).await);
    check!(kind == "array");

    check!(recorder.requests().is_empty());
    check!(*rejected.lock().expect("lock") == 0);
}

#[tokio::test]
async fn setters_update_state_for_all_clones() {
    let recorder = Recorder::new(200);
    let api = api(&recorder);
    let consumer = api.clone();

    api.set_url("https://other").expect("shared url");
    api.update_url(|url| format!("{url}/v2")).expect("shared url");
    api.set_config(OptionBag::new().with_header("X", "1"))
        .expect("shared config");
    api.update_config(|config| config.clone().with_header("Y", "2"))
        .expect("shared config");

    check!(consumer.url() == "https://other/v2");
    check!(consumer.config().header("X") == Some("1"));

    consumer.get("/p", None, ()).await.expect("response");
    let sent = recorder.last();
    check!(sent.url() == "https://other/v2/p");
    check!(sent.options().header("Y") == Some("2"));
}

#[tokio::test]
async fn external_state_cells_are_read_at_call_time() {
    let recorder = Recorder::new(200);
    let url = StateCell::new(String::from("https://a"));
    let api = ApiBuilder::new(recorder.clone())
        .url_state(url.clone())
        .build();

    url.set(String::from("https://b"));
    api.raw("/p", None).await.expect("response");
    check!(recorder.last().url() == "https://b/p");
}

#[test]
fn fixed_state_refuses_setters() {
    let api = ApiBuilder::new(Recorder::new(200))
        .url("https://h")
        .config(OptionBag::new())
        .build();

    let_assert!(Err(Error::MisconfiguredBuilder { setter }) = api.set_url("https://x"));
    check!(setter == "set_url");
    let_assert!(Err(Error::MisconfiguredBuilder { setter }) = api.update_config(Clone::clone));
    check!(setter == "set_config");
    check!(api.url() == "https://h");
}

#[tokio::test]
async fn resolve_hook_shapes_the_result() {
    let recorder = Recorder::new(200);
    let api = api(&recorder).with_hooks(Hooks::new(
        |response: Response| Ok(response.status()),
        |err: Error| Err(err),
    ));

    let status: u16 = api.get("/p", None, ()).await.expect("status");
    check!(status == 200);
}

#[tokio::test]
async fn transport_failures_reach_reject_untouched() {
    let transport = transport_fn(|_request: EffectiveRequest| async {
        Err::<Response, _>(Error::connection("refused"))
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let api = ApiBuilder::new(transport)
        .url("https://h")
        .hooks(Hooks::new(Ok, move |err: Error| {
            log.lock().expect("lock").push(err.to_string());
            Err(Error::rejected("offline"))
        }))
        .build();

    let_assert!(Err(Error::Rejected(message)) = api.get("/p", None, ()).await);
    check!(message == "offline");
    check!(*seen.lock().expect("lock") == vec!["connection error: refused".to_string()]);
}

#[tokio::test]
async fn failing_resolve_is_routed_to_reject() {
    let recorder = Recorder::new(500);
    let api = api(&recorder).with_hooks(Hooks::error_for_status().with_reject(|err| {
        Err(Error::rejected(format!("wrapped: {err}")))
    }));

    let_assert!(Err(Error::Rejected(message)) = api.get("/p", None, ()).await);
    check!(message == "wrapped: HTTP error 500: Internal Server Error");
}

#[test]
fn codec_surface() {
    let api = ApiBuilder::new(Recorder::new(200)).build();

    let qs = api
        .encode(ParamObject::new().with("id", 7).with("value", ""))
        .expect("object");
    insta::assert_snapshot!(qs, @"?id=7&value=");

    let descriptors = Descriptors::new()
        .with("id", QueryDescriptor::number())
        .with("value", QueryDescriptor::string());
    let decoded = api.decode(&qs, &descriptors);
    check!(decoded.get("id") == Some(&ParamValue::from(7)));
    check!(decoded.get("value") == Some(&ParamValue::Scalar(Scalar::String(String::new()))));

    check!(api.encode(ParamValue::Undefined).expect("undefined") == "");
    check!(api.encode(ParamObject::new()).expect("empty") == "");
}

#[test]
fn config_updater_may_read_the_base_url() {
    let api = api(&Recorder::new(200));
    let reader = api.clone();

    api.update_config(|config| config.clone().with_header("Origin", reader.url()))
        .expect("shared config");
    check!(api.config().header("Origin") == Some("https://h"));
}
