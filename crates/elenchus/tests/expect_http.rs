use std::rc::Rc;

use bytes::Bytes;
use elenchus::prelude::*;
use elenchus_core::CollectingReporter;
use http::{Method, StatusCode, Uri};
use http_body_util::Full;
use serde_json::json;

fn collecting(config: &ElenchusConfig) -> (Expect, CollectingReporter) {
    let reporter = CollectingReporter::new();
    (Expect::with_reporter(config, Rc::new(reporter.clone())), reporter)
}

fn orders_response() -> http::Response<Full<Bytes>> {
    let body = json!({
        "orders": [
            {"id": 1, "status": "paid", "total": 19.5},
            {"id": 2, "status": "open", "total": 5},
            {"id": 3, "status": "paid", "total": 42}
        ]
    });
    http::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[tokio::test]
async fn test_http_response_passes() {
    let (e, reporter) = collecting(&ElenchusConfig::default());
    let response = e.http_response(orders_response()).await.unwrap();

    response.status(StatusCode::OK).status_range(StatusRange::Success);
    let orders = response.json().object().value("orders").array();
    orders.length().is_equal(&3);

    let paid = orders.filter(|_, order| {
        order.object().value("status").string().raw() == "paid"
    });
    paid.length().is_equal(&2);

    orders
        .find(|_, order| order.object().value("id").number().raw() == 2.0)
        .object()
        .value("total")
        .number()
        .is_integer();

    assert!(reporter.is_empty(), "{:?}", reporter.messages());
}

#[tokio::test]
async fn test_http_response_failure_report() {
    let config = ElenchusConfig::builder()
        .reporting(elenchus::config::ReportingConfig {
            print_response: true,
            ..Default::default()
        })
        .build();
    let (e, reporter) = collecting(&config);
    let response = e.http_response(orders_response()).await.unwrap();

    response
        .json()
        .object()
        .value("orders")
        .array()
        .every(|_, order| {
            order.object().value("total").number().lt(&40);
        });

    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains(
        r#"Response().JSON().Object().Value("orders").Array().Every()[2].Object().Value("total").Number().Lt()"#
    ));
    assert!(messages[0].contains("response:"));
    assert!(response.chain().tree_failed());
}

#[test]
fn test_exchange_attaches_request() {
    let config = ElenchusConfig::builder()
        .reporting(elenchus::config::ReportingConfig {
            print_request: true,
            ..Default::default()
        })
        .build();
    let (e, reporter) = collecting(&config);

    let request = RequestSnapshot::new(Method::DELETE, Uri::from_static("/orders/9"));
    let response = ResponseSnapshot::new(StatusCode::NOT_FOUND, http::HeaderMap::new(), "");

    e.exchange(request, response).status(StatusCode::NO_CONTENT);

    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("/orders/9"));
}

#[test]
fn test_aliases_shorten_reports() {
    let (e, reporter) = collecting(&ElenchusConfig::default());

    let user = e.object(&json!({"name": "ann"}));
    user.alias("user");
    user.value("name").string().is_equal("bob");

    assert!(reporter.messages()[0]
        .contains(r#"assertion failed: user.Value("name").String().IsEqual("bob")"#));
}

#[test]
fn test_independent_expectations() {
    let (e, reporter) = collecting(&ElenchusConfig::default());

    e.number(&1).gt(&2);
    e.number(&1).lt(&2);
    e.string("a").is_equal("b");

    assert_eq!(reporter.len(), 2);
}
