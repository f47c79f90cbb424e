//! HTTP contract of the checkout verification endpoint.
//!
//! Runs the real client against a mock shop API.

use quickcart_core::ProductId;
use quickcart_integration_tests::{
    ShopApiMock, VERIFY_PATH, billing_address, cart_item, shipping_address,
};
use quickcart_storefront::api::{
    ApiError, CheckoutApi, CheckoutClient, CheckoutVerificationInput,
};
use quickcart_storefront::cart::CartSnapshot;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn two_item_input() -> CheckoutVerificationInput {
    let cart = CartSnapshot::from_items(vec![
        cart_item(1, "Pineapple", 100, 1),
        cart_item(2, "Mango", 200, 2),
    ]);
    CheckoutVerificationInput::from_checkout(&cart, &billing_address(), &shipping_address())
}

#[tokio::test]
async fn test_verify_posts_checkout_payload() {
    let mock = ShopApiMock::start().await;

    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "amount": 500.0,
            "products": [
                { "product_id": 1, "order_quantity": 1, "unit_price": 100.0, "subtotal": 100.0 },
                { "product_id": 2, "order_quantity": 2, "unit_price": 200.0, "subtotal": 400.0 }
            ],
            "billing_address": {
                "country": "US",
                "city": "Austin",
                "state": "TX",
                "zip": "78701",
                "street_address": "1 Congress Ave"
            },
            "shipping_address": {
                "country": "US",
                "city": "Portland",
                "state": "OR",
                "zip": "97201",
                "street_address": "2 Main St"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_tax": 40,
            "shipping_charge": 12.5,
            "unavailable_products": []
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let verified = mock
        .client()
        .verify_checkout(two_item_input())
        .await
        .expect("verification should succeed");

    assert_eq!(verified.total_tax(), Some(Decimal::from(40)));
    assert_eq!(verified.shipping_charge(), Some(Decimal::new(125, 1)));
    assert!(verified.unavailable_products().is_empty());
}

#[tokio::test]
async fn test_verify_sends_bearer_token() {
    let mock = ShopApiMock::start().await;

    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .and(header("authorization", "Bearer customer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = CheckoutClient::new(&mock.config_with_token("customer-token"))
        .expect("failed to build checkout client");
    let result = client.verify_checkout(two_item_input()).await;

    assert!(result.is_ok(), "unexpected error: {result:?}");
}

#[tokio::test]
async fn test_verify_without_token_sends_no_authorization() {
    let mock = ShopApiMock::start().await;
    mock.mock_verify_success(json!({})).await;

    mock.client()
        .verify_checkout(two_item_input())
        .await
        .expect("verification should succeed");

    let requests = mock
        .server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_verify_passes_unknown_fields_through() {
    let mock = ShopApiMock::start().await;
    mock.mock_verify_success(json!({
        "total_tax": "7.25",
        "unavailable_products": [{ "id": 2 }],
        "wallet_points": 30
    }))
    .await;

    let verified = mock
        .client()
        .verify_checkout(two_item_input())
        .await
        .expect("verification should succeed");

    assert_eq!(verified.total_tax(), Some(Decimal::new(725, 2)));
    assert_eq!(verified.unavailable_products(), vec![ProductId::new(2)]);
    assert_eq!(verified.payload()["wallet_points"], json!(30));
}

#[tokio::test]
async fn test_rejection_carries_server_message() {
    let mock = ShopApiMock::start().await;
    mock.mock_verify_rejected(422, json!({ "message": "error-product-out-of-stock" }))
        .await;

    let err = mock
        .client()
        .verify_checkout(two_item_input())
        .await
        .expect_err("verification should be rejected");

    assert!(matches!(err, ApiError::Rejected { status: 422, .. }));
    assert_eq!(err.message(), Some("error-product-out-of-stock"));
}

#[tokio::test]
async fn test_rejection_without_message() {
    let mock = ShopApiMock::start().await;

    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock.server)
        .await;

    let err = mock
        .client()
        .verify_checkout(two_item_input())
        .await
        .expect_err("verification should be rejected");

    assert!(matches!(
        err,
        ApiError::Rejected {
            status: 500,
            message: None
        }
    ));
    assert_eq!(err.message(), None);
}

#[tokio::test]
async fn test_malformed_success_body_is_parse_error() {
    let mock = ShopApiMock::start().await;

    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock.server)
        .await;

    let err = mock
        .client()
        .verify_checkout(two_item_input())
        .await
        .expect_err("verification should fail");

    assert!(matches!(err, ApiError::Parse(_)));
}
