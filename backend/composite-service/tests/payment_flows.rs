mod common;

use common::*;
use common_enums::{OrderStatus, RefundStatus};
use common_utils::types::MinorUnit;
use domain_types::{errors::ConnectorError, webhooks::CallbackOutcome};
use mockito::Matcher;
use time::macros::datetime;

async fn mock_token(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/api/auth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .create_async()
        .await
}

#[tokio::test]
async fn test_payment_is_created_and_completed_by_callback() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("POST", "/api/payments")
        .with_status(200)
        .with_body(r#"{"redirect_url":"https://pay.example/3ds"}"#)
        .create_async()
        .await;
    let orders = InMemoryOrders::with(vec![order("order_1")]);
    let payments = payments(
        &server.url(),
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );

    let url = payments
        .create_payment("order_1", "ok", "fail", &card_requisites())
        .await
        .unwrap();
    assert_eq!(url, "https://pay.example/3ds");
    assert_eq!(orders.get("order_1").private_status, OrderStatus::Created);

    let (raw, signature) = signed(&payment_callback("order_1", "tx_100", "COMPLETED"));
    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    assert_eq!(outcome.http_status(), 200);
    let stored = orders.get("order_1");
    assert_eq!(stored.private_status, OrderStatus::PaymentSystemComplete);
    assert_eq!(stored.transaction_id.as_deref(), Some("tx_100"));
}

#[tokio::test]
async fn test_failed_creation_is_persisted_as_rejected() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("POST", "/api/payments")
        .with_status(500)
        .create_async()
        .await;
    let orders = InMemoryOrders::with(vec![order("order_1")]);
    let payments = payments(
        &server.url(),
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );

    let error = payments
        .create_payment("order_1", "ok", "fail", &card_requisites())
        .await
        .unwrap_err();

    assert_eq!(
        error.current_context(),
        &ConnectorError::UnexpectedHttpStatus { status_code: 500 }
    );
    assert_eq!(
        orders.get("order_1").private_status,
        OrderStatus::RejectedOnCreate
    );
}

#[tokio::test]
async fn test_mock_handler_is_resolved_through_the_registry() {
    let mut mocked = order("order_1");
    mocked.payment_method.handler = "mock_ok".to_string();
    let orders = InMemoryOrders::with(vec![mocked]);
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );

    payments
        .create_payment("order_1", "ok", "fail", &card_requisites())
        .await
        .unwrap();

    assert_eq!(orders.get("order_1").private_status, OrderStatus::Created);
}

#[tokio::test]
async fn test_declined_callback_attaches_reason() {
    let mut created = order("order_1");
    created.private_status = OrderStatus::Created;
    let orders = InMemoryOrders::with(vec![created]);
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );
    let mut body = payment_callback("order_1", "tx_100", "DECLINED");
    body["payment_data"]["decline_reason"] = serde_json::json!("Do not honor");
    body["payment_data"]["decline_code"] = serde_json::json!("05");
    let (raw, signature) = signed(&body);

    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    let stored = orders.get("order_1");
    assert_eq!(stored.private_status, OrderStatus::PaymentSystemDeclined);
    let cancellation = stored.cancellation.unwrap();
    assert_eq!(cancellation.reason.as_deref(), Some("Do not honor"));
    assert_eq!(cancellation.code.as_deref(), Some("05"));
}

#[tokio::test]
async fn test_temporary_callback_asks_for_redelivery_without_writing() {
    let mut created = order("order_1");
    created.private_status = OrderStatus::Created;
    let orders = InMemoryOrders::with(vec![created.clone()]);
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );
    let (raw, signature) = signed(&payment_callback("order_1", "tx_100", "AUTHORIZED"));

    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Temporary);
    assert_eq!(outcome.http_status(), 503);
    assert_eq!(orders.get("order_1"), created);
}

#[tokio::test]
async fn test_rejected_callbacks_carry_stable_codes() {
    let mut created = order("order_1");
    created.private_status = OrderStatus::Created;
    let orders = InMemoryOrders::with(vec![created]);
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &InMemorySubscriptions::default(),
    );
    let (raw, _) = signed(&payment_callback("order_1", "tx_100", "COMPLETED"));

    let CallbackOutcome::Rejected(error) = payments
        .process_payment_callback("order_1", &raw, "deadbeef")
        .await
    else {
        panic!("tampered callback was accepted");
    };
    assert_eq!(error.get_api_error().sub_code, "SIGNATURE_INVALID");
    assert_eq!(error.get_api_error().error_identifier, 400);

    let (raw, signature) = signed(&payment_callback("order_404", "tx_100", "COMPLETED"));
    let outcome = payments
        .process_payment_callback("order_404", &raw, &signature)
        .await;
    assert_eq!(outcome.http_status(), 404);

    let mut body = payment_callback("order_1", "tx_100", "COMPLETED");
    body["payment_data"]["amount"] = serde_json::json!(100.0);
    let (raw, signature) = signed(&body);
    let CallbackOutcome::Rejected(error) = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await
    else {
        panic!("amount mismatch was accepted");
    };
    assert_eq!(error.get_api_error().sub_code, "VALIDATION_ERROR");
    assert_eq!(
        error.get_api_error().error_object,
        Some(serde_json::json!({ "field": "amount" }))
    );
    assert_eq!(orders.get("order_1").private_status, OrderStatus::Created);
}

#[tokio::test]
async fn test_refund_is_created_and_completed_by_callback() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("POST", "/api/refunds")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "payment_data": { "id": "tx_100" }
        })))
        .with_status(201)
        .with_body(r#"{"refund_data":{"id":"rf_7","status":"IN_PROGRESS"}}"#)
        .create_async()
        .await;
    let mut completed = order("order_1");
    completed.private_status = OrderStatus::PaymentSystemComplete;
    completed.transaction_id = Some("tx_100".to_string());
    let orders = InMemoryOrders::with(vec![completed]);
    let refunds = InMemoryRefunds::with(refund("order_1"));
    let payments = payments(
        &server.url(),
        &orders,
        &refunds,
        &InMemorySubscriptions::default(),
    );

    payments.create_refund("refund_1").await.unwrap();
    let created = refunds.get("refund_1");
    assert_eq!(created.status, RefundStatus::InProgress);
    assert_eq!(created.external_id.as_deref(), Some("rf_7"));

    let (raw, signature) = signed(&serde_json::json!({
        "callback_time": "2024-01-03T09:30:00Z",
        "payment_method": "BANKCARD",
        "merchant_order": { "id": "refund_1" },
        "payment_data": { "id": "tx_100" },
        "refund_data": { "id": "rf_7", "status": "COMPLETED", "amount": 10.0, "currency": "USD" }
    }));
    let outcome = payments
        .process_refund_callback("refund_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    let stored = refunds.get("refund_1");
    assert_eq!(stored.status, RefundStatus::Completed);
    assert!(stored.updated_at > created.created_at);
}

#[tokio::test]
async fn test_subscription_creation_opens_local_subscription() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("POST", "/api/recurring_plans")
        .with_status(201)
        .with_body(r#"{"plan_data":{"id":"plan_5","status":"ACTIVE"}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/recurring")
        .with_status(200)
        .with_body(r#"{"redirect_url":"https://pay.example/sub"}"#)
        .create_async()
        .await;
    let orders = InMemoryOrders::with(vec![recurring_order("order_1")]);
    let subscriptions = InMemorySubscriptions::default();
    let payments = payments(
        &server.url(),
        &orders,
        &InMemoryRefunds::default(),
        &subscriptions,
    );

    let url = payments
        .create_recurring_subscription("order_1", "ok", "fail", &card_requisites())
        .await
        .unwrap();

    assert_eq!(url, "https://pay.example/sub");
    let opened = subscriptions.all();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].plan_id, "plan_5");
    assert_eq!(opened[0].order_id, "order_1");
    assert!(opened[0].is_active);
    assert!(!opened[0].has_recorded_payment());
}

#[tokio::test]
async fn test_forged_recurring_callback_is_rejected_before_any_lookup() {
    let mut created = recurring_order("order_1");
    created.private_status = OrderStatus::Created;
    let orders = InMemoryOrders::with(vec![created.clone()]);
    let payments = payments_with(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        UnavailableSubscriptions,
    );
    let (raw, _) = signed(&recurring_callback(
        "order_1",
        "tx_100",
        "COMPLETED",
        "2024-01-01T10:00:00Z",
    ));
    let forged = "0".repeat(128);

    let CallbackOutcome::Rejected(error) = payments
        .process_payment_callback("order_1", &raw, &forged)
        .await
    else {
        panic!("forged callback was not rejected");
    };

    assert_eq!(error.get_api_error().sub_code, "SIGNATURE_INVALID");
    assert_eq!(error.get_api_error().error_identifier, 400);
    assert_eq!(orders.get("order_1"), created);
}

#[tokio::test]
async fn test_first_recurring_charge_completes_the_parent_order() {
    let mut created = recurring_order("order_1");
    created.private_status = OrderStatus::Created;
    let orders = InMemoryOrders::with(vec![created]);
    let subscriptions = InMemorySubscriptions::with(subscription("order_1"));
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &subscriptions,
    );
    let (raw, signature) = signed(&recurring_callback(
        "order_1",
        "tx_100",
        "COMPLETED",
        "2024-01-01T10:00:00Z",
    ));

    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    assert_eq!(orders.all().len(), 1);
    let stored = orders.get("order_1");
    assert_eq!(stored.private_status, OrderStatus::PaymentSystemComplete);
    assert_eq!(stored.payment_requisites.recurring_id.as_deref(), Some("filing_9"));
    let booked = subscriptions.get("subscription_1");
    assert_eq!(booked.processor_subscription_id.as_deref(), Some("cp_sub_1"));
    assert_eq!(booked.last_payment_at, Some(datetime!(2024-01-01 10:00:00 UTC)));
    assert_eq!(booked.expire_at, Some(datetime!(2024-02-01 10:00:00 UTC)));
    assert_eq!(booked.total_amount, MinorUnit::new(1000));
}

#[tokio::test]
async fn test_repeated_charge_creates_exactly_one_renewal() {
    let mut parent = recurring_order("order_1");
    parent.private_status = OrderStatus::PaymentSystemComplete;
    parent.transaction_id = Some("tx_100".to_string());
    parent.recurring_subscription_id = Some("cp_sub_1".to_string());
    let mut booked = subscription("order_1");
    booked.processor_subscription_id = Some("cp_sub_1".to_string());
    booked.last_payment_at = Some(datetime!(2024-01-01 10:00:00 UTC));
    booked.expire_at = Some(datetime!(2024-02-01 10:00:00 UTC));
    booked.total_amount = MinorUnit::new(1000);
    let orders = InMemoryOrders::with(vec![parent]);
    let subscriptions = InMemorySubscriptions::with(booked);
    let payments = payments(
        "https://unused.local",
        &orders,
        &InMemoryRefunds::default(),
        &subscriptions,
    );
    let (raw, signature) = signed(&recurring_callback(
        "order_1",
        "tx_200",
        "COMPLETED",
        "2024-02-01T10:00:00Z",
    ));

    for _ in 0..2 {
        let outcome = payments
            .process_payment_callback("order_1", &raw, &signature)
            .await;
        assert_eq!(outcome, CallbackOutcome::Processed);
    }

    let all = orders.all();
    assert_eq!(all.len(), 2);
    let renewal = all
        .iter()
        .find(|order| order.id != "order_1")
        .unwrap();
    assert_eq!(renewal.parent_order_id.as_deref(), Some("order_1"));
    assert_eq!(renewal.transaction_id.as_deref(), Some("tx_200"));
    assert_eq!(renewal.private_status, OrderStatus::PaymentSystemComplete);
    assert_eq!(orders.get("order_1").transaction_id.as_deref(), Some("tx_100"));

    let subscription = subscriptions.get("subscription_1");
    assert_eq!(subscription.total_amount, MinorUnit::new(2000));
    assert_eq!(subscription.expire_at, Some(datetime!(2024-03-01 10:00:00 UTC)));
}

#[tokio::test]
async fn test_declined_recurring_charge_cancels_the_subscription() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    let cancel = server
        .mock("PATCH", "/api/subscriptions/cp_sub_1")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let mut created = recurring_order("order_1");
    created.private_status = OrderStatus::Created;
    let mut opened = subscription("order_1");
    opened.processor_subscription_id = Some("cp_sub_1".to_string());
    let orders = InMemoryOrders::with(vec![created]);
    let subscriptions = InMemorySubscriptions::with(opened);
    let payments = payments(
        &server.url(),
        &orders,
        &InMemoryRefunds::default(),
        &subscriptions,
    );
    let (raw, signature) = signed(&recurring_callback(
        "order_1",
        "tx_100",
        "DECLINED",
        "2024-01-01T10:00:00Z",
    ));

    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    assert_eq!(
        orders.get("order_1").private_status,
        OrderStatus::PaymentSystemDeclined
    );
    assert!(!subscriptions.get("subscription_1").is_active);
    cancel.assert_async().await;
}

#[tokio::test]
async fn test_refused_subscription_cancellation_still_deactivates_locally() {
    let mut server = mockito::Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("PATCH", "/api/subscriptions/cp_sub_1")
        .with_status(409)
        .create_async()
        .await;
    let mut created = recurring_order("order_1");
    created.private_status = OrderStatus::Created;
    let mut opened = subscription("order_1");
    opened.processor_subscription_id = Some("cp_sub_1".to_string());
    let orders = InMemoryOrders::with(vec![created]);
    let subscriptions = InMemorySubscriptions::with(opened);
    let payments = payments(
        &server.url(),
        &orders,
        &InMemoryRefunds::default(),
        &subscriptions,
    );
    let (raw, signature) = signed(&recurring_callback(
        "order_1",
        "tx_100",
        "CANCELLED",
        "2024-01-01T10:00:00Z",
    ));

    let outcome = payments
        .process_payment_callback("order_1", &raw, &signature)
        .await;

    assert_eq!(outcome, CallbackOutcome::Processed);
    assert!(!subscriptions.get("subscription_1").is_active);
}
