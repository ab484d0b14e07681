//! Facilitator flows over HTTP against the mock Hiro API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{sip010_transfer, stx_transfer, MockHiro, MockResponse};
use axum::http::StatusCode;
use bytes::Bytes;
use stacks_facilitator::chain::ChainClient;
use stacks_facilitator::payment::{Network, SettleCommand, TransactionId, VerifyCommand};
use stacks_facilitator::Error;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

const TX_ID: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
const SENDER: &str = "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";
const RECIPIENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const OTHER: &str = "ST3J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ8";
const SIGNED_TX: &str = "0x00000001deadbeef";

fn verify_cmd() -> VerifyCommand {
    VerifyCommand {
        tx_id: TX_ID.to_string(),
        token_type: Some("STX".to_string()),
        expected_recipient: RECIPIENT.to_string(),
        min_amount: 500_000,
        expected_sender: Some(SENDER.to_string()),
        expected_memo: None,
        network: "testnet".to_string(),
    }
}

fn settle_cmd() -> SettleCommand {
    SettleCommand {
        signed_transaction: SIGNED_TX.to_string(),
        token_type: Some("STX".to_string()),
        expected_recipient: RECIPIENT.to_string(),
        min_amount: 500_000,
        expected_sender: None,
        network: "testnet".to_string(),
    }
}

fn tx_id() -> TransactionId {
    TransactionId::parse(TX_ID).expect("valid id")
}

#[tokio::test]
async fn test_hiro_client_fetches_transaction() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.script(
        TX_ID,
        vec![stx_transfer(TX_ID, "success", 12345, SENDER, RECIPIENT, 1_000_000, "0x00")],
    );
    let client = hiro.client().expect("client");

    let raw = assert_ok!(client.fetch_transaction(&tx_id(), Network::Testnet).await);

    assert_eq!(raw.tx_id, TX_ID);
    assert_eq!(raw.tx_status, "success");
    assert_eq!(raw.block_height, 12345);
    assert_eq!(raw.fee, "180");
    assert_eq!(raw.sender_address, SENDER);
    let transfer = raw.token_transfer.expect("token transfer payload");
    assert_eq!(transfer.recipient_address, RECIPIENT);
    assert_eq!(transfer.amount, "1000000");
}

#[tokio::test]
async fn test_hiro_client_maps_http_errors() {
    let hiro = MockHiro::start().await.expect("mock server");
    let client = hiro.client().expect("client");

    let missing = assert_err!(client.fetch_transaction(&tx_id(), Network::Mainnet).await);
    assert!(matches!(missing, Error::NotFound(_)));

    hiro.script(
        TX_ID,
        vec![MockResponse::Status(
            StatusCode::SERVICE_UNAVAILABLE,
            "upstream down".to_string(),
        )],
    );
    let unavailable = assert_err!(client.fetch_transaction(&tx_id(), Network::Mainnet).await);
    match unavailable {
        Error::Network(message) => assert!(message.contains("upstream down")),
        other => unreachable!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_hiro_client_broadcasts_octet_stream() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Json(serde_json::json!(TX_ID)));
    let client = hiro.client().expect("client");

    let id = assert_ok!(
        client
            .broadcast(Bytes::from_static(&[0, 0, 0, 1, 0xde, 0xad]), Network::Testnet)
            .await
    );

    assert_eq!(id.as_str(), TX_ID);
    let received = hiro.broadcasts();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, vec![0, 0, 0, 1, 0xde, 0xad]);
    assert_eq!(
        received[0].content_type.as_deref(),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn test_hiro_client_broadcast_rejected() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Status(
        StatusCode::BAD_REQUEST,
        r#"{"error":"transaction rejected","reason":"BadNonce"}"#.to_string(),
    ));
    let client = hiro.client().expect("client");

    let err = assert_err!(client.broadcast(Bytes::from_static(&[1]), Network::Testnet).await);

    match err {
        Error::Broadcast(body) => assert!(body.contains("BadNonce")),
        other => unreachable!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_hiro_client_broadcast_with_malformed_id() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Json(serde_json::json!("garbage")));
    let client = hiro.client().expect("client");

    let err = assert_err!(client.broadcast(Bytes::from_static(&[1]), Network::Testnet).await);

    match err {
        Error::Broadcast(msg) => assert!(msg.contains("unexpected transaction id")),
        other => unreachable!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_verify_stx_payment() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.script(
        TX_ID,
        vec![stx_transfer(TX_ID, "success", 12345, SENDER, RECIPIENT, 1_000_000, "order-1")],
    );
    let facilitator = hiro.facilitator(3).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .verify(
                VerifyCommand {
                    expected_memo: Some("order-1".to_string()),
                    ..verify_cmd()
                },
                &CancellationToken::new()
            )
            .await
    );

    assert!(outcome.valid, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.status, "confirmed");
    assert_eq!(outcome.amount, 1_000_000);
    assert_eq!(outcome.fee, 180);
    assert_eq!(outcome.memo, "order-1");
    assert_eq!(hiro.lookups(TX_ID), 1);
}

#[tokio::test]
async fn test_verify_sip010_payment_to_wrong_recipient() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.script(
        TX_ID,
        vec![sip010_transfer(TX_ID, "success", 900, SENDER, OTHER, 25_000)],
    );
    let facilitator = hiro.facilitator(3).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .verify(
                VerifyCommand {
                    token_type: Some("SBTC".to_string()),
                    min_amount: 20_000,
                    ..verify_cmd()
                },
                &CancellationToken::new()
            )
            .await
    );

    assert!(!outcome.valid);
    assert_eq!(outcome.token_type, "SBTC");
    assert_eq!(outcome.fee, 3000);
    assert_eq!(
        outcome.errors,
        vec![format!("recipient mismatch: expected {RECIPIENT}, got {OTHER}")]
    );
}

#[tokio::test]
async fn test_verify_failed_transaction_reports_every_violation() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.script(
        TX_ID,
        vec![stx_transfer(TX_ID, "failed", 12345, SENDER, OTHER, 100, "")],
    );
    let facilitator = hiro.facilitator(3).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .verify(verify_cmd(), &CancellationToken::new())
            .await
    );

    assert!(!outcome.valid);
    assert_eq!(outcome.status, "failed");
    assert_eq!(outcome.errors.len(), 4);
    assert!(outcome.errors[0].contains("failed"));
    assert!(outcome.errors[1].contains("not confirmed"));
    assert!(outcome.errors[2].contains("recipient mismatch"));
    assert!(outcome.errors[3].contains("insufficient amount"));
}

#[tokio::test]
async fn test_verify_waits_for_indexing() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.script(
        TX_ID,
        vec![
            MockResponse::Status(StatusCode::NOT_FOUND, "not found".to_string()),
            MockResponse::Status(StatusCode::NOT_FOUND, "not found".to_string()),
            stx_transfer(TX_ID, "success", 7, SENDER, RECIPIENT, 600_000, ""),
        ],
    );
    let facilitator = hiro.facilitator(5).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .verify(verify_cmd(), &CancellationToken::new())
            .await
    );

    assert!(outcome.valid);
    assert_eq!(hiro.lookups(TX_ID), 3);
}

#[tokio::test]
async fn test_verify_unknown_transaction_gives_up() {
    let hiro = MockHiro::start().await.expect("mock server");
    let facilitator = hiro.facilitator(2).expect("facilitator");

    let err = assert_err!(
        facilitator
            .verify(verify_cmd(), &CancellationToken::new())
            .await
    );

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(hiro.lookups(TX_ID), 3);
}

#[tokio::test]
async fn test_settle_broadcasts_and_waits_for_confirmation() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Json(serde_json::json!(TX_ID)));
    hiro.script(
        TX_ID,
        vec![
            MockResponse::Status(StatusCode::NOT_FOUND, "not found".to_string()),
            stx_transfer(TX_ID, "pending", 0, SENDER, RECIPIENT, 1_000_000, ""),
            stx_transfer(TX_ID, "pending", 0, SENDER, RECIPIENT, 1_000_000, ""),
            stx_transfer(TX_ID, "success", 501, SENDER, RECIPIENT, 1_000_000, ""),
        ],
    );
    let facilitator = hiro.facilitator(10).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .settle(settle_cmd(), &CancellationToken::new())
            .await
    );

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.status, "confirmed");
    assert_eq!(outcome.block_height, 501);
    assert_eq!(hiro.lookups(TX_ID), 4);

    let received = hiro.broadcasts();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, hex::decode("00000001deadbeef").expect("hex"));
}

#[tokio::test]
async fn test_settle_times_out_as_pending() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Json(serde_json::json!(TX_ID)));
    hiro.script(
        TX_ID,
        vec![stx_transfer(TX_ID, "pending", 0, SENDER, RECIPIENT, 1_000_000, "")],
    );
    let facilitator = hiro.facilitator(3).expect("facilitator");

    let outcome = assert_ok!(
        facilitator
            .settle(settle_cmd(), &CancellationToken::new())
            .await
    );

    assert!(!outcome.success);
    assert_eq!(outcome.status, "pending");
    assert_eq!(outcome.errors, vec!["transaction not confirmed".to_string()]);
    assert_eq!(hiro.lookups(TX_ID), 4);
}

#[tokio::test]
async fn test_settle_cancelled_while_pending() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Json(serde_json::json!(TX_ID)));
    hiro.script(
        TX_ID,
        vec![stx_transfer(TX_ID, "pending", 0, SENDER, RECIPIENT, 1_000_000, "")],
    );
    let facilitator = hiro.facilitator(1_000).expect("facilitator");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = assert_err!(facilitator.settle(settle_cmd(), &cancel).await);

    assert!(err.is_cancelled());
    assert!(hiro.lookups(TX_ID) < 1_000);
}

#[tokio::test]
async fn test_settle_rejected_broadcast_skips_polling() {
    let hiro = MockHiro::start().await.expect("mock server");
    hiro.respond_to_broadcast(MockResponse::Status(
        StatusCode::BAD_REQUEST,
        "NotEnoughFunds".to_string(),
    ));
    let facilitator = hiro.facilitator(3).expect("facilitator");

    let err = assert_err!(
        facilitator
            .settle(settle_cmd(), &CancellationToken::new())
            .await
    );

    assert!(matches!(err, Error::Broadcast(_)));
    assert_eq!(hiro.lookups(TX_ID), 0);
}
