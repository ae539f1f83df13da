use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempmail_client::session::SessionStatus;
use tempmail_client::{AddressOptions, Error, Provider, ProviderKind, RawMessage, emailmux};

fn client(server: &MockServer) -> emailmux::Client {
    emailmux::Client::builder()
        .base_url(server.base_url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn session_is_bootstrapped_once() {
    let server = MockServer::start_async().await;
    let landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("set-cookie", "sid=abc; Path=/")
                .body("<html></html>");
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/emails")
                .query_param("email", "x1y2@outlook.com");
            then.status(200).json_body(json!([
                {"uuid": "u1", "sender": "a@b.io", "subject": "One", "timestamp": "2024-01-15T10:30:00"}
            ]));
        })
        .await;

    let client = client(&server);
    assert_eq!(client.session_status(), SessionStatus::NotEstablished);

    let inbox = emailmux::Inbox::new("x1y2@outlook.com");
    client.list_messages(&inbox).await.unwrap();
    let messages = client.list_messages(&inbox).await.unwrap();

    landing.assert_hits_async(1).await;
    listing.assert_hits_async(2).await;
    assert_eq!(client.session_status(), SessionStatus::Established);

    let email = messages[0].normalize(&inbox.address).unwrap();
    assert_eq!(email.id, "u1");
    assert_eq!(email.created_at, 1_705_314_600);
}

#[tokio::test]
async fn concurrent_calls_share_one_bootstrap() {
    let server = MockServer::start_async().await;
    let landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .delay(Duration::from_millis(200))
                .body("<html></html>");
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/emails");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client(&server);
    let inbox = emailmux::Inbox::new("x1y2@outlook.com");

    let (a, b, c) = tokio::join!(
        client.list_messages(&inbox),
        client.list_messages(&inbox),
        client.list_messages(&inbox),
    );
    assert!(a.unwrap().is_empty());
    assert!(b.unwrap().is_empty());
    assert!(c.unwrap().is_empty());

    landing.assert_hits_async(1).await;
    listing.assert_hits_async(3).await;
}

#[tokio::test]
async fn rejected_bootstrap_fails_every_waiter_and_is_retried() {
    let server = MockServer::start_async().await;
    let mut landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(503).body("unavailable");
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/emails");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client(&server);
    let inbox = emailmux::Inbox::new("x1y2@outlook.com");

    let (a, b) = tokio::join!(client.list_messages(&inbox), client.list_messages(&inbox));
    assert!(matches!(a, Err(Error::Session(_))));
    assert!(matches!(b, Err(Error::Session(_))));
    assert_eq!(client.session_status(), SessionStatus::NotEstablished);
    listing.assert_hits_async(0).await;

    landing.delete_async().await;
    landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html></html>");
        })
        .await;

    client.list_messages(&inbox).await.unwrap();
    landing.assert_hits_async(1).await;
    listing.assert_hits_async(1).await;
}

#[tokio::test]
async fn issue_address_generates_then_activates() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html></html>");
        })
        .await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate-email")
                .json_body(json!({"domains": ["gmail_plus"]}));
            then.status(200).json_body(json!({"email": "j.doe+k3@gmail.com"}));
        })
        .await;
    let activate = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/use-email")
                .query_param("email", "j.doe+k3@gmail.com");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let inbox = client(&server)
        .issue_address(&AddressOptions::new().domain("gmail_plus"))
        .await
        .unwrap();

    assert_eq!(inbox.address, "j.doe+k3@gmail.com");
    generate.assert_hits_async(1).await;
    activate.assert_hits_async(1).await;
}

#[tokio::test]
async fn message_page_is_wrapped_as_html() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html></html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/email/u1");
            then.status(200)
                .header("content-type", "text/html")
                .body("<div>Your code is 1234</div>");
        })
        .await;

    let client = client(&server);
    let inbox = emailmux::Inbox::new("x1y2@outlook.com");
    let raw = client.get_message(&inbox, "u1").await.unwrap();

    assert_eq!(raw.provider(), ProviderKind::Emailmux);
    assert!(matches!(raw, RawMessage::EmailmuxContent { .. }));
    let email = raw.normalize(&inbox.address).unwrap();
    assert_eq!(email.id, "u1");
    assert_eq!(email.html, "<div>Your code is 1234</div>");
}

#[tokio::test]
async fn deletion_is_unsupported() {
    let server = MockServer::start_async().await;
    let landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200);
        })
        .await;

    let client = client(&server);
    let inbox = emailmux::Inbox::new("x1y2@outlook.com");

    let err = client.delete_message(&inbox, "u1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Unsupported {
            provider: ProviderKind::Emailmux,
            operation: "delete_message"
        }
    ));
    let err = client.clear_inbox(&inbox).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported { operation: "clear_inbox", .. }));

    landing.assert_hits_async(0).await;
}

#[tokio::test]
async fn empty_address_fails_before_bootstrap() {
    let server = MockServer::start_async().await;
    let landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200);
        })
        .await;

    let err = client(&server)
        .list_messages(&emailmux::Inbox::new(""))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    landing.assert_hits_async(0).await;
}
