use httpmock::prelude::*;
use serde_json::json;
use tempmail_client::{AddressOptions, Error, Provider, kyfudao, normalize_all};

fn client(server: &MockServer) -> kyfudao::Client {
    kyfudao::Client::builder()
        .api_url(server.url("/apis.php"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn issue_address_records_storage_alias() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis.php")
                .header("x-requested-with", "XMLHttpRequest")
                .body_contains("ajax=create_email")
                .body_contains("prefix=alice");
            then.status(200).json_body(json!({
                "success": true,
                "email": "alice@01022.hk",
                "storage_email": "s_8812@store.01022.hk",
                "expires": "2024-01-16 10:30:00"
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis.php")
                .body_contains("ajax=delete_email")
                .body_contains("email=alice%4001022.hk")
                .body_contains("storage_email=s_8812%40store.01022.hk");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let client = client(&server);
    let inbox = client
        .issue_address(&AddressOptions::new().local_part("alice"))
        .await
        .unwrap();

    assert_eq!(inbox.address, "alice@01022.hk");
    assert_eq!(inbox.storage_address(), "s_8812@store.01022.hk");
    assert_eq!(inbox.expires, Some(json!("2024-01-16 10:30:00")));

    client.clear_inbox(&inbox).await.unwrap();

    create.assert_hits_async(1).await;
    delete.assert_hits_async(1).await;
}

#[tokio::test]
async fn success_false_on_200_is_a_request_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php").body_contains("ajax=check_mail");
            then.status(200)
                .json_body(json!({"success": false, "message": "quota exceeded"}));
        })
        .await;

    let err = client(&server)
        .list_messages(&kyfudao::Inbox::new("alice@01022.hk"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { status: Some(200), .. }));
    assert_eq!(err.request_message(), Some("quota exceeded"));
}

#[tokio::test]
async fn listing_normalizes_entries() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis.php")
                .body_contains("ajax=check_mail")
                .body_contains("email=alice%4001022.hk");
            then.status(200).json_body(json!({
                "success": true,
                "mails": [
                    {"id": 1, "from": "Shop <shop@x.io>", "subject": "Receipt", "date": "2024-01-15 10:30:00"},
                    {"id": 2, "subject": "Second"}
                ]
            }));
        })
        .await;

    let inbox = kyfudao::Inbox::new("alice@01022.hk");
    let messages = client(&server).list_messages(&inbox).await.unwrap();
    let emails = normalize_all(&messages, &inbox.address);

    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].id, "1");
    assert_eq!(emails[0].created_at, 1_705_314_600);
    assert_eq!(emails[1].to[0].address, "alice@01022.hk");
}

#[tokio::test]
async fn missing_mail_array_is_an_empty_inbox() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let messages = client(&server)
        .list_messages(&kyfudao::Inbox::new("alice@01022.hk"))
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn non_json_body_is_a_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server)
        .list_messages(&kyfudao::Inbox::new("alice@01022.hk"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResponseParse(_)));
}

#[tokio::test]
async fn get_message_sends_id_and_address() {
    let server = MockServer::start_async().await;
    let detail = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis.php")
                .body_contains("ajax=get_email")
                .body_contains("id=42");
            then.status(200).json_body(json!({
                "success": true,
                "id": 42,
                "subject": "Code",
                "html": "<b>7781</b>"
            }));
        })
        .await;

    let inbox = kyfudao::Inbox::new("alice@01022.hk");
    let raw = client(&server).get_message(&inbox, "42").await.unwrap();
    let email = raw.normalize(&inbox.address).unwrap();

    assert_eq!(email.id, "42");
    assert_eq!(email.html, "<b>7781</b>");
    detail.assert_hits_async(1).await;
}

#[tokio::test]
async fn domains_are_listed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php").body_contains("ajax=get_domains");
            then.status(200)
                .json_body(json!({"success": true, "domains": ["01022.hk", "kyfudao.com"]}));
        })
        .await;

    let domains = client(&server).domains().await.unwrap();
    assert_eq!(domains, vec!["01022.hk", "kyfudao.com"]);
}

#[tokio::test]
async fn blank_identifiers_fail_before_any_request() {
    let server = MockServer::start_async().await;
    let endpoint = server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let client = client(&server);
    let err = client
        .get_message(&kyfudao::Inbox::new("alice@01022.hk"), "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = client
        .clear_inbox(&kyfudao::Inbox::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    endpoint.assert_hits_async(0).await;
}

#[tokio::test]
async fn numeric_success_flag_counts_as_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apis.php").body_contains("ajax=check_mail");
            then.status(200)
                .json_body(json!({"success": 1, "mails": [{"id": 7, "subject": "Hi"}]}));
        })
        .await;

    let messages = client(&server)
        .list_messages(&kyfudao::Inbox::new("alice@01022.hk"))
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
}
