//! Client lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through the default ureq transport.

use emqx_admin_core::{
    ApiError, ClientQueryFilter, ConnectionState, Credentials, EmqxClient, QoS, UreqTransport,
};
use mock_server::{demo_clients, MockClient};

/// Serve `clients` on a random local port and return the base URL.
fn start_server(app_id: &str, app_secret: &str, clients: Vec<MockClient>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let router = mock_server::app_with(app_id, app_secret, clients);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, router).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn client_lifecycle() {
    let base = start_server("admin", "public", demo_clients());
    let client = EmqxClient::new(&base, "admin", "public");

    // Step 1: list everything.
    let page = client.list_clients(&ClientQueryFilter::default()).unwrap();
    assert_eq!(page.client_ids(), vec!["thermostat-1", "thermostat-2", "gateway-7"]);
    assert_eq!(page.meta.count, 3);

    // Step 2: list connected only.
    let filter = ClientQueryFilter {
        conn_state: Some(ConnectionState::Connected),
        ..Default::default()
    };
    let page = client.list_clients(&filter).unwrap();
    assert_eq!(page.client_ids(), vec!["thermostat-1", "gateway-7"]);
    assert!(page.find("thermostat-2").is_none());

    // Step 3: clean_start=false is a real filter.
    let filter = ClientQueryFilter {
        clean_start: Some(false),
        ..Default::default()
    };
    let page = client.list_clients(&filter).unwrap();
    assert_eq!(page.client_ids(), vec!["thermostat-2"]);
    let offline = page.find("thermostat-2").unwrap();
    assert!(!offline.connected);
    assert_eq!(offline.disconnected_at.as_deref(), Some("2024-01-01 01:00:00"));

    // Step 4: pagination.
    let filter = ClientQueryFilter {
        page: Some(2),
        limit: Some(2),
        ..Default::default()
    };
    let page = client.list_clients(&filter).unwrap();
    assert_eq!(page.client_ids(), vec!["gateway-7"]);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.limit, 2);

    // Step 5: get one client.
    let record = client.get_client("gateway-7").unwrap();
    assert_eq!(record.proto_ver, 4);
    assert_eq!(record.username, "gateway");
    assert_eq!(record.subscriptions_cnt, 0);

    // Step 6: subscribe, visible in the subscription count.
    client
        .subscribe("gateway-7", "site/+/status", QoS::AtLeastOnce)
        .unwrap();
    assert_eq!(client.get_client("gateway-7").unwrap().subscriptions_cnt, 1);

    // Step 7: unsubscribe.
    client.unsubscribe("gateway-7", "site/+/status").unwrap();
    assert_eq!(client.get_client("gateway-7").unwrap().subscriptions_cnt, 0);

    // Step 8: delete.
    client.delete_client("gateway-7").unwrap();

    // Step 9: get after delete fails with the server's body.
    let err = client.get_client("gateway-7").unwrap_err();
    assert!(err.is_not_found());

    // Step 10: delete again carries the diagnostic body.
    match client.delete_client("gateway-7").unwrap_err() {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Client not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Step 11: subscribing an unknown client is an error.
    let err = client.subscribe("gateway-7", "t", QoS::AtMostOnce).unwrap_err();
    assert!(err.is_not_found());

    // Step 12: list reflects the deletion.
    let page = client.list_clients(&ClientQueryFilter::default()).unwrap();
    assert_eq!(page.len(), 2);
}

#[test]
fn wrong_credentials_are_rejected() {
    let base = start_server("admin", "public", demo_clients());
    let client = EmqxClient::new(&base, "admin", "wrong");

    let err = client.list_clients(&ClientQueryFilter::default()).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn client_ids_with_reserved_characters_reach_the_server() {
    let base = start_server("admin", "public", vec![MockClient::new("floor 2/room#7")]);
    let client = EmqxClient::new(&base, "admin", "public");

    let record = client.get_client("floor 2/room#7").unwrap();
    assert_eq!(record.clientid, "floor 2/room#7");
    client.delete_client("floor 2/room#7").unwrap();
}

/// Clients whose list page serializes to well over 10 MiB.
fn bulky_clients() -> Vec<MockClient> {
    (0..6000)
        .map(|i| {
            let mut client = MockClient::new(&format!("bulk-{i}"));
            client.username = "u".repeat(2000);
            client
        })
        .collect()
}

#[test]
fn large_list_page_is_read_in_full() {
    let base = start_server("admin", "public", bulky_clients());
    let client = EmqxClient::new(&base, "admin", "public");

    let page = client.list_clients(&ClientQueryFilter::default()).unwrap();
    assert_eq!(page.len(), 6000);
    assert_eq!(page.meta.count, 6000);
    assert_eq!(page.client_ids()[5999], "bulk-5999");
    assert_eq!(page.items[0].username.len(), 2000);
}

#[test]
fn explicit_body_limit_is_enforced() {
    let base = start_server("admin", "public", bulky_clients());
    let transport = UreqTransport::new().with_body_limit(64 * 1024);
    let client = EmqxClient::with_transport(Credentials::new(&base, "admin", "public"), transport);

    let err = client.list_clients(&ClientQueryFilter::default()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = EmqxClient::new(&format!("http://127.0.0.1:{port}"), "admin", "public");

    let err = client.get_client("anyone").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
