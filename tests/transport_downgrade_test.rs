use std::time::Duration;
use trace_transport::encoder::EncoderFormat;
use trace_transport::{HttpTransport, Span, Trace, TransportConfig};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn create_test_traces() -> Vec<Trace> {
    vec![
        vec![
            Span::new("http.request", "web", "GET /users")
                .with_ids(10, 1, 0)
                .with_timing(1_700_000_000_000_000_000, 5_000_000)
                .with_meta("http.method", "GET"),
            Span::new("db.query", "postgres", "SELECT * FROM users")
                .with_ids(10, 2, 1)
                .with_timing(1_700_000_000_001_000_000, 2_000_000),
        ],
        vec![Span::new("cache.get", "redis", "GET session").with_ids(11, 3, 0)],
    ]
}

fn transport_for(server: &MockServer) -> HttpTransport {
    let address = server.address();
    let config = TransportConfig {
        timeout: Duration::from_secs(5),
        ..TransportConfig::for_agent(&address.ip().to_string(), address.port())
    };
    HttpTransport::new(config).unwrap()
}

#[tokio::test]
async fn test_415_then_success_is_retried_transparently() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.3/traces"))
        .and(header("content-type", "application/msgpack"))
        .respond_with(ResponseTemplate::new(415))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v0.2/traces"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let traces = create_test_traces();

    let response = transport.send(&traces).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.compatibility_mode);
    assert_eq!(response.url, transport.legacy_url());
    assert_eq!(transport.url(), transport.legacy_url());

    for _ in 0..2 {
        let response = transport.send(&traces).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.url, transport.legacy_url());
    }

    assert_eq!(transport.stats().downgrades, 1);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_always_404_downgrades_exactly_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.3/traces"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v0.2/traces"))
        .respond_with(ResponseTemplate::new(404))
        .expect(5)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let traces = create_test_traces();

    for _ in 0..5 {
        // The second rejection is surfaced, not retried
        let response = transport.send(&traces).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(response.compatibility_mode);
        assert_eq!(response.url, transport.legacy_url());
    }

    assert!(transport.is_compatibility_mode());
    assert_eq!(transport.stats().downgrades, 1);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_other_statuses_do_not_downgrade() {
    for status in [200, 400, 413, 500, 503] {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0.3/traces"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport_for(&mock_server);
        let response = transport.send(&create_test_traces()).await.unwrap();

        assert_eq!(response.status, status);
        assert!(!response.compatibility_mode);
        assert!(!transport.is_compatibility_mode());
        assert_eq!(transport.content_type(), "application/msgpack");
        mock_server.verify().await;
    }
}

#[tokio::test]
async fn test_downgraded_payload_uses_legacy_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.3/traces"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v0.2/traces"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let traces = create_test_traces();
    transport.send(&traces).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].url.path(), "/v0.3/traces");
    assert_eq!(EncoderFormat::Msgpack.decode(&requests[0].body).unwrap(), traces);

    assert_eq!(requests[1].url.path(), "/v0.2/traces");
    assert_eq!(EncoderFormat::Json.decode(&requests[1].body).unwrap(), traces);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rejections_downgrade_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.3/traces"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(20)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v0.2/traces"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let mut handles = Vec::new();

    for _ in 0..16 {
        let transport = transport.clone();
        handles.push(tokio::spawn(async move {
            transport.send(&create_test_traces()).await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.url, transport.legacy_url());
    }

    assert_eq!(transport.stats().downgrades, 1);

    // URL and wire format never disagree, whichever state a send observed
    let requests = mock_server.received_requests().await.unwrap();
    for request in &requests {
        let content_type = request.headers.get("content-type").unwrap();
        match request.url.path() {
            "/v0.3/traces" => assert_eq!(content_type, "application/msgpack"),
            "/v0.2/traces" => assert_eq!(content_type, "application/json"),
            other => panic!("unexpected path {other}"),
        }
    }
}
