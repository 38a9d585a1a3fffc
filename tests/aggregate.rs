//! Integration tests for the all-categories fetch: partial success, ordering,
//! and the authentication short-circuit.
//!
//! Each test runs its own mock news API. Response delays control which
//! category completes first.

use headlines::news::{AuthPolicy, Category, NewsClient, NewsError, RequestBuilder};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Barrier};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_ERROR: &str = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid or incorrect."}"#;
const GENERIC_ERROR: &str =
    r#"{"status":"error","code":"parameterInvalid","message":"Bad parameter"}"#;

fn client_for(server: &MockServer) -> NewsClient {
    let requests = RequestBuilder::new(
        &server.uri(),
        SecretString::from("integration-key".to_string()),
        "en",
    )
    .unwrap();
    NewsClient::new(reqwest::Client::new(), requests)
}

/// Body with one article whose title names the category.
fn ok_body(category: Category) -> String {
    format!(
        r#"{{"status":"ok","totalResults":1,"articles":[{{"source":{{"id":null,"name":"Wire"}},"title":"{c} story","url":"https://example.com/{c}","publishedAt":"2024-06-01T12:00:00Z"}}]}}"#,
        c = category.wire_id()
    )
}

async fn mount(server: &MockServer, category: Category, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("category", category.wire_id()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn ok_after(category: Category, delay: Duration) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(ok_body(category))
        .set_delay(delay)
}

// ============================================================================
// Partial success and ordering
// ============================================================================

#[tokio::test]
async fn test_all_categories_succeed_sorted_by_rank() {
    let server = MockServer::start().await;
    // Reverse rank order in completion: highest rank answers first
    for (i, category) in Category::ALL.into_iter().enumerate() {
        let delay = Duration::from_millis(20 * (Category::ALL.len() - i) as u64);
        mount(&server, category, ok_after(category, delay)).await;
    }

    let sections = client_for(&server).fetch_all_categories().await.unwrap();

    let order: Vec<Category> = sections.iter().map(|s| s.category).collect();
    assert_eq!(order, Category::ALL.to_vec());
    for section in &sections {
        assert_eq!(section.articles.len(), 1);
        assert_eq!(
            section.articles[0].title,
            format!("{} story", section.category.wire_id())
        );
    }
}

#[tokio::test]
async fn test_failed_categories_are_dropped() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = match category {
            Category::Business => ResponseTemplate::new(500).set_body_string("upstream down"),
            Category::Health => ResponseTemplate::new(403).set_body_string(GENERIC_ERROR),
            Category::Science => ResponseTemplate::new(200).set_body_string("not json"),
            other => ok_after(other, Duration::ZERO),
        };
        mount(&server, category, response).await;
    }

    let sections = client_for(&server).fetch_all_categories().await.unwrap();

    let order: Vec<Category> = sections.iter().map(|s| s.category).collect();
    assert_eq!(
        order,
        vec![
            Category::General,
            Category::Technology,
            Category::Entertainment,
            Category::Sports,
        ]
    );
}

#[tokio::test]
async fn test_empty_article_list_is_kept() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::Sports {
            ResponseTemplate::new(200).set_body_string(r#"{"status":"ok","articles":[]}"#)
        } else {
            ok_after(category, Duration::ZERO)
        };
        mount(&server, category, response).await;
    }

    let sections = client_for(&server).fetch_all_categories().await.unwrap();

    assert_eq!(sections.len(), Category::ALL.len());
    let sports = sections
        .iter()
        .find(|s| s.category == Category::Sports)
        .unwrap();
    assert!(sports.articles.is_empty());
}

#[tokio::test]
async fn test_every_category_failing_yields_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(Category::ALL.len() as u64)
        .mount(&server)
        .await;

    let sections = client_for(&server).fetch_all_categories().await.unwrap();
    assert!(sections.is_empty());
}

// ============================================================================
// Authentication short-circuit
// ============================================================================

#[tokio::test]
async fn test_first_completed_auth_failure_aborts() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::Technology {
            ResponseTemplate::new(401).set_body_string(AUTH_ERROR)
        } else {
            ok_after(category, Duration::from_secs(5))
        };
        mount(&server, category, response).await;
    }

    let started = Instant::now();
    let err = client_for(&server)
        .fetch_all_categories()
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    assert_eq!(err.to_string(), "Your API key is invalid or incorrect.");
    // Returned without waiting for the slow categories
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_late_auth_failure_aborts_with_default_policy() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::Sports {
            ResponseTemplate::new(401)
                .set_body_string(AUTH_ERROR)
                .set_delay(Duration::from_millis(300))
        } else {
            ok_after(category, Duration::ZERO)
        };
        mount(&server, category, response).await;
    }

    let err = client_for(&server)
        .fetch_all_categories()
        .await
        .unwrap_err();
    assert!(matches!(err, NewsError::Api { .. }));
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_late_auth_failure_dropped_with_first_completion_policy() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::Sports {
            ResponseTemplate::new(401)
                .set_body_string(AUTH_ERROR)
                .set_delay(Duration::from_millis(300))
        } else {
            ok_after(category, Duration::ZERO)
        };
        mount(&server, category, response).await;
    }

    let client = client_for(&server).with_auth_policy(AuthPolicy::FirstCompletion);
    let sections = client.fetch_all_categories().await.unwrap();

    assert_eq!(sections.len(), Category::ALL.len() - 1);
    assert!(sections.iter().all(|s| s.category != Category::Sports));
}

#[tokio::test]
async fn test_first_completion_policy_still_aborts_on_first_result() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::General {
            ResponseTemplate::new(401).set_body_string(AUTH_ERROR)
        } else {
            ok_after(category, Duration::from_millis(500))
        };
        mount(&server, category, response).await;
    }

    let client = client_for(&server).with_auth_policy(AuthPolicy::FirstCompletion);
    let err = client.fetch_all_categories().await.unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_generic_403_does_not_abort() {
    let server = MockServer::start().await;
    for category in Category::ALL {
        let response = if category == Category::General {
            ResponseTemplate::new(403).set_body_string(GENERIC_ERROR)
        } else {
            ok_after(category, Duration::from_millis(100))
        };
        mount(&server, category, response).await;
    }

    let sections = client_for(&server).fetch_all_categories().await.unwrap();
    assert_eq!(sections.len(), Category::ALL.len() - 1);
    assert_eq!(sections[0].category, Category::Business);
}

// ============================================================================
// Cancellation of outstanding requests
// ============================================================================

/// Raw HTTP server that never answers, except for `answer`, which gets a 401
/// once every category has connected.
struct HoldingServer {
    base: String,
    /// Category of each request received
    connected: mpsc::UnboundedReceiver<Category>,
    /// Category of each held request the client hung up on
    closed: mpsc::UnboundedReceiver<Category>,
}

async fn start_holding_server(answer: Option<Category>) -> HoldingServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (connected_tx, connected) = mpsc::unbounded_channel();
    let (closed_tx, closed) = mpsc::unbounded_channel();
    let all_connected = Arc::new(Barrier::new(Category::ALL.len()));

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let connected_tx = connected_tx.clone();
            let closed_tx = closed_tx.clone();
            let all_connected = all_connected.clone();
            tokio::spawn(async move {
                let head = read_request_head(&mut socket).await;
                let Some(category) = Category::ALL
                    .into_iter()
                    .find(|c| head.contains(&format!("category={}", c.wire_id())))
                else {
                    return;
                };
                let _ = connected_tx.send(category);

                if answer.is_some() {
                    all_connected.wait().await;
                }
                if answer == Some(category) {
                    let response = format!(
                        "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        AUTH_ERROR.len(),
                        AUTH_ERROR
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    return;
                }

                // Nothing more is sent by the client, so any read result
                // means it hung up
                let mut buf = [0u8; 64];
                let _ = socket.read(&mut buf).await;
                let _ = closed_tx.send(category);
            });
        }
    });

    HoldingServer {
        base,
        connected,
        closed,
    }
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn client_for_base(base: &str) -> NewsClient {
    let requests = RequestBuilder::new(
        base,
        SecretString::from("integration-key".to_string()),
        "en",
    )
    .unwrap();
    NewsClient::new(reqwest::Client::new(), requests)
}

/// Waits up to two seconds for `count` held connections to be closed.
async fn closed_categories(
    closed: &mut mpsc::UnboundedReceiver<Category>,
    count: usize,
) -> Vec<Category> {
    let mut seen = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(2), async {
        while seen.len() < count {
            match closed.recv().await {
                Some(category) => seen.push(category),
                None => break,
            }
        }
    })
    .await;
    seen.sort_by_key(|c| c.sort_rank());
    seen
}

#[tokio::test]
async fn test_auth_failure_drops_outstanding_requests() {
    let mut server = start_holding_server(Some(Category::General)).await;

    let err = client_for_base(&server.base)
        .fetch_all_categories()
        .await
        .unwrap_err();
    assert!(err.is_authentication());

    let held: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| *c != Category::General)
        .collect();
    assert_eq!(closed_categories(&mut server.closed, held.len()).await, held);
}

#[tokio::test]
async fn test_dropping_aggregate_drops_outstanding_requests() {
    let mut server = start_holding_server(None).await;
    let client = client_for_base(&server.base);

    let mut fetch = Box::pin(client.fetch_all_categories());
    tokio::select! {
        _ = &mut fetch => panic!("fetch finished although every request is held"),
        _ = async {
            for _ in 0..Category::ALL.len() {
                server.connected.recv().await;
            }
        } => {}
    }
    drop(fetch);

    assert_eq!(
        closed_categories(&mut server.closed, Category::ALL.len()).await,
        Category::ALL.to_vec()
    );
}
