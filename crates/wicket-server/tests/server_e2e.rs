//! End-to-end tests against a real listener on 127.0.0.1.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use wicket_core::{
    page_fn, BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt,
};
use wicket_server::{
    LifecycleManager, LifecycleState, Server, ServerConfig, ShutdownError, ShutdownSignal,
};
use wicket_telemetry::AccessLogSink;

/// A page that records entry and then sleeps.
struct SlowPage {
    entered: Arc<AtomicUsize>,
    delay: Duration,
}

impl PageHandler for SlowPage {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async move {
            self.entered.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Response::html("done"))
        })
    }
}

struct TestServer {
    addr: SocketAddr,
    lifecycle: LifecycleManager,
    shutdown: ShutdownSignal,
    handle: JoinHandle<Result<(), ShutdownError>>,
    sink: Arc<AccessLogSink>,
    entered: Arc<AtomicUsize>,
    _dir: TempDir,
}

impl TestServer {
    async fn start(slow_delay: Duration, drain_deadline: Duration) -> Self {
        let dir = TempDir::new().unwrap();
        let sink =
            Arc::new(AccessLogSink::open(dir.path().join("server_log.log"), "http:").unwrap());
        let entered = Arc::new(AtomicUsize::new(0));

        let slow: Arc<dyn PageHandler> = Arc::new(SlowPage {
            entered: Arc::clone(&entered),
            delay: slow_delay,
        });
        let index: Arc<dyn PageHandler> =
            Arc::new(page_fn("index", |_, _| Ok(Response::html("<h1>index</h1>"))));

        let config = ServerConfig::builder()
            .listen_addr("127.0.0.1:0")
            .write_timeout(Duration::from_secs(30))
            .drain_deadline(drain_deadline)
            .build();

        let server = Server::builder()
            .config(config)
            .access_log(Arc::clone(&sink))
            .page("/", index)
            .page("/slow", slow)
            .build()
            .unwrap();

        let bound = server.bind().await.unwrap();
        let addr = bound.local_addr();
        let lifecycle = bound.lifecycle().clone();
        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(bound.serve(shutdown.clone()));

        Self {
            addr,
            lifecycle,
            shutdown,
            handle,
            sink,
            entered,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn wait_until_entered(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while self.entered.load(Ordering::SeqCst) < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("slow requests should reach the page");
    }

    async fn stop(self) -> (Result<(), ShutdownError>, String, LifecycleManager) {
        self.shutdown.trigger();
        let result = self.handle.await.unwrap();
        let log = String::from_utf8(self.sink.contents().unwrap()).unwrap();
        (result, log, self.lifecycle)
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn request_id_of(line: &str) -> &str {
    line.split(' ').nth(3).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn inbound_request_id_is_echoed_and_logged() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;

    let response = client()
        .get(server.url("/"))
        .header("X-Request-Id", "abc-123")
        .header("User-Agent", "e2e-test")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(response.text().await.unwrap(), "<h1>index</h1>");

    let (result, log, _) = server.stop().await;
    result.unwrap();

    let line = log.lines().next().unwrap();
    let fields: Vec<&str> = line.split(' ').collect();
    assert_eq!(fields.len(), 8, "{line}");
    assert_eq!(fields[2], "http:");
    assert_eq!(fields[3], "abc-123");
    assert_eq!(fields[4], "GET");
    assert_eq!(fields[5], "/");
    assert!(fields[6].starts_with("127.0.0.1:"));
    assert_eq!(fields[7], "e2e-test");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn non_ascii_request_id_is_echoed_byte_for_byte() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;

    let response = client()
        .get(server.url("/"))
        .header(
            "X-Request-Id",
            reqwest::header::HeaderValue::from_bytes("café-42".as_bytes()).unwrap(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["x-request-id"].as_bytes(),
        "café-42".as_bytes()
    );

    let (result, log, _) = server.stop().await;
    result.unwrap();
    assert_eq!(request_id_of(log.lines().next().unwrap()), "café-42");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn missing_request_ids_are_generated() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;
    let client = client();
    let permits = Arc::new(Semaphore::new(32));

    let mut tasks = Vec::with_capacity(1000);
    for _ in 0..1000 {
        let client = client.clone();
        let url = server.url("/");
        let permits = Arc::clone(&permits);
        tasks.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.unwrap();
            let response = client.get(url).send().await.unwrap();
            response.headers()["x-request-id"]
                .to_str()
                .unwrap()
                .to_string()
        }));
    }

    for task in tasks {
        let id = task.await.unwrap();
        assert!(!id.is_empty());
        assert!(id.parse::<i128>().is_ok(), "unexpected id {id}");
    }

    let (result, log, _) = server.stop().await;
    result.unwrap();
    assert_eq!(log.lines().count(), 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_each_get_one_line() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;
    let client = client();

    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let client = client.clone();
            let url = server.url("/");
            tokio::spawn(async move {
                let response = client
                    .get(url)
                    .header("X-Request-Id", format!("req-{i}"))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(response.status(), 200);
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let (result, log, _) = server.stop().await;
    result.unwrap();

    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 100);
    for line in &lines {
        assert_eq!(line.split(' ').count(), 8, "malformed line: {line}");
    }
    let ids: HashSet<&str> = lines.iter().map(|line| request_id_of(line)).collect();
    let expected: HashSet<String> = (0..100).map(|i| format!("req-{i}")).collect();
    assert_eq!(ids.len(), 100);
    assert!(ids.iter().all(|id| expected.contains(*id)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn log_endpoint_serves_file_contents() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;
    let client = client();

    for i in 0..3 {
        client
            .get(server.url("/"))
            .header("X-Request-Id", format!("seed-{i}"))
            .send()
            .await
            .unwrap();
    }

    let response = client.get(server.url("/log")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let body = response.bytes().await.unwrap();

    let (result, log, _) = server.stop().await;
    result.unwrap();

    // The /log request's own line is written after its body was read.
    assert!(log.as_bytes().starts_with(&body));
    let served = std::str::from_utf8(&body).unwrap();
    let ids: Vec<&str> = served.lines().map(request_id_of).collect();
    assert_eq!(ids, vec!["seed-0", "seed-1", "seed-2"]);
    assert_eq!(log.lines().count(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unknown_path_is_not_found_and_logged() {
    let server = TestServer::start(Duration::ZERO, Duration::from_secs(5)).await;

    let response = client()
        .post(server.url("/nope"))
        .header("X-Request-Id", "missing-page")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["x-request-id"], "missing-page");

    let (result, log, _) = server.stop().await;
    result.unwrap();
    assert!(log.contains(" missing-page POST /nope "));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn health_turns_unavailable_when_drain_starts() {
    let server = TestServer::start(Duration::from_millis(500), Duration::from_secs(5)).await;
    let client = client();

    let response = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.bytes().await.unwrap().is_empty());

    let slow = tokio::spawn(client.get(server.url("/slow")).send());
    server.wait_until_entered(1).await;

    let lifecycle = server.lifecycle.clone();
    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), async {
        while lifecycle.state() != LifecycleState::Draining {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("server should start draining");
    assert!(!lifecycle.health().is_healthy());

    let response = slow.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "done");

    let (result, _, lifecycle) = server.stop().await;
    result.unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::Stopped);
    assert!(!lifecycle.health().is_healthy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_requests_complete_during_drain() {
    let server = TestServer::start(Duration::from_millis(300), Duration::from_secs(10)).await;
    let client = client();

    let requests: Vec<_> = (0..50)
        .map(|i| {
            let request = client
                .get(server.url("/slow"))
                .header("X-Request-Id", format!("slow-{i}"))
                .send();
            tokio::spawn(request)
        })
        .collect();
    server.wait_until_entered(50).await;

    let addr = server.addr;
    let (result, log, lifecycle) = server.stop().await;
    result.unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::Stopped);

    for request in requests {
        let response = request.await.unwrap().unwrap();
        assert_eq!(response.status(), 200);
    }
    assert_eq!(log.lines().count(), 50);

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn drain_deadline_exceeded_fails() {
    let server = TestServer::start(Duration::from_secs(30), Duration::from_millis(200)).await;

    let _stuck = tokio::spawn(client().get(server.url("/slow")).send());
    server.wait_until_entered(1).await;

    let (result, _, lifecycle) = server.stop().await;
    match result {
        Err(ShutdownError::DrainTimeout { deadline, active }) => {
            assert_eq!(deadline, Duration::from_millis(200));
            assert_eq!(active, 1);
        }
        other => panic!("expected drain timeout, got {other:?}"),
    }
    assert_eq!(lifecycle.state(), LifecycleState::Failed);
}
