//! Integration tests for the broadcast server, using an in-process server and
//! real WebSocket clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use fanout_server::{
    config::{InputMode, ServerConfig},
    domain::ConnectionRegistry,
    infrastructure::registry::InMemoryConnectionRegistry,
    ui::{
        Server, ServerError,
        operator::OperatorInput,
    },
    usecase::{BroadcastMessageUseCase, ConnectUseCase, DisconnectUseCase, GetConnectionsUseCase},
};
use fanout_shared::time::SystemClock;
use futures_util::StreamExt;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE: Duration = Duration::from_millis(200);

fn create_server(registry: Arc<InMemoryConnectionRegistry>) -> Server {
    Server::new(
        Arc::new(ConnectUseCase::new(registry.clone(), Arc::new(SystemClock))),
        Arc::new(DisconnectUseCase::new(registry.clone())),
        Arc::new(BroadcastMessageUseCase::new(registry.clone())),
        Arc::new(GetConnectionsUseCase::new(registry)),
    )
}

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    registry: Arc<InMemoryConnectionRegistry>,
    operator: mpsc::UnboundedSender<OperatorInput>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let server = create_server(registry.clone());

        let (operator, operator_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(server.serve(listener, operator_rx, async move {
            let _ = shutdown_rx.await;
        }));

        TestServer {
            addr,
            registry,
            operator,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a client and wait until the server has registered it
    async fn connect(&self) -> Client {
        let before = self.registry.count().await;
        let (client, _response) = connect_async(self.url("/ws"))
            .await
            .expect("Failed to connect");
        self.wait_for_connections(before + 1).await;
        client
    }

    fn type_line(&self, line: &str) {
        self.operator
            .send(OperatorInput::Line(format!("{}\n", line)))
            .expect("operator loop should be running");
    }

    async fn wait_for_connections(&self, expected: usize) {
        let registry = self.registry.clone();
        timeout(RECV_TIMEOUT, async move {
            while registry.count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {} connection(s)", expected));
    }

    async fn stop(mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let task = self.task.take().unwrap();
        timeout(RECV_TIMEOUT, task)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Next text frame, skipping control frames. `None` on close, error or timeout.
async fn next_text(client: &mut Client) -> Option<String> {
    loop {
        match timeout(RECV_TIMEOUT, client.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(text.as_str().to_string()),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = timeout(SILENCE, client.next()).await;
    assert!(result.is_err(), "expected no frame, got {:?}", result);
}

#[tokio::test]
async fn test_hello_world_scenario() {
    // テスト項目: A, B 接続 → "hello" は両方に届く。A 切断 → "world" は B にだけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    server.type_line("hello");

    // then (期待する結果):
    assert_eq!(next_text(&mut alice).await.as_deref(), Some("hello"));
    assert_eq!(next_text(&mut bob).await.as_deref(), Some("hello"));

    // when (操作): A が切断してから "world"
    alice.close(None).await.expect("Failed to close alice");
    server.wait_for_connections(1).await;
    server.type_line("world");

    // then (期待する結果):
    assert_eq!(next_text(&mut bob).await.as_deref(), Some("world"));
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_each_client_receives_exactly_one_frame() {
    // テスト項目: 3 クライアントがそれぞれちょうど 1 通ずつ受け取る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(server.connect().await);
    }

    // when (操作):
    server.type_line("M");

    // then (期待する結果):
    for client in clients.iter_mut() {
        assert_eq!(next_text(client).await.as_deref(), Some("M"));
        assert_silent(client).await;
    }
}

#[tokio::test]
async fn test_messages_arrive_verbatim_and_in_operator_order() {
    // テスト項目: 空白や空行を含むメッセージがそのまま入力順に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    // when (操作):
    server.type_line("  leading and trailing  ");
    server.type_line("");
    server.type_line("日本語も送れる");

    // then (期待する結果):
    assert_eq!(
        next_text(&mut client).await.as_deref(),
        Some("  leading and trailing  ")
    );
    assert_eq!(next_text(&mut client).await.as_deref(), Some(""));
    assert_eq!(
        next_text(&mut client).await.as_deref(),
        Some("日本語も送れる")
    );
}

#[tokio::test]
async fn test_broadcast_without_clients_is_not_replayed() {
    // テスト項目: 接続 0 件のブロードキャストはエラーにならず、後から接続した人にも届かない
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    server.type_line("into the void");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut late = server.connect().await;
    server.type_line("for late");

    // then (期待する結果):
    assert_eq!(next_text(&mut late).await.as_deref(), Some("for late"));
}

#[tokio::test]
async fn test_abrupt_disconnect_is_removed_and_isolated() {
    // テスト項目: Close なしで切断したクライアントは削除され、他のクライアントには影響しない
    // given (前提条件):
    let server = TestServer::start().await;
    let dropped = server.connect().await;
    let mut survivor = server.connect().await;

    // when (操作):
    drop(dropped);
    server.wait_for_connections(1).await;
    server.type_line("still here");

    // then (期待する結果):
    assert_eq!(next_text(&mut survivor).await.as_deref(), Some("still here"));
}

#[tokio::test]
async fn test_root_path_accepts_websocket() {
    // テスト項目: "/" でも WebSocket 接続できる
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (mut client, _response) = connect_async(server.url("/")).await.unwrap();
    server.wait_for_connections(1).await;
    server.type_line("root");

    // then (期待する結果):
    assert_eq!(next_text(&mut client).await.as_deref(), Some("root"));
}

#[tokio::test]
async fn test_http_endpoints_reflect_registry() {
    // テスト項目: /api/health と /api/connections が状態を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let http = reqwest::Client::new();
    let mut client = server.connect().await;

    // when (操作):
    let health: serde_json::Value = http
        .get(server.http_url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let connections: serde_json::Value = http
        .get(server.http_url("/api/connections"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, serde_json::json!({"status": "ok"}));
    assert_eq!(connections["count"], 1);
    assert_eq!(connections["connections"].as_array().unwrap().len(), 1);

    // when (操作): 切断後
    client.close(None).await.unwrap();
    server.wait_for_connections(0).await;
    let connections: serde_json::Value = http
        .get(server.http_url("/api/connections"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(connections["count"], 0);
}

#[tokio::test]
async fn test_shutdown_closes_open_connections() {
    // テスト項目: サーバ停止時にクライアントへ Close フレームが送られ、登録が空になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = server.connect().await;
    let registry = server.registry.clone();

    // when (操作):
    let result = server.stop().await;

    // then (期待する結果):
    assert!(result.is_ok());
    let frame = timeout(RECV_TIMEOUT, client.next()).await.unwrap();
    assert!(
        matches!(frame, Some(Ok(Message::Close(_))) | None | Some(Err(_))),
        "expected close, got {:?}",
        frame
    );
    assert_eq!(registry.count().await, 0);
}

#[tokio::test]
async fn test_operator_interrupt_stops_server() {
    // テスト項目: オペレータの Ctrl+C (Interrupted) でサーバが停止する
    // given (前提条件):
    let mut server = TestServer::start().await;
    let _client = server.connect().await;

    // when (操作):
    server.operator.send(OperatorInput::Interrupted).unwrap();
    let task = server.task.take().unwrap();

    // then (期待する結果):
    let result = timeout(RECV_TIMEOUT, task).await.expect("server did not stop");
    assert!(result.unwrap().is_ok());
}

#[tokio::test]
async fn test_end_of_operator_input_keeps_serving() {
    // テスト項目: オペレータ入力が終わってもサーバは接続を受け付け続ける
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let (operator, operator_rx) = mpsc::unbounded_channel::<OperatorInput>();
    drop(operator);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(create_server(registry.clone()).serve(
        listener,
        operator_rx,
        async move {
            let _ = shutdown_rx.await;
        },
    ));

    // when (操作):
    tokio::time::sleep(Duration::from_millis(50)).await;
    let connected = connect_async(format!("ws://{}/ws", addr)).await;

    // then (期待する結果):
    assert!(connected.is_ok());
    assert!(!task.is_finished());

    let _ = shutdown_tx.send(());
    assert!(timeout(RECV_TIMEOUT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    // テスト項目: 使用中のポートへの bind は ServerError::Bind になる
    // given (前提条件):
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        input_mode: InputMode::Pipe,
        ..ServerConfig::default()
    };
    let server = create_server(Arc::new(InMemoryConnectionRegistry::new()));

    // when (操作):
    let result = server.run(config).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ServerError::Bind { .. })));
}

#[tokio::test]
async fn test_failed_handshake_is_never_registered() {
    // テスト項目: Upgrade ヘッダなしのリクエストは 4xx で拒否され、登録されず、他の接続にも影響しない
    // given (前提条件):
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    // when (操作):
    let response = http.get(server.http_url("/ws")).send().await.unwrap();

    // then (期待する結果):
    assert!(
        response.status().is_client_error(),
        "expected 4xx, got {}",
        response.status()
    );
    assert_eq!(server.registry.count().await, 0);

    // when (操作): 正常なクライアントが後から接続する
    let mut client = server.connect().await;
    server.type_line("after failed handshake");

    // then (期待する結果):
    assert_eq!(
        next_text(&mut client).await.as_deref(),
        Some("after failed handshake")
    );
    assert_eq!(server.registry.count().await, 1);
}
