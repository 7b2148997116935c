use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use broker::{QuoteAdapter, WsConfig, WsQuoteAdapter};
use futures_util::StreamExt;
use tokio::net::TcpListener;

/// Accepts websocket clients and never sends anything back.
struct SilentServer {
    addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    open: Arc<AtomicUsize>,
}

impl SilentServer {
    fn spawn() -> Self {
        let accepted = Arc::new(AtomicUsize::new(0));
        let open = Arc::new(AtomicUsize::new(0));
        let (addr_tx, addr_rx) = mpsc::channel();

        let server_accepted = Arc::clone(&accepted);
        let server_open = Arc::clone(&open);
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("server runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("addr channel");

                while let Ok((tcp, _)) = listener.accept().await {
                    let accepted = Arc::clone(&server_accepted);
                    let open = Arc::clone(&server_open);
                    tokio::spawn(async move {
                        let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                            return;
                        };
                        accepted.fetch_add(1, Ordering::SeqCst);
                        open.fetch_add(1, Ordering::SeqCst);
                        while let Some(Ok(msg)) = ws.next().await {
                            if msg.is_close() {
                                break;
                            }
                        }
                        open.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        });

        Self {
            addr: addr_rx.recv().expect("server address"),
            accepted,
            open,
        }
    }

    fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

fn adapter_for(server: &SilentServer) -> WsQuoteAdapter {
    WsQuoteAdapter::new(WsConfig {
        endpoint: format!("ws://{}", server.addr),
        stale_after_ms: 0,
        ..WsConfig::default()
    })
}

#[test]
fn stale_reconnects_do_not_leave_sockets_open() {
    let server = SilentServer::spawn();
    let mut adapter = adapter_for(&server);

    for round in 1..=5 {
        adapter.connect().expect("connect");
        assert!(wait_until(|| server.accepted() == round), "round {round} never connected");
        assert!(wait_until(|| server.open() == 1), "round {round}: {} open", server.open());
        assert_eq!(adapter.poll_quote().expect("stream is alive"), None);

        thread::sleep(Duration::from_millis(5));
        assert!(adapter.heartbeat().is_err());
        assert!(wait_until(|| server.open() == 0), "round {round}: {} open", server.open());
    }
}

#[test]
fn reconnect_without_heartbeat_replaces_the_reader() {
    let server = SilentServer::spawn();
    let mut adapter = adapter_for(&server);

    for round in 1..=3 {
        adapter.connect().expect("connect");
        assert!(wait_until(|| server.accepted() == round));
    }
    assert!(wait_until(|| server.open() == 1), "{} open", server.open());

    drop(adapter);
    assert!(wait_until(|| server.open() == 0), "{} open after drop", server.open());
}
