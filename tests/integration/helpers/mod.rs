// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use seisbatch::batch::ProgressObserver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::MockServer;

/// 模拟服务的地址前缀
pub const SERVICE_PATH: &str = "/designmaps/";

/// 启动模拟服务，返回服务地址
pub async fn start_service() -> (MockServer, String) {
    let server = MockServer::start().await;
    let base_url = format!("{}{}", server.uri(), SERVICE_PATH);
    (server, base_url)
}

/// 服务端看到的连接统计
#[derive(Default)]
pub struct ConnectionStats {
    open: AtomicUsize,
    peak: AtomicUsize,
    accepted: AtomicUsize,
}

impl ConnectionStats {
    /// 同时打开的连接数峰值
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// 接受过的连接总数
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    fn opened(&self) {
        let current = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 每个响应正文的大小，超过套接字缓冲区，客户端不读取时连接无法结束
pub const LARGE_BODY_SIZE: usize = 512 * 1024;

/// 启动按连接计数的 HTTP/1.1 服务，返回服务地址
///
/// 每个连接只处理一个请求，响应带 `Connection: close`。连接从收到请求头
/// 开始算作打开，直到客户端关闭为止，所以未读取正文的响应会一直占用连接。
pub async fn start_counting_service() -> (Arc<ConnectionStats>, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stats = Arc::new(ConnectionStats::default());

    let accept_stats = stats.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            accept_stats.accepted.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve_connection(stream, accept_stats.clone()));
        }
    });

    (stats, format!("http://{}{}", addr, SERVICE_PATH))
}

async fn serve_connection(mut stream: TcpStream, stats: Arc<ConnectionStats>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    // 先让已结束连接的 EOF 被处理，避免把刚释放的连接算进峰值
    tokio::time::sleep(Duration::from_millis(20)).await;
    stats.opened();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let body = vec![b'x'; LARGE_BODY_SIZE];
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if stream.write_all(head.as_bytes()).await.is_ok() && stream.write_all(&body).await.is_ok() {
        while let Ok(n) = stream.read(&mut buf).await {
            if n == 0 {
                break;
            }
        }
    }
    stats.closed();
}

/// 记录所有进度回调
#[derive(Default)]
pub struct RecordingObserver {
    values: Mutex<Vec<f64>>,
    finished: AtomicUsize,
}

impl RecordingObserver {
    pub fn values(&self) -> Vec<f64> {
        self.values.lock().clone()
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// 进度单调不减且以 1.0 结束
    pub fn assert_completed(&self) {
        let values = self.values();
        assert_eq!(values.first(), Some(&0.0), "first progress must be 0.0");
        assert_eq!(values.last(), Some(&1.0), "last progress must be 1.0");
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "progress decreased: {:?}",
            values
        );
        assert_eq!(self.finished(), 1);
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, fraction: f64) {
        self.values.lock().push(fraction);
    }

    fn on_finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}
