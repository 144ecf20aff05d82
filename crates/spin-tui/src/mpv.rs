/// mpv JSON IPC driver.
///
/// ```text
///   MpvDriver::spawn_and_connect()
///         │
///         ├── writer_task   ← MpvRequest via mpsc → socket
///         └── reader_task   ← JSON lines from socket
///                                ├── reply (has request_id) → matching oneshot
///                                └── event (no request_id)  → event_tx
/// ```
///
/// `MpvHandle` is cheap to clone; `send()` resolves with mpv's reply.
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

const REPLY_TIMEOUT: tokio::time::Duration = tokio::time::Duration::from_secs(5);

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct MpvRequest {
    req_id: u64,
    line: String,
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// An unsolicited mpv event such as `end-file` or `file-loaded`.
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `reason` field of an `end-file` event (`eof`, `stop`, `error`, …).
    pub fn end_reason(&self) -> Option<&str> {
        self.raw.get("reason")?.as_str()
    }

    pub fn file_error(&self) -> Option<&str> {
        self.raw.get("file_error")?.as_str()
    }
}

// ── handle ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<MpvRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&json!({ "command": command, "request_id": req_id }))?;
        line.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MpvRequest {
                req_id,
                line,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(REPLY_TIMEOUT, reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    async fn set_property(&self, name: &str, value: Value) -> anyhow::Result<()> {
        self.send(json!(["set_property", name, value])).await?;
        Ok(())
    }

    pub async fn load(&self, url: &str) -> anyhow::Result<()> {
        self.send(json!(["loadfile", url, "replace"])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.set_property("pause", json!(paused)).await
    }

    pub async fn seek_to(&self, secs: u32) -> anyhow::Result<()> {
        self.set_property("time-pos", json!(secs)).await
    }

    /// `vol` is 0.0..=1.0; mpv takes a percentage.
    pub async fn set_volume(&self, vol: f32) -> anyhow::Result<()> {
        self.set_property("volume", json!((vol * 100.0).clamp(0.0, 100.0).round()))
            .await
    }

    pub async fn set_mute(&self, muted: bool) -> anyhow::Result<()> {
        self.set_property("mute", json!(muted)).await
    }

    pub async fn set_loop(&self, looping: bool) -> anyhow::Result<()> {
        self.set_property("loop-file", json!(if looping { "inf" } else { "no" }))
            .await
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    binary: PathBuf,
    socket_name: String,
    socket_arg: String,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            socket_name: spin_core::platform::mpv_socket_name(),
            socket_arg: spin_core::platform::mpv_socket_arg(),
            process: None,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        let Some(child) = self.process.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!("mpv process exited: {}", status);
                false
            }
            Err(e) => {
                warn!("mpv process_alive check failed: {}", e);
                false
            }
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
        #[cfg(unix)]
        let _ = tokio::fs::remove_file(&self.socket_name).await;
    }

    fn spawn_process(&mut self, stderr: std::process::Stdio) -> anyhow::Result<()> {
        let child = tokio::process::Command::new(&self.binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg("--pause")
            .arg(&self.socket_arg)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned {:?} pid={:?}", self.binary, child.id());
        self.process = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let stderr_path = spin_core::platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;
        self.spawn_process(stderr_file.into())?;

        let socket_path = PathBuf::from(&self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to {}", socket_path.display());
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(read_half, write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;
        self.spawn_process(std::process::Stdio::null())?;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to {}", pipe_path);
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(read_half, write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(read_half: R, write_half: W, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<MpvRequest>(64);
    tokio::spawn(writer_task(write_half, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));
    MpvHandle { tx: cmd_tx }
}

// ── io tasks ──────────────────────────────────────────────────────────────────

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

/// Turn one reply line into the caller's result.
fn reply_result(val: Value) -> anyhow::Result<Value> {
    match val["error"].as_str() {
        Some("success") => Ok(val),
        Some(err) => Err(anyhow::anyhow!("mpv error: {}", err)),
        None => Err(anyhow::anyhow!("mpv error: malformed reply")),
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };
                if let Some(req_id) = val.get("request_id").and_then(Value::as_u64) {
                    if let Some(tx) = pending.lock().await.remove(&req_id) {
                        let _ = tx.send(reply_result(val));
                    }
                } else {
                    debug!("mpv reader: event {}", trimmed);
                    if event_tx.send(MpvEvent { raw: val }).await.is_err() {
                        break;
                    }
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<MpvRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can always match the reply.
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: req={} {}", req.req_id, req.line.trim());
        if let Err(e) = writer.write_all(req.line.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}
