//! Playback of the loaded video through an external `mpv` process.
//!
//! Loading a new video always replaces the running process; pause is sent
//! over mpv's JSON IPC socket.

use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::{
  io::{AsyncBufReadExt, BufReader},
  process::{Child, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{debug, info};

const STATUS_FORMAT: &str = "--term-status-msg=${time-pos/full} / ${duration/full} ${?pause==yes:(paused)}";

fn ipc_command(args: &[&str]) -> Vec<u8> {
  let mut line = serde_json::json!({ "command": args }).to_string().into_bytes();
  line.push(b'\n');
  line
}

#[derive(Default)]
pub struct VideoPlayer {
  process: Option<Child>,
  monitor: Option<JoinHandle<()>>,
  status_rx: Option<mpsc::Receiver<String>>,
  last_status: Option<String>,
  ipc_socket_path: Option<String>,
  /// Id of the video mpv is playing.
  pub video_id: Option<String>,
  pub audio_only: bool,
  pub paused: bool,
}

impl VideoPlayer {
  pub fn new(audio_only: bool) -> Self {
    Self { audio_only, ..Self::default() }
  }

  pub fn is_playing(&self) -> bool {
    self.process.is_some()
  }

  /// Drain status lines from mpv, keeping the newest. Clears state if mpv exited.
  pub fn check_status(&mut self) {
    if let Some(rx) = &mut self.status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_status = Some(status);
      }
    }
    if let Some(child) = &mut self.process
      && let Ok(Some(exit)) = child.try_wait()
    {
      debug!(?exit, "mpv exited");
      self.reset();
    }
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_status.as_deref()
  }

  pub async fn play(&mut self, video_id: &str, url: &str) -> Result<()> {
    self.stop().await.context("Failed to stop previous playback")?;

    let socket_path = std::env::temp_dir().join(format!("ypg-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Stale socket from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.arg(STATUS_FORMAT).arg(format!("--input-ipc-server={}", socket_path_str));
    if self.audio_only {
      cmd.arg("--no-video");
    }
    cmd.arg("--").arg(url);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // stderr is never drained; piping it would eventually block mpv.
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(16);
    let monitor = tokio::spawn(async move {
      let mut lines = BufReader::new(stdout).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line.trim().to_string()).await.is_err() {
          break;
        }
      }
    });

    info!(video_id = %video_id, "mpv started");
    self.process = Some(child);
    self.monitor = Some(monitor);
    self.status_rx = Some(rx);
    self.ipc_socket_path = Some(socket_path_str);
    self.video_id = Some(video_id.to_string());
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let cmd = ipc_command(&["cycle", "pause"]);
    let written = stream.try_write(&cmd).context("Failed to send pause command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    self.paused = !self.paused;
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.monitor.take() {
      handle.abort();
      let _ = handle.await;
    }
    if let Some(mut child) = self.process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
      info!("mpv stopped");
    }
    self.reset();
    Ok(())
  }

  fn reset(&mut self) {
    if let Some(handle) = self.monitor.take() {
      handle.abort();
    }
    self.process = None;
    self.status_rx = None;
    self.last_status = None;
    self.video_id = None;
    self.paused = false;
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ipc_command_is_json_line() {
    let line = ipc_command(&["cycle", "pause"]);
    assert_eq!(line, b"{\"command\":[\"cycle\",\"pause\"]}\n");
  }

  #[test]
  fn new_player_is_idle() {
    let player = VideoPlayer::new(true);
    assert!(!player.is_playing());
    assert!(player.audio_only);
    assert_eq!(player.last_status(), None);
  }

  #[tokio::test]
  async fn stop_when_idle_is_ok() {
    let mut player = VideoPlayer::new(false);
    player.stop().await.unwrap();
    assert!(!player.is_playing());
  }
}
