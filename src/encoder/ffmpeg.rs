//! # FFmpeg Process Driver
//!
//! Spawns the external ffmpeg/ffprobe binaries and turns their machine
//! output into typed data: source duration from ffprobe's JSON, progress
//! percentages from ffmpeg's `-progress pipe:1` key/value stream.
//!
//! Percentages are clamped to `[0, 100]` and emitted monotonically; the
//! caller receives the final 100 from the invocation service after the
//! size check, not from here.

use crate::error::SqshError;
use crate::platform::PlatformCommands;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use super::ProgressSender;

/// Probe a media file's duration in seconds via ffprobe
pub async fn probe_duration(path: &Path) -> Result<f64, SqshError> {
    let platform = PlatformCommands::instance();

    let output = Command::new(platform.get_command("ffprobe"))
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| SqshError::Encode(format!("failed to execute ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(SqshError::Encode(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| SqshError::Encode(format!("unparseable ffprobe output: {e}")))?;

    let duration = info["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(duration)
}

/// Run one ffmpeg encode, forwarding progress over the channel.
///
/// `total_duration` enables percentage attribution for time-based media;
/// without it no intermediate progress is emitted.
pub async fn run(
    input: &Path,
    output: &Path,
    args: &[String],
    total_duration: Option<f64>,
    progress: &ProgressSender,
) -> Result<(), SqshError> {
    let platform = PlatformCommands::instance();

    let mut cmd = Command::new(platform.get_command("ffmpeg"));
    cmd.arg("-i")
        .arg(input)
        .args(args)
        .args(["-loglevel", "error", "-progress", "pipe:1", "-y"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // An early return must not leave an encoder running detached
        .kill_on_drop(true);

    debug!("Spawning ffmpeg for {}", input.display());
    let mut child = cmd
        .spawn()
        .map_err(|e| SqshError::Encode(format!("failed to execute ffmpeg: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SqshError::Encode("ffmpeg stdout unavailable".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| SqshError::Encode("ffmpeg stderr unavailable".to_string()))?;

    // Drain stderr concurrently so a chatty encoder can't deadlock us
    let diagnostics = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
        buf
    });

    if let Err(e) = forward_progress(stdout, total_duration, progress).await {
        // The progress stream is gone; stop the encoder before surfacing it
        let _ = child.kill().await;
        diagnostics.abort();
        return Err(e.into());
    }

    let status = child.wait().await?;
    let diagnostics = diagnostics.await.unwrap_or_default();

    if !status.success() {
        let message = diagnostics.trim();
        let message = if message.is_empty() {
            format!("ffmpeg exited with {status}")
        } else {
            message.to_string()
        };
        return Err(SqshError::Encode(message));
    }

    Ok(())
}

/// Forward `out_time_ms` progress lines as monotone percentages until the
/// stream ends
async fn forward_progress<R>(
    stdout: R,
    total_duration: Option<f64>,
    progress: &ProgressSender,
) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    let mut last_percent = 0u8;
    while let Some(line) = lines.next_line().await? {
        if let (Some(out_ms), Some(total)) = (parse_out_time_ms(&line), total_duration) {
            let percent = percent_for(out_ms, total);
            if percent > last_percent {
                last_percent = percent;
                let _ = progress.send(percent);
            }
        }
    }
    Ok(())
}

/// Parse an `out_time_ms=NNN` line from ffmpeg's progress stream.
///
/// Despite the name, ffmpeg reports this key in microseconds.
fn parse_out_time_ms(line: &str) -> Option<u64> {
    line.strip_prefix("out_time_ms=")?.trim().parse().ok()
}

fn percent_for(out_time_us: u64, total_duration_secs: f64) -> u8 {
    if total_duration_secs <= 0.0 {
        return 0;
    }
    let processed_secs = out_time_us as f64 / 1_000_000.0;
    (processed_secs / total_duration_secs * 100.0).clamp(0.0, 100.0) as u8
}
