//! # Platform-specific utilities
//!
//! Centralizes cross-platform command naming and the availability probe for
//! the external encoder tools. The orchestrator must not be constructed
//! until `check_dependencies` has passed.

use crate::error::SqshError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let (commands, which_command) = if cfg!(windows) {
            let mut commands = HashMap::new();
            commands.insert("ffmpeg", "ffmpeg.exe");
            commands.insert("ffprobe", "ffprobe.exe");
            (commands, "where")
        } else {
            let mut commands = HashMap::new();
            commands.insert("ffmpeg", "ffmpeg");
            commands.insert("ffprobe", "ffprobe");
            (commands, "which")
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).unwrap_or(&base_name)
    }

    /// Check if a command is available on the system PATH
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// Verify that every external tool the encoder invokes is present.
///
/// Called once at startup, before any batch is constructed.
pub async fn check_dependencies() -> Result<(), SqshError> {
    let platform = PlatformCommands::instance();

    for tool in ["ffmpeg", "ffprobe"] {
        if !platform.is_command_available(tool).await {
            return Err(SqshError::MissingDependency(format!(
                "{tool} is required - run `sqshed setup` for install instructions"
            )));
        }
    }

    Ok(())
}
