//! Command line arguments.
//!
//! Uses clap for parsing with help text (`--help`) and validation.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

/// Initial execution mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StartMode {
    /// Producers run freely.
    #[default]
    Running,
    /// Producers block at the barrier until resumed or stepped.
    Paused,
}

/// threedbg viewer arguments.
///
/// # Examples
///
/// ```bash
/// # Show help
/// ./orbit_demo --help
///
/// # Small window at 30 fps, starting paused
/// ./orbit_demo --width 640 --height 480 --fps 30 --start paused
///
/// # Run 120 frames then write the last one to disk
/// ./orbit_demo --max-frames 120 --snapshot frame.png
/// ```
#[derive(Parser, Debug, Clone)]
#[command(name = "threedbg", about = "Live 3D debug viewer", version)]
pub struct ViewerArgs {
    /// Window title.
    #[arg(long, default_value = "3d debug")]
    pub title: String,

    /// Initial width in pixels.
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Initial height in pixels.
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Target frame rate (0 = unlimited).
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Point splat size in world units.
    #[arg(long, default_value = "0.05")]
    pub point_size: f32,

    /// Execution mode at start-up.
    #[arg(long, default_value = "running", value_enum)]
    pub start: StartMode,

    /// Stop after rendering N frames (useful for testing).
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Write the last rendered frame to this PNG file on exit.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl Default for ViewerArgs {
    fn default() -> Self {
        Self::parse_from(["threedbg"])
    }
}

impl ViewerArgs {
    pub fn config(&self) -> ViewerConfig {
        ViewerConfig::new()
            .with_title(self.title.clone())
            .with_size(self.width, self.height)
            .with_frame_rate(self.fps)
            .with_point_size(self.point_size)
    }
}

impl From<ViewerArgs> for ViewerConfig {
    fn from(args: ViewerArgs) -> Self {
        args.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config_defaults() {
        let args = ViewerArgs::default();
        assert_eq!(args.config(), ViewerConfig::default());
        assert_eq!(args.start, StartMode::Running);
        assert!(args.snapshot.is_none());
    }

    #[test]
    fn parses_flags() {
        let args = ViewerArgs::parse_from([
            "threedbg",
            "--width",
            "320",
            "--height",
            "200",
            "--fps",
            "0",
            "--start",
            "paused",
            "--max-frames",
            "5",
        ]);
        let config = ViewerConfig::from(args.clone());
        assert_eq!((config.width, config.height), (320, 200));
        assert_eq!(config.frame_rate, 0);
        assert_eq!(args.start, StartMode::Paused);
        assert_eq!(args.max_frames, Some(5));
    }

    #[test]
    fn rejects_bad_number() {
        assert!(ViewerArgs::try_parse_from(["threedbg", "--fps", "fast"]).is_err());
    }
}
