use std::path::PathBuf;

use clap::Parser;
use dialogmgr::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "dialogmgr", version, about = "Playground for the dialog overlay manager")]
pub struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Disable fade transitions
    #[arg(long)]
    pub no_animation: bool,

    /// Toast display time in milliseconds
    #[arg(long, value_name = "MS")]
    pub toast_duration: Option<u64>,

    /// Do not capture the mouse
    #[arg(long)]
    pub no_mouse: bool,

    /// Print the available themes and exit
    #[arg(long)]
    pub list_themes: bool,
}

impl Args {
    /// Overrides config values given on the command line.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(theme) = &self.theme {
            config.theme.name.clone_from(theme);
        }
        if self.no_animation {
            config.overlay.animations = false;
        }
        if let Some(ms) = self.toast_duration {
            config.overlay.toast_duration_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "dialogmgr",
            "--no-animation",
            "--toast-duration",
            "3000",
            "--theme",
            "Catppuccin Latte",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert!(!config.overlay.animations);
        assert_eq!(config.overlay.toast_duration_ms, 3000);
        assert_eq!(config.theme.name, "Catppuccin Latte");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::try_parse_from(["dialogmgr"]).unwrap();
        let mut config = AppConfig::default();
        config.overlay.toast_duration_ms = 900;
        args.apply(&mut config);

        assert!(config.overlay.animations);
        assert_eq!(config.overlay.toast_duration_ms, 900);
        assert!(!args.no_mouse);
    }
}
