//! Command line arguments and the settings resolved from them.

use std::path::PathBuf;

use crate::Rgb;

/// Fireworks in your terminal.
///
/// Click to launch a firework from the pointer, press `1` for a heart, `2` for a star.
/// Press `q`, ESC, or Ctrl+C to exit.
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
pub struct CliArgs {
    /// Background colour as hex, e.g. `1a1b26`
    #[arg(long, value_name = "RRGGBB", value_parser = parse_hex_color)]
    pub bg_color: Option<Rgb>,

    /// Simulation ticks (and frames) per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Seed for the random generator, for repeatable shows
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sound played on every explosion
    #[arg(long, value_name = "PATH", default_value = "explosion.wav")]
    pub sound: PathBuf,

    /// Don't load or play any sound
    #[arg(long)]
    pub mute: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub background: Rgb,
    pub fps: u32,
    pub seed: Option<u64>,
    pub sound: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            background: (0, 0, 0),
            fps: 60,
            seed: None,
            sound: Some(PathBuf::from("explosion.wav")),
            log_file: None,
        }
    }
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        Self {
            background: args.bg_color.unwrap_or((0, 0, 0)),
            fps: args.fps,
            seed: args.seed,
            sound: (!args.mute).then_some(args.sound),
            log_file: args.log_file,
        }
    }
}

impl Config {
    /// The random generator the field should use.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Result<Rgb, String> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB (e.g. 1a1b26), got `{hex}`"));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|error| format!("invalid hex colour: {error}"))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(parse_hex_color("1a1b26"), Ok((0x1a, 0x1b, 0x26)));
        assert_eq!(parse_hex_color("#FFffFF"), Ok((255, 255, 255)));
        assert!(parse_hex_color("12345").is_err());
        assert!(parse_hex_color("zz0000").is_err());
        assert!(parse_hex_color("ééé").is_err());
    }

    #[test]
    fn defaults() {
        let config = Config::from(CliArgs::parse_from(["skyburst"]));
        assert_eq!(config.background, (0, 0, 0));
        assert_eq!(config.fps, 60);
        assert_eq!(config.sound, Some(PathBuf::from("explosion.wav")));
        assert!(config.seed.is_none());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn all_options() {
        let args = CliArgs::parse_from([
            "skyburst",
            "--bg-color",
            "102030",
            "--fps",
            "30",
            "--seed",
            "42",
            "--mute",
            "--log-file",
            "/tmp/skyburst.log",
        ]);
        let config = Config::from(args);
        assert_eq!(config.background, (0x10, 0x20, 0x30));
        assert_eq!(config.fps, 30);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.sound, None);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/skyburst.log")));
    }

    #[test]
    fn rejects_zero_fps() {
        assert!(CliArgs::try_parse_from(["skyburst", "--fps", "0"]).is_err());
    }

    #[test]
    fn seeded_configs_repeat() {
        let config = Config {
            seed: Some(9),
            ..Config::default()
        };
        assert_eq!(config.rng().u64(..), config.rng().u64(..));
    }
}
