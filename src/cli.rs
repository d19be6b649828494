use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_story;
use crate::render::{render_spec, write_output};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "narr", version, about = "Compose narrative layers around a Vega-Lite chart")]
pub struct Args {
    /// Story document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Config file (JSON/JSON5: theme, themeVariables, nextSteps)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme preset; replaces any theme from the config file
    #[arg(short = 't', long = "theme", value_enum)]
    pub theme: Option<ThemeChoice>,

    /// Pretty-print the Vega-Lite JSON
    #[arg(long)]
    pub pretty: bool,

    /// Print the composition plan instead of the chart
    #[arg(long = "dump-layout")]
    pub dump_layout: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Classic,
    Modern,
}

impl ThemeChoice {
    fn theme(self) -> Theme {
        match self {
            ThemeChoice::Classic => Theme::classic(),
            ThemeChoice::Modern => Theme::modern(),
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(choice) = args.theme {
        config.theme = choice.theme();
    }

    let input = read_input(args.input.as_deref())?;
    let story = parse_story(&input, &config)?;
    info!(layers = story.layers().len(); "Parsed story document");

    let stdout = io::stdout().lock();
    if args.dump_layout {
        write_layout_dump(stdout, &story)?;
        return Ok(());
    }

    let spec = render_spec(&story.render(), args.pretty)?;
    write_output(stdout, &spec)?;
    info!(bytes = spec.len(); "Wrote Vega-Lite specification");
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            info!(path = path.display().to_string(); "Reading story document");
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "narr",
            "-i",
            "story.json5",
            "--theme",
            "modern",
            "--pretty",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.input.as_deref(), Some(Path::new("story.json5")));
        assert_eq!(args.theme, Some(ThemeChoice::Modern));
        assert!(args.pretty);
        assert!(!args.dump_layout);
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn log_level_defaults_to_warn() {
        let args = Args::try_parse_from(["narr"]).unwrap();
        assert_eq!(args.log_level, "warn");
        assert_eq!(args.input, None);
    }

    #[test]
    fn theme_choice_maps_to_presets() {
        assert_eq!(ThemeChoice::Modern.theme(), Theme::modern());
        assert_eq!(ThemeChoice::Classic.theme(), Theme::classic());
    }
}
