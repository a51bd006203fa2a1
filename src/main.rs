mod app;
mod hardware;
mod keyboard;
mod logging;
mod media;
mod sink;

use std::env;
use std::path::PathBuf;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use paradigm_experiment::{resolve_config, Environment, ExperimentScript};
use paradigm_render::{find_system_font, load_font};
use tracing::{info, warn};

use crate::app::App;

const DEFAULT_SCRIPT: &str = "experiment.json";

fn main() -> Result<()> {
    let environment: Environment = env::var("PARADIGM_ENV")
        .unwrap_or_else(|_| "dev".to_string())
        .parse()?;
    let settings = resolve_config(environment, env_flag("PARADIGM_TEST"));
    logging::init(settings.logging_level);

    let script_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT));
    let script = ExperimentScript::load(&script_path)
        .with_context(|| format!("loading {}", script_path.display()))?;
    info!(
        script = %script_path.display(),
        stimuli = script.stimuli.len(),
        "experiment script loaded"
    );

    let app = App::new(settings, script, font());
    if let Some(summary) = app.run()? {
        info!(
            presented = summary.presented,
            remaining = summary.remaining,
            "done"
        );
    }
    Ok(())
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn font() -> Option<FontArc> {
    let path = env::var_os("PARADIGM_FONT")
        .map(PathBuf::from)
        .or_else(find_system_font);
    let Some(path) = path else {
        warn!("no font found, set PARADIGM_FONT to render text");
        return None;
    };
    match load_font(&path) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("{e:#}");
            None
        }
    }
}
