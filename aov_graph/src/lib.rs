pub mod aov;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod naming;
pub mod service;
pub mod taxonomy;

pub use config::{EngineConfig, LayoutMetrics};
pub use error::GraphError;
pub use host::{AovHost, ConfirmPrompt, MemoryScene, NodeGraph, SceneHost};
pub use service::OutputGraphService;

use log::info;
use std::fs;
use std::path::Path;

const USAGE: &str = "usage: aov_graph <scene.json> [--config <engine.toml>] [--out <scene.json>]";

/// Loads a scene snapshot, syncs every enabled render layer, and writes the result to
/// `--out` or stdout.
pub fn run(args: Vec<String>) -> Result<(), GraphError> {
    let mut scene_path: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut out_path: Option<String> = None;

    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config_path = iter.next();
        } else if arg == "--out" {
            out_path = iter.next();
        } else if scene_path.is_none() {
            scene_path = Some(arg);
        } else {
            return Err(GraphError::InvalidArgument(format!(
                "unexpected argument '{}'",
                arg
            )));
        }
    }
    let scene_path = scene_path.ok_or_else(|| GraphError::InvalidArgument(USAGE.to_string()))?;

    let config = match config_path {
        Some(path) => config::load_config_from(Path::new(&path))?,
        None => config::load_config(),
    };

    let mut scene = MemoryScene::load(&fs::read_to_string(&scene_path)?)?;
    let service = OutputGraphService::new(config);
    let reports = service.sync_all(&mut scene)?;
    for (layer, report) in &reports {
        info!("{}: {:?}", layer, report);
    }

    let json = scene.save()?;
    match out_path {
        Some(path) => {
            fs::write(&path, json)?;
            info!("Wrote {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
