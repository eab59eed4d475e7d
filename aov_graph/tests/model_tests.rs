//! Scene snapshot loading and the command-line driver.

use std::fs;

use aov_graph::aov::{self, LayerToggle, RenderEngine};
use aov_graph::host::{AovHost, MemoryScene, NodeGraph, SceneHost};
use aov_graph::model::{ColorDepth, FileFormat, PropertyKey, PropertyValue};
use aov_graph::{GraphError, OutputGraphService, run};

const SCENE_JSON: &str = r#"
{
  "render_engine": "cycles",
  "frame_padding": 4,
  "layers": [
    {
      "name": "BG",
      "passes": [
        { "canonical_name": "Image" },
        { "canonical_name": "Depth" },
        { "canonical_name": "AO", "enabled": false }
      ],
      "flags": { "use_pass_z": true, "use_pass_ambient_occlusion": false, "use_sky": true }
    },
    { "name": "FG", "enabled": false, "passes": [ { "canonical_name": "Emit" } ] }
  ]
}
"#;

fn temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("aov_graph_test_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_load_scene_snapshot() {
    let scene = MemoryScene::load(SCENE_JSON).unwrap();
    assert_eq!(scene.render_engine(), RenderEngine::Cycles);
    assert_eq!(scene.frame_padding(), 4);
    assert!(!scene.has_node_graph());

    let layers = scene.list_render_layers();
    assert_eq!(layers.len(), 2);
    assert!(layers[0].enabled);
    assert!(!layers[1].enabled);

    let enabled: Vec<String> = scene
        .get_enabled_passes("BG")
        .into_iter()
        .map(|p| p.canonical_name)
        .collect();
    assert_eq!(enabled, vec!["Image", "Depth"]);

    let available: Vec<&str> = aov::available_aovs(&scene, "BG")
        .iter()
        .map(|e| e.display_name)
        .collect();
    assert_eq!(available, vec!["Ambient Occlusion", "Z"]);
    let remaining: Vec<&str> = aov::remaining_aovs(&scene, "BG")
        .iter()
        .map(|e| e.display_name)
        .collect();
    assert_eq!(remaining, vec!["Ambient Occlusion"]);
    assert_eq!(aov::layer_toggle(&scene, "BG", LayerToggle::Environment), Some(true));
    assert_eq!(aov::layer_toggle(&scene, "BG", LayerToggle::Volumes), None);
}

#[test]
fn test_synced_scene_survives_json() {
    let mut scene = MemoryScene::load(SCENE_JSON).unwrap();
    OutputGraphService::default().sync_all(&mut scene).unwrap();

    let json = scene.save().unwrap();
    let reloaded = MemoryScene::load(&json).unwrap();
    let names = |s: &MemoryScene| s.nodes().iter().map(|n| n.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&reloaded), names(&scene));
    assert_eq!(reloaded.links(), scene.links());
    assert_eq!(reloaded.layers, scene.layers);

    let tech = reloaded.node_named("Prism_OUT_BG_TechPasses").unwrap();
    assert_eq!(
        tech.property(PropertyKey::ColorDepth),
        Some(&PropertyValue::Depth(ColorDepth::Full))
    );
    assert_eq!(
        tech.property(PropertyKey::FileFormat),
        Some(&PropertyValue::Format(FileFormat::OpenExr))
    );
    let main = reloaded.node_named("Prism_OUT_BG_MainPasses").unwrap();
    assert_eq!(
        main.property(PropertyKey::ColorDepth),
        Some(&PropertyValue::Depth(ColorDepth::Half))
    );
}

#[test]
fn test_layer_toggle_write() {
    let mut scene = MemoryScene::load(SCENE_JSON).unwrap();
    aov::set_layer_toggle(&mut scene, "BG", LayerToggle::Environment, false).unwrap();
    assert_eq!(aov::layer_toggle(&scene, "BG", LayerToggle::Environment), Some(false));
    let err = aov::set_layer_toggle(&mut scene, "XX", LayerToggle::Curves, true).unwrap_err();
    assert!(matches!(err, GraphError::UnknownLayer(_)));
}

#[test]
fn test_cli_run_writes_synced_scene() {
    let dir = temp_dir();
    let scene_path = dir.join("scene.json");
    let out_path = dir.join("out.json");
    let config_path = dir.join("engine.toml");
    fs::write(&scene_path, SCENE_JSON).unwrap();
    fs::write(&config_path, "output_root = \"/renders/sh010\"\n").unwrap();

    run(vec![
        "aov_graph".to_string(),
        scene_path.to_string_lossy().to_string(),
        "--config".to_string(),
        config_path.to_string_lossy().to_string(),
        "--out".to_string(),
        out_path.to_string_lossy().to_string(),
    ])
    .unwrap();

    let scene = MemoryScene::load(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert!(scene.find_node_by_name("Prism_RL_BG").is_some());
    // FG is disabled and left alone.
    assert!(scene.find_node_by_name("Prism_RL_FG").is_none());
    assert_eq!(
        scene
            .node_named("Prism_OUT_BG_MainPasses")
            .unwrap()
            .property(PropertyKey::BasePath),
        Some(&PropertyValue::text("/renders/sh010"))
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_run_requires_scene() {
    let err = run(vec!["aov_graph".to_string()]).unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn test_cli_run_missing_file_is_io_error() {
    let dir = temp_dir();
    let err = run(vec![
        "aov_graph".to_string(),
        dir.join("missing.json").to_string_lossy().to_string(),
        "--config".to_string(),
        dir.join("missing.toml").to_string_lossy().to_string(),
    ])
    .unwrap_err();
    assert!(matches!(err, GraphError::Io(_)));
    let _ = fs::remove_dir_all(&dir);
}
