//! Headless viewport demo
//!
//! Builds a small scene on the in-memory renderer, follows a wandering player
//! with the camera, and replays a scripted editing session: click a crate,
//! drag it, switch gizmo modes, cancel a drag, delete a node, pan the view.
//!
//! Usage: `viewport_demo [config.toml|config.ron]`

use qaq_engine::foundation::logging;
use qaq_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const FRAME_TIME: f32 = 1.0 / 60.0;
const FRAMES: u64 = 600;
const CRATE_COUNT: usize = 8;

#[derive(Debug, Error)]
enum DemoError {
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

struct DemoScene {
    player: NodeId,
    crates: Vec<NodeId>,
}

fn build_scene(editor: &mut Editor<RetainedScene>, rng: &mut StdRng) -> Result<DemoScene, DemoError> {
    let mirror = editor.mirror_mut();

    let world = mirror.create_node_with(NodeDesc::new("world").with_flags(NodeFlags::empty()));
    let ground = mirror.create_node_with(
        NodeDesc::new("ground")
            .with_layer(RenderLayer::Background, 0)
            .with_flags(NodeFlags::LOCKED),
    );
    let player = mirror.create_node_with(
        NodeDesc::new("player")
            .with_flags(NodeFlags::SELECTABLE | NodeFlags::CAMERA_TARGET)
            .with_layer(RenderLayer::World, 10)
            .with_pick_extents(Vec2::new(16.0, 16.0)),
    );
    mirror.add_child(world, ground)?;
    mirror.add_child(world, player)?;

    let mut crates = Vec::with_capacity(CRATE_COUNT);
    for i in 0..CRATE_COUNT {
        let position = Vec3::new(rng.gen_range(-300.0..300.0), rng.gen_range(-200.0..200.0), 0.0);
        let id = mirror.create_node_with(
            NodeDesc::new(format!("crate_{i}"))
                .with_position(position)
                .with_layer(RenderLayer::World, i as i32)
                .with_pick_extents(Vec2::new(24.0, 24.0)),
        );
        mirror.add_child(world, id)?;
        crates.push(id);
    }

    let hud = mirror.create_node_with(
        NodeDesc::new("hud")
            .with_layer(RenderLayer::Overlay, 0)
            .with_flags(NodeFlags::EDITOR_ONLY | NodeFlags::SCREEN_SPACE),
    );

    mirror.attach_root(world)?;
    mirror.attach_root(hud)?;
    mirror.verify_mirror()?;

    log::info!("Scene built: {} nodes, {} live objects", mirror.len(), mirror.backend().object_count());
    Ok(DemoScene { player, crates })
}

/// Scripted input for a frame, if any
fn scripted_input(frame: u64, editor: &Editor<RetainedScene>, scene: &DemoScene) -> Vec<InputEvent> {
    let center = Vec2::new(editor.config().camera.half_width, editor.config().camera.half_height);
    let to_screen = |id: NodeId| -> Option<Vec2> {
        let world = editor.mirror().world_position(id).ok()?;
        let camera = editor.camera().position();
        Some(center + (world - camera).xy() * editor.camera().camera().zoom())
    };
    let pointer = |kind, at: Vec2| InputEvent::Pointer(PointerEvent::new(kind, at.x, at.y));
    let key = |key| InputEvent::Key(KeyEvent { key, pressed: true });

    match frame {
        120 => to_screen(scene.crates[0])
            .map(|at| vec![pointer(PointerKind::Down, at), pointer(PointerKind::Move, at + Vec2::new(40.0, 25.0))])
            .unwrap_or_default(),
        121 => vec![pointer(PointerKind::Up, Vec2::zeros())],
        180 => vec![key(KeyCode::E)],
        200 => to_screen(scene.crates[1])
            .map(|at| {
                vec![
                    pointer(PointerKind::Down, at),
                    pointer(PointerKind::Move, at + Vec2::new(60.0, 0.0)),
                    key(KeyCode::Escape),
                ]
            })
            .unwrap_or_default(),
        260 => vec![key(KeyCode::W), InputEvent::Wheel(2.0)],
        300 => vec![key(KeyCode::Delete)],
        360 => vec![InputEvent::Resize { width: 1280, height: 720 }],
        // Drag on empty background pans the view
        420 => vec![
            pointer(PointerKind::Down, Vec2::new(8.0, 8.0)),
            pointer(PointerKind::Move, Vec2::new(68.0, 38.0)),
            pointer(PointerKind::Up, Vec2::new(68.0, 38.0)),
        ],
        _ => Vec::new(),
    }
}

fn run(config: EditorConfig) -> Result<(), DemoError> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut editor = Editor::new(config, RetainedScene::new(), Box::new(OrbitState::new()))?;
    let scene = build_scene(&mut editor, &mut rng)?;

    if editor.follow_flagged().is_none() {
        log::warn!("No camera target in the scene; camera stays put");
    }
    editor.camera_mut().set_offset(Vec2::new(0.0, -40.0));

    let mut timer = Timer::new();
    let mut heading = Vec2::new(1.0, 0.0);
    let mut rendered_frames = 0u64;
    let mut notifications = 0usize;

    for frame in 1..=FRAMES {
        timer.advance(FRAME_TIME);

        // Player wanders; the camera trails it
        if frame % 30 == 0 {
            let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            heading = Vec2::new(angle.cos(), angle.sin());
        }
        let position = editor.mirror().node(scene.player)?.position();
        let step = heading * 90.0 * timer.delta_time();
        editor
            .mirror_mut()
            .set_position(scene.player, position + Vec3::new(step.x, step.y, 0.0))?;

        if frame == 240 {
            editor.shake(12.0, 0.5);
        }

        let inputs = scripted_input(frame, &editor, &scene);
        let report = editor.frame(timer.delta_time(), &inputs)?;
        if report.rendered {
            rendered_frames += 1;
        }
        notifications += report.dispatched;

        if frame % 120 == 0 {
            log::info!(
                "frame {}: camera at {:?}, selected {:?}, mode {:?}",
                report.frame,
                editor.camera().position().xy(),
                editor.gizmo().selected(),
                editor.gizmo().mode(),
            );
        }
    }

    editor.mirror().verify_mirror()?;
    let inspector = editor.inspector();
    log::info!(
        "Inspector showing {:?} after {} refreshes",
        inspector.name(),
        inspector.refreshes()
    );
    drop(inspector);

    log::info!(
        "{} frames in {:.1}s simulated, {} rendered, {} notifications, {} objects released",
        timer.frame_count(),
        timer.total_time(),
        rendered_frames,
        notifications,
        editor.mirror().backend().released_count(),
    );

    editor.shutdown();
    Ok(())
}

fn main() {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => EditorConfig::load_or_default(path),
        None => Ok(EditorConfig::default()),
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            logging::init();
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_with_filter(&config.logging.filter);
    log::info!("Starting viewport demo");

    if let Err(e) = run(config) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
    log::info!("Viewport demo finished");
}
