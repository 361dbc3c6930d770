/// Poly3D Terminal Demo - Spinning polyhedra
///
/// Usage: poly3d-terminal [all|pyramid|octahedron|pentagonal-pyramid|dodecahedron] [duration_ms]
///
/// Controls:
///   - +/-: Faster / slower rotation
///   - Space: Pause
///   - Q/ESC: Quit

use nalgebra::Vector3;
use poly3d_core::{AnimationConfig, Camera, Clock, ConstructionError, Scene, ShapeKind, SystemClock};
use poly3d_terminal::TerminalApp;
use std::env;
use std::io;

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn build_scene(shape: &str, config: AnimationConfig, now_ms: f64) -> Result<Scene, ConstructionError> {
    let camera = Camera::default();
    match shape.parse::<ShapeKind>() {
        Ok(kind) => {
            let mut scene = Scene::new(camera, config);
            scene.spawn(kind, Vector3::new(0.0, -0.3, 0.0), Vector3::new(1.0, 1.0, 0.2), now_ms)?;
            Ok(scene)
        }
        Err(_) => Scene::showcase(camera, config, now_ms),
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let shape = args.get(1).map(String::as_str).unwrap_or("all");
    if shape != "all" && shape.parse::<ShapeKind>().is_err() {
        return Err(invalid_input(format!("unknown shape '{}'", shape)));
    }

    let config = match args.get(2) {
        Some(raw) => {
            let duration: f64 = raw
                .parse()
                .map_err(|e| invalid_input(format!("invalid duration '{}': {}", raw, e)))?;
            AnimationConfig::new(duration).map_err(|e| invalid_input(e.to_string()))?
        }
        None => AnimationConfig::default(),
    };

    let scene = build_scene(shape, config, SystemClock.now_ms())
        .map_err(|e| invalid_input(format!("Failed to build scene: {}", e)))?;
    log::info!("starting with {} meshes, {} ms per turn", scene.len(), config.duration_ms());

    let mut app = TerminalApp::new(scene)?;
    app.run()?;

    println!("Thank you for using the Poly3D Terminal Renderer!");
    Ok(())
}
