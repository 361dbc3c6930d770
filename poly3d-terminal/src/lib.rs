/// Terminal driver: animates a polyhedron scene with the ASCII rasterizer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use poly3d_core::{Clock, Scene, SystemClock};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

const MIN_DURATION_MS: f64 = 500.0;
const MAX_DURATION_MS: f64 = 60_000.0;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp<C: Clock = SystemClock> {
    scene: Scene,
    clock: C,
    renderer: AsciiRenderer,
    running: bool,
    paused_at: Option<f64>,
    paused_total: f64,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp<SystemClock> {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_clock(scene, SystemClock, width, height))
    }
}

impl<C: Clock> TerminalApp<C> {
    pub fn with_clock(mut scene: Scene, clock: C, width: u16, height: u16) -> Self {
        // Terminal cells are about twice as tall as they are wide.
        scene.camera.set_viewport(u32::from(width), u32::from(height) * 2);

        Self {
            scene,
            clock,
            renderer: AsciiRenderer::new(usize::from(width), usize::from(height)),
            running: true,
            paused_at: None,
            paused_total: 0.0,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Clock time minus every paused stretch, so meshes resume where they stopped
    pub fn scene_time(&self) -> f64 {
        self.paused_at.unwrap_or_else(|| self.clock.now_ms()) - self.paused_total
    }

    pub fn toggle_pause(&mut self) {
        match self.paused_at.take() {
            Some(started) => self.paused_total += self.clock.now_ms() - started,
            None => self.paused_at = Some(self.clock.now_ms()),
        }
        log::info!("paused: {}", self.paused_at.is_some());
    }

    /// Multiply the animation duration by `factor`, within fixed bounds
    pub fn scale_duration(&mut self, factor: f64) {
        let config = self.scene.config;
        let duration = (config.duration_ms() * factor).clamp(MIN_DURATION_MS, MAX_DURATION_MS);
        match config.with_duration(duration) {
            Ok(config) => {
                self.scene.config = config;
                log::info!("animation duration now {} ms", duration);
            }
            Err(e) => log::warn!("kept animation duration: {}", e),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.scene
            .camera
            .set_viewport(u32::from(width), u32::from(height) * 2);
        self.renderer.resize(usize::from(width), usize::from(height));
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char(' ') => self.toggle_pause(),
                KeyCode::Char('+') | KeyCode::Char('=') => self.scale_duration(0.5),
                KeyCode::Char('-') => self.scale_duration(2.0),
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn update(&mut self) {
        if self.paused_at.is_none() {
            let now = self.scene_time();
            self.scene.update(now);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let stats = self
            .scene
            .render(&mut self.renderer)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Poly3D | FPS: {:.1} | {} meshes, {} triangles | turn: {} ms | +/-=Speed Space=Pause Q=Quit",
                self.fps, stats.drawn, stats.triangles, self.scene.config.duration_ms()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use poly3d_core::{AnimationConfig, Camera, ManualClock};

    fn app() -> TerminalApp<ManualClock> {
        let scene = Scene::showcase(Camera::default(), AnimationConfig::default(), 0.0).unwrap();
        TerminalApp::with_clock(scene, ManualClock::new(0.0), 80, 24)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_pause_freezes_scene_time() {
        let mut app = app();
        app.clock.advance(1000.0);
        app.handle_event(key(' '));
        app.clock.advance(4000.0);
        assert_eq!(app.scene_time(), 1000.0);

        app.handle_event(key(' '));
        app.clock.advance(500.0);
        assert_eq!(app.scene_time(), 1500.0);

        app.update();
        assert!(app.scene().iter().all(|(_, m)| m.last_update_ms == 1500.0));
    }

    #[test]
    fn test_speed_keys_are_bounded() {
        let mut app = app();
        app.handle_event(key('+'));
        assert_eq!(app.scene().config.duration_ms(), 2500.0);
        for _ in 0..10 {
            app.handle_event(key('-'));
        }
        assert_eq!(app.scene().config.duration_ms(), MAX_DURATION_MS);
    }

    #[test]
    fn test_quit_and_resize() {
        let mut app = app();
        app.handle_event(Event::Resize(120, 40));
        assert!((app.scene().camera.aspect - 1.5).abs() < 1e-6);
        app.handle_event(key('q'));
        assert!(!app.is_running());
    }
}
