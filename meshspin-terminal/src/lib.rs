/// Terminal front end that spins a meshspin scene as ASCII art
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use meshspin_core::camera::DEFAULT_REFRESH_RATE_HZ;
use meshspin_core::{FrameCounter, Scene, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: u32 = 2;

/// Viewport in square units for a terminal of `columns` x `rows` cells
pub fn terminal_viewport(columns: u16, rows: u16) -> Viewport {
    Viewport::new(u32::from(columns), u32::from(rows) * CELL_ASPECT)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    frames: FrameCounter,
    renderer: AsciiRenderer,
    viewport: Viewport,
    refresh_rate_hz: f32,
    running: bool,
    last_report: Instant,
    frames_since_report: u32,
    fps: f32,
}

impl TerminalApp {
    /// `refresh_rate_hz` is both the pacing target and the rate that drives
    /// the camera's rotation speed.
    pub fn new(scene: Scene, refresh_rate_hz: f32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let refresh_rate_hz = if refresh_rate_hz.is_finite() && refresh_rate_hz > 0.0 {
            refresh_rate_hz
        } else {
            DEFAULT_REFRESH_RATE_HZ
        };

        Ok(Self {
            scene,
            frames: FrameCounter::new(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            viewport: terminal_viewport(width, height),
            refresh_rate_hz,
            running: true,
            last_report: Instant::now(),
            frames_since_report: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!("Stopped after {} frames", self.frames.get());
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs_f32(1.0 / self.refresh_rate_hz);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            self.render()?;
            self.frames.advance();

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            self.frames_since_report += 1;
            let now = Instant::now();
            if (now - self.last_report).as_secs() >= 1 {
                self.fps = self.frames_since_report as f32 / (now - self.last_report).as_secs_f32();
                self.frames_since_report = 0;
                self.last_report = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Char('q') | KeyCode::Esc,
                kind: KeyEventKind::Press,
                ..
            }) => {
                self.running = false;
            }
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.renderer.resize(width as usize, height as usize);
                self.viewport = terminal_viewport(width, height);
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self
            .scene
            .frame(self.frames.get(), self.viewport, self.refresh_rate_hz);

        self.renderer.clear();
        self.renderer.render_frame(&frame);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "meshspin | FPS: {:.1} | {} triangles | frame {} | Q=Quit",
                self.fps,
                frame.buffers.triangle_count(),
                self.frames.get()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
