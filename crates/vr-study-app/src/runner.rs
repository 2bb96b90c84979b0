//! Study runners: a terminal loop for interactive sessions and a replay
//! driver for recorded traces.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event as CrosstermEvent, KeyCode, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use vr_study::{Pointer, StudyController, StudyPhase, Transform};

use crate::scene::{SceneView, SharedScene};
use crate::simulator::InputSimulator;
use crate::trace::TraceFrame;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub frames: usize,
    pub final_phase: StudyPhase,
    pub trials: usize,
    pub summary: String,
}

impl RunReport {
    fn of(controller: &dyn StudyController, frames: usize) -> Self {
        Self {
            frames,
            final_phase: controller.phase(),
            trials: controller.trials_completed(),
            summary: controller.summary(),
        }
    }
}

/// Feed a recorded trace through a controller.
pub fn replay(controller: &mut dyn StudyController, frames: &[TraceFrame]) -> RunReport {
    let mut head = Transform::identity();
    let mut ran = 0;
    for frame in frames {
        let input = frame.to_input(&head);
        head = input.head;
        if let Some(phase) = controller.update(&input) {
            info!("Entered {} at frame {}", phase, ran);
        }
        ran += 1;
    }
    RunReport::of(controller, ran)
}

/// Drives a study from the keyboard in the terminal.
pub struct StudyRunner {
    controller: Box<dyn StudyController>,
    scene: SharedScene,
    input_simulator: InputSimulator,
    tick_rate: Duration,
    frames: usize,
    running: bool,
}

impl StudyRunner {
    /// `scene` must be the bridge the controller was built with.
    pub fn new(controller: Box<dyn StudyController>, scene: SharedScene) -> Self {
        Self {
            controller,
            scene,
            input_simulator: InputSimulator::new(),
            tick_rate: Duration::from_millis(16),
            frames: 0,
            running: true,
        }
    }

    pub fn with_tick_rate(mut self, rate: Duration) -> Self {
        self.tick_rate = rate;
        self
    }

    /// Run until Ctrl+Q or Esc.
    pub fn run(&mut self) -> io::Result<RunReport> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;

        let result = self.event_loop();

        execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;

        result?;
        Ok(RunReport::of(self.controller.as_ref(), self.frames))
    }

    fn event_loop(&mut self) -> io::Result<()> {
        let mut last_tick = Instant::now();

        while self.running {
            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_default();

            if event::poll(timeout)? {
                if let CrosstermEvent::Key(key) = event::read()? {
                    let quit = (key.code == KeyCode::Char('q')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                        || key.code == KeyCode::Esc;
                    if quit {
                        self.running = false;
                        continue;
                    }
                    self.input_simulator.process_key(key);
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                let dt = last_tick.elapsed();
                last_tick = Instant::now();

                let frame = self.input_simulator.frame(dt);
                if let Some(phase) = self.controller.update(&frame) {
                    info!("Entered {}", phase);
                }
                self.frames += 1;
                self.render()?;
            }
        }
        Ok(())
    }

    fn render(&self) -> io::Result<()> {
        let mut out = io::stdout();
        queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in status_lines(
            self.controller.as_ref(),
            &self.scene.snapshot(),
            &self.input_simulator,
        )
        .iter()
        .enumerate()
        {
            queue!(out, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        out.flush()
    }
}

fn status_lines(
    controller: &dyn StudyController,
    view: &SceneView,
    sim: &InputSimulator,
) -> Vec<String> {
    let mut lines = vec![controller.summary(), String::new()];

    if let Some(point) = view.calibration_point {
        lines.push(format!(
            "Calibration: look at ({:.0}, {:.0}) and press space",
            point.x, point.y
        ));
    }
    if let Some(direction) = view.indicated {
        lines.push(format!("Target: {} (button {})", direction, direction.id()));
    }
    if view.stimulus_visible {
        match view.focus_image {
            Some(image) if view.depth_of_field => lines.push(format!("Focus image {}", image)),
            _ => lines.push("Buttons visible".to_string()),
        }
    }
    if let Some(distance) = view.focus_distance {
        lines.push(format!("Focus distance: {}", distance));
    }
    if let Some(region) = &view.highlighted {
        lines.push(format!("Highlighted: {}", region));
    }
    if view.selection_button_visible {
        lines.push("Selection button ready (e)".to_string());
    }
    match view.pointer {
        Some(Pointer::World(p)) if view.pointer_visible => {
            lines.push(format!("Gaze pointer: ({:.0}, {:.0}, {:.0})", p.x, p.y, p.z))
        }
        Some(Pointer::Canvas(p)) => {
            lines.push(format!("Head cursor: ({:.0}, {:.0})", p.x, p.y))
        }
        _ => {}
    }

    let eyes = sim.eyes();
    lines.push(String::new());
    lines.push(format!(
        "primary {} | hover {} | eyes {:.1}/{:.1}",
        if sim.is_primary_held() { "held" } else { "up" },
        sim.hovered().unwrap_or("-"),
        eyes.left,
        eyes.right
    ));
    lines.push(
        "arrows gaze | wasd head | space primary | e select | z/x/b eyes | 1-4/0 hover | c center | ctrl+q quit"
            .to_string(),
    );
    lines
}
