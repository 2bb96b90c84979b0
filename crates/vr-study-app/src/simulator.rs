//! Keyboard input simulator
//!
//! Maps keyboard input to simulated tracking data so the studies can be
//! run without a headset.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use vr_study::{
    EyeClosure, FrameInput, Point3D, Quaternion, RegionEvent, Transform, Vector3D,
};

/// Closure weight used for a simulated shut eye
const SHUT: f32 = 0.9;

/// Simulates one frame of tracking data from keyboard state
#[derive(Debug, Clone)]
pub struct InputSimulator {
    /// Gaze angles relative to the head, degrees
    gaze_yaw: f32,
    gaze_pitch: f32,
    /// Head angles, degrees
    head_yaw: f32,
    head_pitch: f32,
    left_shut: bool,
    right_shut: bool,
    primary_held: bool,
    hovered: Option<String>,
    /// One-shot events for the next frame
    pending: Pending,
    gaze_step: f32,
    head_step: f32,
    /// Depth of the simulated focus plane along the gaze
    focus_plane: f32,
}

#[derive(Debug, Clone, Default)]
struct Pending {
    pressed: bool,
    released: bool,
    trigger: bool,
    regions: Vec<RegionEvent>,
}

impl Default for InputSimulator {
    fn default() -> Self {
        Self {
            gaze_yaw: 0.0,
            gaze_pitch: 0.0,
            head_yaw: 0.0,
            head_pitch: 0.0,
            left_shut: false,
            right_shut: false,
            primary_held: false,
            hovered: None,
            pending: Pending::default(),
            gaze_step: 2.0,
            head_step: 2.5,
            focus_plane: 4300.0,
        }
    }
}

impl InputSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key press. Returns false for keys the simulator ignores.
    pub fn process_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            // Arrow keys: move gaze
            KeyCode::Up => self.gaze_pitch -= self.gaze_step,
            KeyCode::Down => self.gaze_pitch += self.gaze_step,
            KeyCode::Left => self.gaze_yaw -= self.gaze_step,
            KeyCode::Right => self.gaze_yaw += self.gaze_step,

            // WASD: head rotation
            KeyCode::Char('w') | KeyCode::Char('W') => self.head_pitch -= self.head_step,
            KeyCode::Char('s') | KeyCode::Char('S') => self.head_pitch += self.head_step,
            KeyCode::Char('a') | KeyCode::Char('A') => self.head_yaw -= self.head_step,
            KeyCode::Char('d') | KeyCode::Char('D') => self.head_yaw += self.head_step,

            // Space: toggle the primary key
            KeyCode::Char(' ') => {
                self.primary_held = !self.primary_held;
                if self.primary_held {
                    self.pending.pressed = true;
                } else {
                    self.pending.released = true;
                }
            }

            KeyCode::Char('e') | KeyCode::Char('E') => self.pending.trigger = true,

            // Eyes: z/x toggle one eye, b toggles both
            KeyCode::Char('z') => self.left_shut = !self.left_shut,
            KeyCode::Char('x') => self.right_shut = !self.right_shut,
            KeyCode::Char('b') => {
                let shut = !(self.left_shut && self.right_shut);
                self.left_shut = shut;
                self.right_shut = shut;
            }

            // Number keys: move the pointer onto a button, 0 leaves it
            KeyCode::Char(c @ '1'..='4') => self.hover(Some(c.to_string())),
            KeyCode::Char('0') => self.hover(None),

            KeyCode::Char('c') => self.center(),

            _ => return false,
        }
        true
    }

    fn hover(&mut self, region: Option<String>) {
        if self.hovered == region {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            self.pending.regions.push(RegionEvent::exit(previous));
        }
        if let Some(region) = &region {
            self.pending.regions.push(RegionEvent::enter(region.as_str()));
        }
        self.hovered = region;
    }

    /// Look straight ahead again.
    pub fn center(&mut self) {
        self.gaze_yaw = 0.0;
        self.gaze_pitch = 0.0;
        self.head_yaw = 0.0;
        self.head_pitch = 0.0;
    }

    pub fn head_transform(&self) -> Transform {
        Transform::new(
            Point3D::ORIGIN,
            Quaternion::from_euler_degrees(self.head_pitch, self.head_yaw, 0.0),
        )
    }

    /// Head-local gaze direction
    pub fn gaze_direction(&self) -> Vector3D {
        Vector3D::new(
            self.gaze_yaw.to_radians().tan(),
            -self.gaze_pitch.to_radians().tan(),
            1.0,
        )
        .normalize()
    }

    pub fn eyes(&self) -> EyeClosure {
        let weight = |shut: bool| if shut { SHUT } else { 0.0 };
        EyeClosure::new(weight(self.left_shut), weight(self.right_shut))
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_primary_held(&self) -> bool {
        self.primary_held
    }

    /// Build the next frame and clear one-shot events.
    pub fn frame(&mut self, dt: Duration) -> FrameInput {
        let head = self.head_transform();
        let gaze = self.gaze_direction();
        let world_gaze = head.rotation.rotate_vector(gaze);

        let mut frame = FrameInput::new(dt)
            .with_head(head)
            .with_gaze(gaze)
            .with_eyes(self.eyes());
        if world_gaze.z > f32::EPSILON {
            let hit = world_gaze * (self.focus_plane / world_gaze.z);
            frame = frame.with_focus_hit(hit.to_point());
        }

        let pending = std::mem::take(&mut self.pending);
        let entered_now = pending.regions.iter().any(|e| {
            Some(e.region.as_str()) == self.hovered.as_deref()
        });
        for event in pending.regions {
            frame = frame.with_region(event);
        }
        if let (Some(region), false) = (&self.hovered, entered_now) {
            frame = frame.with_region(RegionEvent::stay(region.as_str()));
        }
        if pending.pressed {
            frame = frame.pressed();
        }
        if pending.released {
            frame = frame.released();
        }
        if pending.trigger {
            frame = frame.with_trigger();
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use vr_study::RegionEventKind;

    const DT: Duration = Duration::from_millis(100);

    fn press(sim: &mut InputSimulator, c: char) -> bool {
        sim.process_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    #[test]
    fn test_gaze_movement() {
        let mut sim = InputSimulator::new();
        sim.process_key(KeyEvent::new(KeyCode::Up, KeyModifiers::empty()));
        let frame = sim.frame(DT);
        let gaze = frame.gaze_direction.unwrap();
        assert!(gaze.y > 0.0);
        assert!(gaze.x.abs() < 1e-6);
    }

    #[test]
    fn test_primary_toggle_edges() {
        let mut sim = InputSimulator::new();
        press(&mut sim, ' ');
        let down = sim.frame(DT);
        assert!(down.primary_pressed && !down.primary_released);
        assert!(!sim.frame(DT).primary_pressed);

        press(&mut sim, ' ');
        assert!(sim.frame(DT).primary_released);
        assert!(!sim.is_primary_held());
    }

    #[test]
    fn test_hover_enter_stay_exit() {
        let mut sim = InputSimulator::new();
        press(&mut sim, '2');
        let first = sim.frame(DT);
        assert_eq!(first.regions, vec![RegionEvent::enter("2")]);
        assert_eq!(sim.frame(DT).regions, vec![RegionEvent::stay("2")]);

        press(&mut sim, '3');
        let kinds: Vec<_> = sim.frame(DT).regions.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![RegionEventKind::Exit, RegionEventKind::Enter]);

        press(&mut sim, '0');
        assert_eq!(sim.frame(DT).regions, vec![RegionEvent::exit("3")]);
        assert!(sim.frame(DT).regions.is_empty());
    }

    #[test]
    fn test_eye_toggles() {
        let mut sim = InputSimulator::new();
        press(&mut sim, 'z');
        assert_eq!(sim.eyes(), EyeClosure::new(SHUT, 0.0));
        press(&mut sim, 'b');
        assert_eq!(sim.eyes(), EyeClosure::new(SHUT, SHUT));
        press(&mut sim, 'b');
        assert_eq!(sim.eyes(), EyeClosure::OPEN);
    }

    #[test]
    fn test_head_pitch_and_focus_hit() {
        let mut sim = InputSimulator::new();
        for _ in 0..4 {
            press(&mut sim, 's');
        }
        let frame = sim.frame(DT);
        assert!((frame.head_pitch() - 10.0).abs() < 1e-3);
        let hit = frame.focus_hit.unwrap();
        assert!((hit.z - 4300.0).abs() < 1e-2);
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut sim = InputSimulator::new();
        assert!(!press(&mut sim, 'p'));
    }
}
