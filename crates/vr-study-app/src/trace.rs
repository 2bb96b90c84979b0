//! Recorded tracking traces
//!
//! A trace is a JSON Lines file with one object per rendered frame. Head
//! angles are Euler degrees as engines report them (`[0, 360)` is fine),
//! gaze is the head-local eye direction and eye closure weights run from
//! 0 (open) to 1 (shut). Every field except `dt_ms` may be omitted.
//!
//! ```text
//! {"dt_ms": 11, "head": {"euler": [352.0, 4.0, 0.0]}, "gaze": [0.02, -0.1, 1.0]}
//! {"dt_ms": 11, "primary": "down", "regions": [{"enter": "3"}]}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vr_study::spatial::signed_degrees;
use vr_study::{EyeClosure, FrameInput, Point3D, Quaternion, RegionEvent, Transform, Vector3D};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    #[serde(default)]
    pub position: [f32; 3],
    /// Pitch, yaw, roll in degrees
    #[serde(default)]
    pub euler: [f32; 3],
}

impl HeadPose {
    pub fn to_transform(&self) -> Transform {
        let [x, y, z] = self.position;
        let [pitch, yaw, roll] = self.euler.map(signed_degrees);
        Transform::new(
            Point3D::new(x, y, z),
            Quaternion::from_euler_degrees(pitch, yaw, roll),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEdge {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceRegion {
    Enter(String),
    Stay(String),
    Exit(String),
}

impl From<&TraceRegion> for RegionEvent {
    fn from(region: &TraceRegion) -> Self {
        match region {
            TraceRegion::Enter(id) => RegionEvent::enter(id.as_str()),
            TraceRegion::Stay(id) => RegionEvent::stay(id.as_str()),
            TraceRegion::Exit(id) => RegionEvent::exit(id.as_str()),
        }
    }
}

/// One line of a trace file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub dt_ms: u64,
    #[serde(default)]
    pub head: Option<HeadPose>,
    #[serde(default)]
    pub gaze: Option<[f32; 3]>,
    /// Left and right closure weights
    #[serde(default)]
    pub eyes: Option<[f32; 2]>,
    #[serde(default)]
    pub regions: Vec<TraceRegion>,
    #[serde(default)]
    pub primary: Option<KeyEdge>,
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub focus_hit: Option<[f32; 3]>,
}

impl TraceFrame {
    /// Convert to controller input. A missing head pose keeps `last_head`.
    pub fn to_input(&self, last_head: &Transform) -> FrameInput {
        let head = self
            .head
            .as_ref()
            .map_or(*last_head, HeadPose::to_transform);
        let mut frame = FrameInput::new(Duration::from_millis(self.dt_ms)).with_head(head);

        if let Some([x, y, z]) = self.gaze {
            frame = frame.with_gaze(Vector3D::new(x, y, z));
        }
        if let Some([left, right]) = self.eyes {
            frame = frame.with_eyes(EyeClosure::new(left, right));
        }
        for region in &self.regions {
            frame = frame.with_region(region.into());
        }
        match self.primary {
            Some(KeyEdge::Down) => frame = frame.pressed(),
            Some(KeyEdge::Up) => frame = frame.released(),
            None => {}
        }
        if self.trigger {
            frame = frame.with_trigger();
        }
        if let Some([x, y, z]) = self.focus_hit {
            frame = frame.with_focus_hit(Point3D::new(x, y, z));
        }
        frame
    }
}

/// Read every frame of a trace. Blank lines and `#` comments are skipped.
pub fn read_trace(path: &Path) -> Result<Vec<TraceFrame>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open trace {}", path.display()))?;
    parse_trace(BufReader::new(file))
        .with_context(|| format!("Failed to read trace {}", path.display()))
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceFrame>> {
    let mut frames = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame = serde_json::from_str(line)
            .with_context(|| format!("Invalid frame on line {}", number + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vr_study::RegionEventKind;

    #[test]
    fn test_parse_minimal_and_full_frames() {
        let text = r#"
            # warm-up
            {"dt_ms": 16}
            {"dt_ms": 11, "head": {"euler": [350.0, 0.0, 0.0]}, "gaze": [0.0, 0.0, 1.0], "eyes": [1.0, 0.0], "regions": [{"enter": "2"}], "primary": "down", "trigger": true}
        "#;
        let frames = parse_trace(text.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], TraceFrame { dt_ms: 16, ..Default::default() });
        assert_eq!(frames[1].regions, vec![TraceRegion::Enter("2".to_string())]);
        assert_eq!(frames[1].primary, Some(KeyEdge::Down));
    }

    #[test]
    fn test_frame_conversion() {
        let frame = TraceFrame {
            dt_ms: 20,
            head: Some(HeadPose {
                position: [0.0, 1.7, 0.0],
                euler: [350.0, 0.0, 0.0],
            }),
            eyes: Some([0.9, 0.8]),
            regions: vec![TraceRegion::Exit("4".to_string())],
            primary: Some(KeyEdge::Up),
            ..Default::default()
        };
        let input = frame.to_input(&Transform::identity());
        assert_eq!(input.dt, Duration::from_millis(20));
        assert!((input.head_pitch() + 10.0).abs() < 1e-3);
        assert_eq!(input.eyes, Some(EyeClosure::new(0.9, 0.8)));
        assert_eq!(input.regions[0].kind, RegionEventKind::Exit);
        assert!(input.primary_released);
        assert!(!input.primary_pressed);
        assert_eq!(input.gaze_direction, None);
    }

    #[test]
    fn test_missing_head_keeps_last_pose() {
        let last = HeadPose {
            position: [1.0, 2.0, 3.0],
            euler: [0.0, 30.0, 0.0],
        }
        .to_transform();
        let input = TraceFrame { dt_ms: 10, ..Default::default() }.to_input(&last);
        assert_eq!(input.head, last);
    }

    #[test]
    fn test_bad_line_reports_number() {
        let err = parse_trace("{\"dt_ms\": 1}\nnot json\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
