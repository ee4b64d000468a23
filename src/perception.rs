//! Eyes-open / eyes-closed signal from an external face-landmark detector.
//!
//! The detector itself lives outside this crate. It writes one JSON object
//! per line on stdout, `{"landmarks": [[x, y], ...]}` with the face-mesh
//! points of the first detected face, or `{"landmarks": null}` when no face
//! is in view. The adapter turns that stream into a single boolean per tick
//! and keeps the previous value whenever the stream has nothing new to say.

use serde::Deserialize;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{NomiresError, Result};

/// Face-mesh indices: outer corner, two upper lid points, inner corner, two
/// lower lid points.
pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point { x: p[0], y: p[1] }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    #[serde(default)]
    landmarks: Option<Vec<Point>>,
}

impl Frame {
    pub fn with_face(landmarks: Vec<Point>) -> Self {
        Self {
            landmarks: Some(landmarks),
        }
    }

    pub fn no_face() -> Self {
        Self { landmarks: None }
    }

    pub fn landmarks(&self) -> Option<&[Point]> {
        self.landmarks.as_deref()
    }
}

/// Vertical lid separation over horizontal eye width. `None` for a
/// degenerate eye with no width.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> Option<f64> {
    let a = eye[1].distance(&eye[5]);
    let b = eye[2].distance(&eye[4]);
    let c = eye[0].distance(&eye[3]);
    if c <= f64::EPSILON {
        return None;
    }
    Some((a + b) / (2.0 * c))
}

fn eye_points(landmarks: &[Point], indices: &[usize; 6]) -> Option<[Point; 6]> {
    let mut eye = [Point::new(0.0, 0.0); 6];
    for (slot, &idx) in eye.iter_mut().zip(indices) {
        *slot = *landmarks.get(idx)?;
    }
    Some(eye)
}

/// Mean aspect ratio of both eyes, if the landmark set covers them.
pub fn average_eye_ratio(landmarks: &[Point]) -> Option<f64> {
    let left = eye_aspect_ratio(&eye_points(landmarks, &LEFT_EYE)?)?;
    let right = eye_aspect_ratio(&eye_points(landmarks, &RIGHT_EYE)?)?;
    Some((left + right) / 2.0)
}

/// A camera-backed landmark stream.
pub trait PerceptionSource {
    /// Next frame, or `None` if nothing arrived in time.
    fn read_frame(&mut self) -> Option<Frame>;

    /// Release the underlying device. Called before the process exits.
    fn release(&mut self) {}
}

/// Fuses the frame stream into a sticky `eyes_open` flag.
#[derive(Debug, Clone)]
pub struct EyeTracker {
    threshold: f64,
    eyes_open: bool,
    last_ratio: Option<f64>,
}

impl EyeTracker {
    /// Starts out assuming open eyes.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            eyes_open: true,
            last_ratio: None,
        }
    }

    pub fn eyes_open(&self) -> bool {
        self.eyes_open
    }

    pub fn last_ratio(&self) -> Option<f64> {
        self.last_ratio
    }

    pub fn observe(&mut self, frame: Option<&Frame>) -> bool {
        let ratio = frame
            .and_then(Frame::landmarks)
            .and_then(average_eye_ratio);
        if let Some(ratio) = ratio {
            self.last_ratio = Some(ratio);
            self.eyes_open = ratio > self.threshold;
        }
        self.eyes_open
    }

    /// One read from `source` per call.
    pub fn sample(&mut self, source: &mut dyn PerceptionSource) -> bool {
        let frame = source.read_frame();
        self.observe(frame.as_ref())
    }
}

/// Used when no detector is configured: never produces a frame, so the
/// tracker stays on its "eyes open" default.
#[derive(Debug, Default)]
pub struct AlwaysOpenSource;

impl PerceptionSource for AlwaysOpenSource {
    fn read_frame(&mut self) -> Option<Frame> {
        None
    }
}

/// Plays back a fixed sequence of reads, then reports nothing.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Option<Frame>>,
    pub released: bool,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Option<Frame>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            released: false,
        }
    }

    pub fn push(&mut self, frame: Option<Frame>) {
        self.frames.push_back(frame);
    }
}

impl PerceptionSource for ScriptedSource {
    fn read_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front().flatten()
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Runs the external detector as a child process and reads its landmark
/// lines on a background thread.
pub struct LandmarkProcessSource {
    child: Option<Child>,
    rx: Receiver<Frame>,
    read_timeout: Duration,
}

impl LandmarkProcessSource {
    pub fn spawn(command: &[String], read_timeout: Duration) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or(NomiresError::EmptyDetectorCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NomiresError::PerceptionInit {
                command: command.join(" "),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| NomiresError::PerceptionInit {
            command: command.join(" "),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "no stdout"),
        })?;

        info!(command = %command.join(" "), pid = child.id(), "eye detector started");
        let rx = spawn_line_reader(BufReader::new(stdout));

        Ok(Self {
            child: Some(child),
            rx,
            read_timeout,
        })
    }
}

/// Parse landmark lines from `reader` on a background thread.
pub fn spawn_line_reader<R: BufRead + Send + 'static>(reader: R) -> Receiver<Frame> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Frame>(&line) {
                Ok(frame) => {
                    if tx.send(frame).is_err() {
                        break;
                    }
                }
                Err(e) => debug!(error = %e, "skipping malformed landmark line"),
            }
        }
        debug!("landmark stream closed");
    });
    rx
}

impl PerceptionSource for LandmarkProcessSource {
    fn read_frame(&mut self) -> Option<Frame> {
        let mut latest = match self.rx.recv_timeout(self.read_timeout) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
        };
        // keep only the freshest frame if the detector outpaces the tick
        loop {
            match self.rx.try_recv() {
                Ok(frame) => latest = frame,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        Some(latest)
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to stop eye detector");
            }
            match child.wait() {
                Ok(status) => info!(%status, "eye detector released"),
                Err(e) => warn!(error = %e, "failed to reap eye detector"),
            }
        }
    }
}

impl Drop for LandmarkProcessSource {
    fn drop(&mut self) {
        self.release();
    }
}
