//! Cameras that the face challenge can be played with in a terminal
use crate::engine::face::{
    BoundingBox, Camera, CameraError, DetectError, FaceDetector, FrameSize, FrameSource,
    VideoFrame,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// Width in pixels of the simulated video feed
const FEED_WIDTH: u32 = 64;

/// Width of the simulated face, as a fraction of the feed width
const FACE_SPAN: f64 = 0.125;

/// How far one press of an arrow key moves the simulated face, as a fraction
/// of the feed width
const NUDGE_STEP: f64 = 0.1;

const FACE_LUMA: u8 = 220;
const BACKGROUND_LUMA: u8 = 30;

/// Pixels at least this bright are taken to be part of a face
const FACE_THRESHOLD: u8 = 128;

/// Roughly 30 frames per second
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Used when no camera is configured; acquiring it always fails
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct NoCamera;

impl Camera for NoCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        Err(CameraError::NotConfigured)
    }
}

#[derive(Debug)]
struct Stage {
    /// Horizontal center of the face, as a fraction of the feed width
    center: f64,
    /// Whether a feed is currently acquired
    live: bool,
}

/// A camera that films a single bright "face" on a dark background.  The
/// face is moved around with the [`FaceJoystick`] returned alongside the
/// camera.
#[derive(Debug)]
pub(crate) struct SimulatedCamera {
    stage: Rc<RefCell<Stage>>,
}

impl SimulatedCamera {
    pub(crate) fn new() -> (SimulatedCamera, FaceJoystick) {
        let stage = Rc::new(RefCell::new(Stage {
            center: 0.5,
            live: false,
        }));
        let joystick = FaceJoystick {
            stage: Rc::clone(&stage),
        };
        (SimulatedCamera { stage }, joystick)
    }
}

impl Camera for SimulatedCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        let mut stage = self.stage.borrow_mut();
        if stage.live {
            return Err(CameraError::Busy);
        }
        stage.live = true;
        stage.center = 0.5;
        info!("simulated camera acquired");
        Ok(Box::new(SimulatedFeed {
            stage: Rc::clone(&self.stage),
        }))
    }
}

#[derive(Debug)]
struct SimulatedFeed {
    stage: Rc<RefCell<Stage>>,
}

impl FrameSource for SimulatedFeed {
    fn next_frame(&mut self) -> Option<VideoFrame> {
        let center = self.stage.borrow().center;
        let luma = (0..FEED_WIDTH)
            .map(|x| {
                let pos = (f64::from(x) + 0.5) / f64::from(FEED_WIDTH);
                if (pos - center).abs() <= FACE_SPAN / 2.0 {
                    FACE_LUMA
                } else {
                    BACKGROUND_LUMA
                }
            })
            .collect();
        Some(VideoFrame {
            size: FrameSize {
                width: FEED_WIDTH,
                height: 1,
            },
            luma,
        })
    }

    fn frame_interval(&self) -> Duration {
        FRAME_INTERVAL
    }
}

impl Drop for SimulatedFeed {
    fn drop(&mut self) {
        self.stage.borrow_mut().live = false;
        debug!("simulated camera released");
    }
}

/// Steers the face seen by a [`SimulatedCamera`]
#[derive(Clone, Debug)]
pub(crate) struct FaceJoystick {
    stage: Rc<RefCell<Stage>>,
}

impl FaceJoystick {
    pub(crate) fn left(&self) {
        self.nudge(-NUDGE_STEP);
    }

    pub(crate) fn right(&self) {
        self.nudge(NUDGE_STEP);
    }

    fn nudge(&self, delta: f64) {
        let mut stage = self.stage.borrow_mut();
        let half = FACE_SPAN / 2.0;
        stage.center = (stage.center + delta).clamp(half, 1.0 - half);
    }
}

/// Detects the brightest blob in a grayscale frame as a face.  Pairs with
/// [`SimulatedCamera`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct LumaDetector;

impl FaceDetector for LumaDetector {
    fn estimate_faces(&mut self, frame: &VideoFrame) -> Result<Vec<BoundingBox>, DetectError> {
        if frame.size.is_empty() {
            return Ok(Vec::new());
        }
        let (Ok(width), Ok(height)) = (
            usize::try_from(frame.size.width),
            usize::try_from(frame.size.height),
        ) else {
            return Err(DetectError::BadFrame(String::from("frame is too large")));
        };
        if width.checked_mul(height) != Some(frame.luma.len()) {
            return Err(DetectError::BadFrame(format!(
                "{}×{} frame has {} pixels",
                frame.size.width,
                frame.size.height,
                frame.luma.len()
            )));
        }
        // Brightest value in each column
        let mut columns = vec![0u8; width];
        for row in frame.luma.chunks_exact(width) {
            for (col, &px) in columns.iter_mut().zip(row) {
                *col = (*col).max(px);
            }
        }
        // Longest run of bright columns; a trailing dark sentinel closes off
        // a run that reaches the right edge
        let mut best: Option<(u32, u32)> = None;
        let mut start = None;
        for (x, &px) in (0u32..).zip(columns.iter().chain([&0])) {
            if px >= FACE_THRESHOLD {
                let _ = start.get_or_insert(x);
            } else if let Some(s) = start.take() {
                if best.is_none_or(|(bs, be)| x - s > be - bs) {
                    best = Some((s, x));
                }
            }
        }
        Ok(best
            .map(|(s, e)| BoundingBox {
                x_min: f64::from(s),
                x_max: f64::from(e),
            })
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::face::{FaceGestureTracker, GesturePoll};

    fn face_position(feed: &mut dyn FrameSource) -> f64 {
        let frame = feed.next_frame().unwrap();
        let faces = LumaDetector.estimate_faces(&frame).unwrap();
        assert_eq!(faces.len(), 1);
        faces[0].center_x() / f64::from(frame.size.width)
    }

    #[test]
    fn no_camera() {
        assert_eq!(NoCamera.acquire().unwrap_err(), CameraError::NotConfigured);
    }

    #[test]
    fn simulated_camera_is_exclusive() {
        let (mut camera, _joystick) = SimulatedCamera::new();
        let feed = camera.acquire().unwrap();
        assert_eq!(camera.acquire().unwrap_err(), CameraError::Busy);
        drop(feed);
        assert!(camera.acquire().is_ok());
    }

    #[test]
    fn face_starts_centered() {
        let (mut camera, _joystick) = SimulatedCamera::new();
        let mut feed = camera.acquire().unwrap();
        assert_eq!(face_position(feed.as_mut()), 0.5);
        assert_eq!(feed.frame_interval(), Duration::from_millis(33));
    }

    #[test]
    fn joystick_moves_face() {
        let (mut camera, joystick) = SimulatedCamera::new();
        let mut feed = camera.acquire().unwrap();
        for _ in 0..3 {
            joystick.left();
        }
        let left = face_position(feed.as_mut());
        assert!(left < 0.3, "{left}");
        for _ in 0..6 {
            joystick.right();
        }
        let right = face_position(feed.as_mut());
        assert!(right > 0.7, "{right}");
    }

    #[test]
    fn joystick_stops_at_edges() {
        let (mut camera, joystick) = SimulatedCamera::new();
        let mut feed = camera.acquire().unwrap();
        for _ in 0..20 {
            joystick.right();
        }
        let frame = feed.next_frame().unwrap();
        assert_eq!(frame.luma.last(), Some(&FACE_LUMA));
        let faces = LumaDetector.estimate_faces(&frame).unwrap();
        assert_eq!(faces[0].x_max, 64.0);
    }

    #[test]
    fn reacquiring_recenters_face() {
        let (mut camera, joystick) = SimulatedCamera::new();
        let feed = camera.acquire().unwrap();
        joystick.left();
        drop(feed);
        let mut feed = camera.acquire().unwrap();
        assert_eq!(face_position(feed.as_mut()), 0.5);
    }

    #[test]
    fn gesture_with_simulated_camera() {
        let (mut camera, joystick) = SimulatedCamera::new();
        let mut tracker = FaceGestureTracker::new(camera.acquire().unwrap());
        let mut detector = LumaDetector;
        assert_eq!(tracker.poll(&mut detector), GesturePoll::Pending);
        for _ in 0..3 {
            joystick.left();
        }
        assert_eq!(tracker.poll(&mut detector), GesturePoll::Pending);
        for _ in 0..6 {
            joystick.right();
        }
        assert_eq!(tracker.poll(&mut detector), GesturePoll::Completed);
        drop(tracker);
        assert!(camera.acquire().is_ok());
    }

    #[test]
    fn detector_picks_widest_blob() {
        let mut luma = vec![0u8; 20];
        luma[8] = 200;
        for px in &mut luma[10..15] {
            *px = 200;
        }
        let frame = VideoFrame {
            size: FrameSize {
                width: 10,
                height: 2,
            },
            luma,
        };
        // Columns 0-4 are bright in the second row, column 8 in the first
        let faces = LumaDetector.estimate_faces(&frame).unwrap();
        assert_eq!(
            faces,
            [BoundingBox {
                x_min: 0.0,
                x_max: 5.0
            }]
        );
    }

    #[test]
    fn detector_without_face() {
        let frame = VideoFrame {
            size: FrameSize {
                width: 4,
                height: 1,
            },
            luma: vec![10, 20, 30, 40],
        };
        assert!(LumaDetector.estimate_faces(&frame).unwrap().is_empty());
    }

    #[test]
    fn detector_rejects_bad_frame() {
        let frame = VideoFrame {
            size: FrameSize {
                width: 4,
                height: 2,
            },
            luma: vec![10, 20, 30, 40],
        };
        assert!(matches!(
            LumaDetector.estimate_faces(&frame),
            Err(DetectError::BadFrame(_))
        ));
    }
}
