//! The face-movement revival challenge.
//!
//! The camera and the face detector are capabilities supplied from outside
//! the engine.  A [`FaceGestureTracker`] polls frames from an acquired
//! [`FrameSource`], asks the [`FaceDetector`] where the face is, and reports
//! when the face has travelled from the left side of the frame to the right.
use crate::consts;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Something that can hand out a live video feed
pub(crate) trait Camera: fmt::Debug {
    /// Start capturing.  The device is released when the returned source is
    /// dropped.
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// A live video feed
pub(crate) trait FrameSource: fmt::Debug {
    /// Return the most recent frame, or `None` if no frame is ready yet
    fn next_frame(&mut self) -> Option<VideoFrame>;

    /// The time between frames at the feed's native frame rate
    fn frame_interval(&self) -> Duration;
}

/// Finds faces in video frames
pub(crate) trait FaceDetector: fmt::Debug {
    /// Return the bounding boxes of all faces in `frame`.  A frame that cannot
    /// be analyzed yet yields an empty list rather than an error.
    fn estimate_faces(&mut self, frame: &VideoFrame) -> Result<Vec<BoundingBox>, DetectError>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct FrameSize {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl FrameSize {
    pub(crate) fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A single frame of 8-bit grayscale video, stored row by row
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct VideoFrame {
    pub(crate) size: FrameSize,
    pub(crate) luma: Vec<u8>,
}

/// Horizontal extent of a detected face, in frame pixel columns.  Only the
/// horizontal position matters to the gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundingBox {
    pub(crate) x_min: f64,
    pub(crate) x_max: f64,
}

impl BoundingBox {
    pub(crate) fn center_x(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum CameraError {
    #[error("no camera is configured")]
    NotConfigured,
    #[error("the camera is already in use")]
    Busy,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum DetectError {
    #[error("malformed video frame: {0}")]
    BadFrame(String),
}

/// How far along the left-then-right movement the player is
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum GestureStage {
    /// The face has not yet been seen on the left side of the frame
    #[default]
    AwaitingLeftZone,
    /// The face has been on the left; moving it to the right finishes the
    /// gesture
    LeftZoneConfirmed,
}

/// Result of polling a [`FaceGestureTracker`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GesturePoll {
    /// The gesture has not been completed yet
    Pending,
    /// The gesture was completed by this poll
    Completed,
    /// The gesture was completed by an earlier poll; nothing more is read
    Stopped,
}

/// What the interface shows about an ongoing face challenge
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GestureProgress {
    pub(crate) stage: GestureStage,
    /// Horizontal position of the last face seen, as a fraction of the frame
    /// width
    pub(crate) face_position: Option<f64>,
}

#[derive(Debug)]
pub(crate) struct FaceGestureTracker {
    source: Box<dyn FrameSource>,
    stage: GestureStage,
    face_position: Option<f64>,
    finished: bool,
    /// Detector failures since the last frame it could read
    detect_failures: u32,
}

impl FaceGestureTracker {
    pub(crate) fn new(source: Box<dyn FrameSource>) -> FaceGestureTracker {
        FaceGestureTracker {
            source,
            stage: GestureStage::default(),
            face_position: None,
            finished: false,
            detect_failures: 0,
        }
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        self.source.frame_interval()
    }

    pub(crate) fn progress(&self) -> GestureProgress {
        GestureProgress {
            stage: self.stage,
            face_position: self.face_position,
        }
    }

    /// Examine the next frame, if there is one.  Frames that aren't ready,
    /// frames without a face, and detector failures leave the gesture state
    /// as it was.
    pub(crate) fn poll(&mut self, detector: &mut dyn FaceDetector) -> GesturePoll {
        if self.finished {
            return GesturePoll::Stopped;
        }
        let Some(frame) = self.source.next_frame() else {
            return GesturePoll::Pending;
        };
        if frame.size.is_empty() {
            return GesturePoll::Pending;
        }
        let faces = match detector.estimate_faces(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                // Only the start of a run of failures is worth a warning
                if self.detect_failures == 0 {
                    warn!(error = %e, "face detection failed");
                } else {
                    debug!(
                        error = %e,
                        failures = self.detect_failures + 1,
                        "face detection still failing"
                    );
                }
                self.detect_failures = self.detect_failures.saturating_add(1);
                return GesturePoll::Pending;
            }
        };
        if self.detect_failures > 0 {
            info!(failures = self.detect_failures, "face detection recovered");
            self.detect_failures = 0;
        }
        let Some(face) = faces.first() else {
            return GesturePoll::Pending;
        };
        let width = f64::from(frame.size.width);
        let position = face.center_x() / width;
        self.face_position = Some(position);
        if position < consts::LEFT_ZONE {
            if self.stage == GestureStage::AwaitingLeftZone {
                debug!(position, "face reached left zone");
            }
            self.stage = GestureStage::LeftZoneConfirmed;
        } else if position > consts::RIGHT_ZONE && self.stage == GestureStage::LeftZoneConfirmed {
            debug!(position, "face reached right zone");
            self.finished = true;
            return GesturePoll::Completed;
        }
        GesturePoll::Pending
    }
}
