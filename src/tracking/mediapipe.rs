//! MediaPipe face tracking decoder
//!
//! Parses JSON-over-UDP packets from a MediaPipe Face Landmarker helper.
//! MediaPipe reports ARKit-compatible blendshape names, so frames carry the
//! same `jawOpen` coefficient as the VMC path.

use glam::{EulerRot, Quat, Vec3};
use serde::Deserialize;
use std::collections::HashMap;

use super::{FaceFrame, HeadTransform};
use crate::error::TrackingError;

/// A single JSON packet from the MediaPipe tracker
#[derive(Debug, Clone, Deserialize)]
pub struct MpPacket {
    /// Whether a face was detected this frame
    pub face_detected: bool,
    /// ARKit blendshape name → value (0.0–1.0)
    pub blendshapes: HashMap<String, f32>,
    /// Head translation [x, y, z]
    pub head_position: [f32; 3],
    /// Head rotation in degrees [pitch, yaw, roll]
    pub head_rotation: [f32; 3],
}

impl MpPacket {
    /// Parse a datagram
    pub fn parse(datagram: &[u8]) -> Result<Self, TrackingError> {
        serde_json::from_slice(datagram)
            .map_err(|e| TrackingError::MpParse(format!("JSON parse error: {}", e)))
    }

    /// Head pose from the packet's translation and pitch/yaw/roll
    pub fn head(&self) -> HeadTransform {
        let [pitch, yaw, roll] = self.head_rotation;
        HeadTransform::new(
            Vec3::from(self.head_position),
            Quat::from_euler(
                EulerRot::ZYX,
                roll.to_radians(),
                yaw.to_radians(),
                pitch.to_radians(),
            ),
        )
    }

    /// Convert to a frame; packets without a face produce nothing
    pub fn into_frame(self) -> Option<FaceFrame> {
        if !self.face_detected {
            return None;
        }
        Some(FaceFrame {
            head: self.head(),
            blendshapes: self.blendshapes,
        })
    }
}

/// Decode one datagram into at most one frame
pub fn decode(datagram: &[u8]) -> Result<Option<FaceFrame>, TrackingError> {
    Ok(MpPacket::parse(datagram)?.into_frame())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(face_detected: bool, jaw_open: f32) -> String {
        serde_json::json!({
            "face_detected": face_detected,
            "blendshapes": {
                "jawOpen": jaw_open,
                "eyeBlinkLeft": 0.12,
                "eyeBlinkRight": 0.15
            },
            "head_position": [0.1, 0.2, -0.5],
            "head_rotation": [0.0, 90.0, 0.0]
        })
        .to_string()
    }

    #[test]
    fn test_parse_packet() {
        let frame = decode(sample_json(true, 0.45).as_bytes()).unwrap().unwrap();

        assert!((frame.jaw_open().unwrap() - 0.45).abs() < 0.01);
        assert!((frame.head.position - Vec3::new(0.1, 0.2, -0.5)).length() < 1e-6);

        // 90° yaw turns forward (-Z) to -X
        let forward = frame.head.orientation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-4);
    }

    #[test]
    fn test_no_face_is_filtered() {
        assert!(decode(sample_json(false, 0.3).as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_missing_jaw_open() {
        let json = r#"{"face_detected":true,"blendshapes":{},"head_position":[0,0,0],"head_rotation":[0,0,0]}"#;
        let frame = decode(json.as_bytes()).unwrap().unwrap();
        assert_eq!(frame.jaw_open(), None);
        assert_eq!(frame.head, HeadTransform::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            decode(b"{not json"),
            Err(TrackingError::MpParse(_))
        ));
    }
}
