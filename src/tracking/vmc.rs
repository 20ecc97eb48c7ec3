//! VMC protocol decoder for face tracking data
//!
//! VMC (Virtual Motion Capture) transmits motion capture data over OSC.
//! Senders such as iFacialMocap stream the phone's ARKit blendshapes with it.
//! Blend values arrive one message each and are committed by
//! `/VMC/Ext/Blend/Apply`, which is where a [`FaceFrame`] is emitted.

use glam::{Quat, Vec3};
use rosc::{OscMessage, OscPacket, OscType};
use std::collections::HashMap;

use super::{FaceFrame, HeadTransform};
use crate::error::TrackingError;

/// Bone carrying the head pose in `/VMC/Ext/Bone/Pos`
const HEAD_BONE: &str = "Head";

/// Accumulates VMC messages into face frames
#[derive(Debug, Clone, Default)]
pub struct VmcDecoder {
    /// Blendshape values received since the session started (0.0 - 1.0)
    blendshapes: HashMap<String, f32>,
    /// Last head pose seen
    head: Option<HeadTransform>,
}

impl VmcDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously known head pose
    pub fn with_head(head: Option<HeadTransform>) -> Self {
        Self {
            head,
            ..Self::default()
        }
    }

    /// Last head pose seen, if any
    pub fn head(&self) -> Option<HeadTransform> {
        self.head
    }

    /// Decode one UDP datagram, returning every frame it completed
    pub fn decode(&mut self, datagram: &[u8]) -> Result<Vec<FaceFrame>, TrackingError> {
        let (_, packet) = rosc::decoder::decode_udp(datagram)
            .map_err(|e| TrackingError::VmcParse(format!("OSC decode error: {:?}", e)))?;

        let mut frames = Vec::new();
        self.handle_packet(packet, &mut frames);
        Ok(frames)
    }

    fn handle_packet(&mut self, packet: OscPacket, frames: &mut Vec<FaceFrame>) {
        match packet {
            OscPacket::Message(msg) => self.handle_message(msg, frames),
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(packet, frames);
                }
            }
        }
    }

    fn handle_message(&mut self, msg: OscMessage, frames: &mut Vec<FaceFrame>) {
        match msg.addr.as_str() {
            // /VMC/Ext/Blend/Val <name> <value>
            "/VMC/Ext/Blend/Val" => {
                if let (Some(OscType::String(name)), Some(value)) =
                    (msg.args.first(), msg.args.get(1).and_then(osc_float))
                {
                    self.blendshapes.insert(name.clone(), value);
                }
            }

            // /VMC/Ext/Blend/Apply
            "/VMC/Ext/Blend/Apply" => {
                frames.push(FaceFrame {
                    head: self.head.unwrap_or_default(),
                    blendshapes: self.blendshapes.clone(),
                });
            }

            // /VMC/Ext/Bone/Pos <name> <px> <py> <pz> <qx> <qy> <qz> <qw>
            "/VMC/Ext/Bone/Pos" => {
                if msg.args.len() < 8 {
                    return;
                }
                if !matches!(msg.args.first(), Some(OscType::String(name)) if name == HEAD_BONE) {
                    return;
                }

                let floats: Vec<f32> = msg.args[1..8].iter().filter_map(osc_float).collect();
                if let [px, py, pz, qx, qy, qz, qw] = floats[..] {
                    self.head = Some(HeadTransform::new(
                        Vec3::new(px, py, pz),
                        Quat::from_xyzw(qx, qy, qz, qw).normalize(),
                    ));
                }
            }

            _ => {
                tracing::trace!("Ignoring VMC message: {}", msg.addr);
            }
        }
    }
}

fn osc_float(arg: &OscType) -> Option<f32> {
    let value = match arg {
        OscType::Float(f) => *f,
        OscType::Double(d) => *d as f32,
        OscType::Int(i) => *i as f32,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
