//! UDP face tracker
//!
//! Binds a UDP socket on the first session and decodes VMC or MediaPipe
//! datagrams on one tokio task per session. Frames reach the consumer
//! through a channel, stamped with the session that produced them.

use std::net::UdpSocket as StdUdpSocket;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{mediapipe, vmc::VmcDecoder, FaceTracker, HeadTransform, SessionFrame, SessionId};
use super::{FaceFrame, TrackingOptions};
use crate::config::{TrackingConfig, TrackingProtocol};
use crate::error::TrackingError;

const FRAME_QUEUE: usize = 64;

struct RunningSession {
    id: SessionId,
    task: JoinHandle<()>,
}

/// Face tracker fed by a VMC or MediaPipe sender over UDP
pub struct UdpFaceTracker {
    config: TrackingConfig,
    next_session: u64,
    running: Option<RunningSession>,
    socket: Option<Arc<UdpSocket>>,
    /// Head pose carried across sessions unless `reset_tracking` is set
    last_head: Arc<Mutex<Option<HeadTransform>>>,
    frame_tx: mpsc::Sender<SessionFrame>,
    frame_rx: mpsc::Receiver<SessionFrame>,
}

impl UdpFaceTracker {
    /// Create a new tracker (does not bind yet)
    pub fn new(config: &TrackingConfig) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE);
        Self {
            config: config.clone(),
            next_session: 1,
            running: None,
            socket: None,
            last_head: Arc::new(Mutex::new(None)),
            frame_tx,
            frame_rx,
        }
    }

    /// Listen address of the tracker
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.listen_address, self.config.port)
    }

    /// Currently running session, if any
    pub fn session(&self) -> Option<SessionId> {
        self.running.as_ref().map(|r| r.id)
    }

    /// Wait for the next decoded frame
    pub async fn recv(&mut self) -> Option<SessionFrame> {
        self.frame_rx.recv().await
    }

    fn drain_queued(&mut self) -> usize {
        let mut dropped = 0;
        while self.frame_rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Bound socket, binding it on first use
    fn socket(&mut self) -> Result<Arc<UdpSocket>, TrackingError> {
        if let Some(socket) = &self.socket {
            return Ok(Arc::clone(socket));
        }

        let addr = self.address();

        let socket = StdUdpSocket::bind(&addr).map_err(|e| {
            TrackingError::Unavailable(format!("Failed to bind to {}: {}", addr, e))
        })?;

        socket.set_nonblocking(true).map_err(|e| {
            TrackingError::Unavailable(format!("Failed to set non-blocking: {}", e))
        })?;

        let socket = UdpSocket::from_std(socket).map_err(|e| {
            TrackingError::Unavailable(format!("Failed to register socket: {}", e))
        })?;

        let socket = Arc::new(socket);
        self.socket = Some(Arc::clone(&socket));
        Ok(socket)
    }
}

impl FaceTracker for UdpFaceTracker {
    fn start(&mut self, options: &TrackingOptions) -> Result<SessionId, TrackingError> {
        if let Some(running) = self.running.take() {
            tracing::debug!("Replacing running {}", running.id);
            running.task.abort();
        }

        if options.reset_tracking {
            if let Ok(mut head) = self.last_head.lock() {
                *head = None;
            }
        }

        if options.remove_existing_anchors {
            let dropped = self.drain_queued();
            if dropped > 0 {
                tracing::debug!("Dropped {} queued frames", dropped);
            }
        }

        let socket = self.socket()?;
        let id = SessionId(self.next_session);
        self.next_session += 1;

        let receiver = SessionReceiver {
            id,
            protocol: self.config.protocol,
            socket,
            last_head: Arc::clone(&self.last_head),
            frame_tx: self.frame_tx.clone(),
        };
        let task = tokio::spawn(receiver.run());

        tracing::info!(
            "{:?} tracker listening on {} ({})",
            self.config.protocol,
            self.address(),
            id
        );
        self.running = Some(RunningSession { id, task });

        Ok(id)
    }

    fn stop(&mut self, session: SessionId) {
        match self.running.take() {
            Some(running) if running.id == session => {
                running.task.abort();
                tracing::info!("Tracker stopped ({})", session);
            }
            other => {
                tracing::debug!("Stop requested for {} which is not running", session);
                self.running = other;
            }
        }
    }
}

impl Drop for UdpFaceTracker {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

/// Per-session receive loop
struct SessionReceiver {
    id: SessionId,
    protocol: TrackingProtocol,
    socket: Arc<UdpSocket>,
    last_head: Arc<Mutex<Option<HeadTransform>>>,
    frame_tx: mpsc::Sender<SessionFrame>,
}

impl SessionReceiver {
    async fn run(self) {
        let seeded = self.last_head.lock().ok().and_then(|head| *head);
        let mut decoder = VmcDecoder::with_head(seeded);
        let mut buf = [0u8; 65536];

        loop {
            let size = match self.socket.recv(&mut buf).await {
                Ok(size) => size,
                Err(e) => {
                    let error = TrackingError::Receiver(e.to_string());
                    tracing::error!("{} ({})", error, self.id);
                    return;
                }
            };

            let frames = match self.decode(&mut decoder, &buf[..size]) {
                Ok(frames) => frames,
                Err(e) => {
                    tracing::debug!("{}", e);
                    continue;
                }
            };

            for frame in frames {
                if let Ok(mut head) = self.last_head.lock() {
                    *head = Some(frame.head);
                }
                let stamped = SessionFrame {
                    session: self.id,
                    frame,
                };
                if self.frame_tx.send(stamped).await.is_err() {
                    return;
                }
            }
        }
    }

    fn decode(
        &self,
        decoder: &mut VmcDecoder,
        datagram: &[u8],
    ) -> Result<Vec<FaceFrame>, TrackingError> {
        match self.protocol {
            TrackingProtocol::Vmc => decoder.decode(datagram),
            TrackingProtocol::MediaPipe => Ok(mediapipe::decode(datagram)?.into_iter().collect()),
        }
    }
}
