//! Tracking session state machine
//!
//! `Inactive` ↔ `Active`. Activation starts a tracker session and spawns the
//! eye rig; deactivation removes the rig and stops the tracker. Frames are
//! applied only when they carry the active session's id, so a frame that was
//! already queued when the session ended is dropped.

use crate::error::TrackingError;
use crate::eyes::{EyeRig, FaceAnimationUpdater, RigSpec};
use crate::scene::SceneGraph;
use crate::tracking::{FaceTracker, SessionFrame, SessionId, TrackingOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Active { session: SessionId, rig: EyeRig },
}

/// What happened to a delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Applied,
    /// No session is active
    Inactive,
    /// Frame belongs to a session that already ended
    Stale,
}

#[derive(Debug)]
pub struct EyeSession {
    options: TrackingOptions,
    spec: RigSpec,
    updater: FaceAnimationUpdater,
    state: SessionState,
}

impl EyeSession {
    pub fn new(options: TrackingOptions, spec: RigSpec, updater: FaceAnimationUpdater) -> Self {
        Self {
            options,
            spec,
            updater,
            state: SessionState::Inactive,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn rig(&self) -> Option<&EyeRig> {
        match &self.state {
            SessionState::Active { rig, .. } => Some(rig),
            SessionState::Inactive => None,
        }
    }

    pub fn updater(&self) -> &FaceAnimationUpdater {
        &self.updater
    }

    /// Start tracking and spawn the rig. No-op when already active.
    pub fn activate<T, S>(&mut self, tracker: &mut T, scene: &mut S) -> Result<(), TrackingError>
    where
        T: FaceTracker + ?Sized,
        S: SceneGraph + ?Sized,
    {
        if self.is_active() {
            return Ok(());
        }

        let session = tracker.start(&self.options)?;
        let rig = EyeRig::spawn(scene, &self.spec, self.updater.style());
        self.state = SessionState::Active { session, rig };

        tracing::info!("Eye session active ({})", session);
        Ok(())
    }

    /// Remove the rig and stop tracking. No-op when inactive.
    pub fn deactivate<T, S>(&mut self, tracker: &mut T, scene: &mut S)
    where
        T: FaceTracker + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let SessionState::Active { session, .. } = self.state else {
            return;
        };

        self.state = SessionState::Inactive;
        scene.remove_all_anchors();
        tracker.stop(session);

        tracing::info!("Eye session inactive ({})", session);
    }

    /// Apply a delivered frame to the rig
    pub fn on_frame<S>(&self, scene: &mut S, delivered: &SessionFrame) -> FrameOutcome
    where
        S: SceneGraph + ?Sized,
    {
        let SessionState::Active { session, rig } = &self.state else {
            tracing::trace!("Dropping frame from {}: no active session", delivered.session);
            return FrameOutcome::Inactive;
        };

        if delivered.session != *session {
            tracing::trace!(
                "Dropping stale frame from {} (active {})",
                delivered.session,
                session
            );
            return FrameOutcome::Stale;
        }

        scene.track_face(&delivered.frame.head);
        self.updater.update(scene, rig, &delivered.frame);
        FrameOutcome::Applied
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::eyes::ScaleCurve;
    use crate::scene::{Camera, SceneWorld};
    use crate::tracking::{blendshapes, FaceFrame};

    /// Tracker double that records start/stop calls
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTracker {
        pub next: u64,
        pub running: Option<SessionId>,
        pub starts: usize,
        pub stops: usize,
        pub unavailable: bool,
    }

    impl FaceTracker for ScriptedTracker {
        fn start(&mut self, _options: &TrackingOptions) -> Result<SessionId, TrackingError> {
            if self.unavailable {
                return Err(TrackingError::Unavailable("no camera".to_string()));
            }
            self.next += 1;
            self.starts += 1;
            let id = SessionId(self.next);
            self.running = Some(id);
            Ok(id)
        }

        fn stop(&mut self, session: SessionId) {
            if self.running == Some(session) {
                self.running = None;
            }
            self.stops += 1;
        }
    }

    fn procedural_session() -> EyeSession {
        EyeSession::new(
            TrackingOptions::default(),
            RigSpec::default(),
            FaceAnimationUpdater::procedural(ScaleCurve::PROCEDURAL),
        )
    }

    fn scene() -> SceneWorld {
        SceneWorld::new(Camera::new(&CameraConfig::default()))
    }

    fn jaw_frame(session: SessionId, jaw_open: f32) -> SessionFrame {
        SessionFrame {
            session,
            frame: FaceFrame::default().with_blendshape(blendshapes::JAW_OPEN, jaw_open),
        }
    }

    #[test]
    fn test_toggle_twice_keeps_two_markers() {
        let mut tracker = ScriptedTracker::default();
        let mut scene = scene();
        let mut session = procedural_session();

        session.activate(&mut tracker, &mut scene).unwrap();
        assert_eq!(scene.attached_markers().len(), 2);

        for _ in 0..2 {
            session.deactivate(&mut tracker, &mut scene);
            assert!(scene.attached_markers().is_empty());
            assert!(scene.anchors().is_empty());

            session.activate(&mut tracker, &mut scene).unwrap();
            assert_eq!(scene.attached_markers().len(), 2);
            assert_eq!(scene.anchors().len(), 1);
        }

        assert_eq!(tracker.starts, 3);
        assert_eq!(tracker.stops, 2);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut tracker = ScriptedTracker::default();
        let mut scene = scene();
        let mut session = procedural_session();

        session.activate(&mut tracker, &mut scene).unwrap();
        session.activate(&mut tracker, &mut scene).unwrap();

        assert_eq!(tracker.starts, 1);
        assert_eq!(scene.attached_markers().len(), 2);
    }

    #[test]
    fn test_frame_after_deactivate_is_dropped() {
        let mut tracker = ScriptedTracker::default();
        let mut scene = scene();
        let mut session = procedural_session();

        session.activate(&mut tracker, &mut scene).unwrap();
        let SessionState::Active { session: id, .. } = session.state() else {
            panic!("session should be active");
        };
        let in_flight = jaw_frame(id, 0.7);

        session.deactivate(&mut tracker, &mut scene);
        let revision = scene.revision();

        assert_eq!(session.on_frame(&mut scene, &in_flight), FrameOutcome::Inactive);
        assert_eq!(scene.revision(), revision);
    }

    #[test]
    fn test_frame_from_previous_session_is_stale() {
        let mut tracker = ScriptedTracker::default();
        let mut scene = scene();
        let mut session = procedural_session();

        session.activate(&mut tracker, &mut scene).unwrap();
        let old = jaw_frame(tracker.running.unwrap(), 1.0);
        session.deactivate(&mut tracker, &mut scene);
        session.activate(&mut tracker, &mut scene).unwrap();

        let revision = scene.revision();
        assert_eq!(session.on_frame(&mut scene, &old), FrameOutcome::Stale);
        assert_eq!(scene.revision(), revision);

        let current = jaw_frame(tracker.running.unwrap(), 0.5);
        assert_eq!(session.on_frame(&mut scene, &current), FrameOutcome::Applied);
        let rig = session.rig().unwrap();
        let scale = scene.local_transform(rig.left).unwrap().scale;
        assert!((scale.x - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_unavailable_tracker_fails_activation() {
        let mut tracker = ScriptedTracker {
            unavailable: true,
            ..Default::default()
        };
        let mut scene = scene();
        let mut session = procedural_session();

        let result = session.activate(&mut tracker, &mut scene);
        assert!(matches!(result, Err(TrackingError::Unavailable(_))));
        assert!(!session.is_active());
        assert!(scene.anchors().is_empty());
    }
}
