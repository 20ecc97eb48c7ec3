//! Demo screens
//!
//! A home menu leads to two screens, one per authoring path. Each screen owns
//! its scene and eye session and has a single Show/Hide toggle.

pub mod console;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::audio::{SoundBackend, TapNotifier, TapOutcome};
use crate::config::Config;
use crate::error::{CommandError, TrackingError};
use crate::eyes::{FaceAnimationUpdater, RigSpec, RigStyle};
use crate::scene::{Camera, SceneGraph, SceneWorld};
use crate::session::{EyeSession, FrameOutcome};
use crate::tracking::{FaceTracker, SessionFrame};

pub use console::Command;

/// Title of the home menu
pub const MENU_TITLE: &str = "Demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Eyes shaped like the authored scene, anchor tracks the face itself
    RealityComposer,
    /// Eyes built in code, anchor posed every frame
    PureCode,
}

impl Screen {
    pub const ALL: [Screen; 2] = [Self::RealityComposer, Self::PureCode];

    pub fn title(self) -> &'static str {
        match self {
            Self::RealityComposer => "By Reality Composer",
            Self::PureCode => "By Pure Code",
        }
    }

    /// Menu selection value
    pub fn selection(self) -> u32 {
        match self {
            Self::RealityComposer => 1,
            Self::PureCode => 2,
        }
    }

    /// Screen for a menu selection; anything but 1 opens the code path
    pub fn from_selection(value: u32) -> Self {
        match value {
            1 => Self::RealityComposer,
            _ => Self::PureCode,
        }
    }

    pub fn rig_style(self) -> RigStyle {
        match self {
            Self::RealityComposer => RigStyle::SceneFile,
            Self::PureCode => RigStyle::Procedural,
        }
    }

    pub fn handles_taps(self) -> bool {
        self == Self::PureCode
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Screen {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.parse::<u32>() {
            return Ok(Self::from_selection(value));
        }
        match s.to_lowercase().replace('-', "_").as_str() {
            "reality_composer" | "reality" | "scene_file" => Ok(Self::RealityComposer),
            "pure_code" | "code" | "procedural" => Ok(Self::PureCode),
            _ => Err(CommandError::InvalidArgument {
                command: "open",
                value: s.to_string(),
            }),
        }
    }
}

/// Home menu text
pub fn render_menu() -> String {
    let mut out = format!("{}\n", MENU_TITLE);
    for screen in Screen::ALL {
        out.push_str(&format!("  {}. {}\n", screen.selection(), screen.title()));
    }
    out
}

/// Show/Hide toggle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Self::Shown => Self::Hidden,
            Self::Hidden => Self::Shown,
        }
    }

    /// Label of the toggle button: the action it will perform
    pub fn button_label(self) -> &'static str {
        match self {
            Self::Shown => "Hide",
            Self::Hidden => "Show",
        }
    }
}

/// One open demo screen
pub struct DemoScreen<B: SoundBackend> {
    screen: Screen,
    scene: SceneWorld,
    session: EyeSession,
    taps: Option<TapNotifier<B>>,
    visibility: Visibility,
}

impl<B: SoundBackend> DemoScreen<B> {
    /// Open a screen. Screens start shown, so tracking must start now.
    pub fn open<T: FaceTracker + ?Sized>(
        screen: Screen,
        config: &Config,
        tracker: &mut T,
        backend: Option<B>,
    ) -> Result<Self, TrackingError> {
        let curve = match screen.rig_style() {
            RigStyle::Procedural => config.eyes.procedural_curve,
            RigStyle::SceneFile => config.eyes.scene_file_curve,
        };
        let updater = FaceAnimationUpdater::new(screen.rig_style(), curve);
        let session = EyeSession::new(
            config.tracking.options(),
            RigSpec::from(&config.eyes),
            updater,
        );

        let taps = if screen.handles_taps() {
            backend.map(|backend| TapNotifier::new(backend, config.audio.tap_sound.clone()))
        } else {
            None
        };

        let mut demo = Self {
            screen,
            scene: SceneWorld::new(Camera::new(&config.camera)),
            session,
            taps,
            visibility: Visibility::Shown,
        };
        demo.show(tracker)?;

        tracing::info!("Opened screen: {}", screen.title());
        Ok(demo)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn scene(&self) -> &SceneWorld {
        &self.scene
    }

    pub fn session(&self) -> &EyeSession {
        &self.session
    }

    /// Flip Show/Hide
    pub fn toggle<T: FaceTracker + ?Sized>(
        &mut self,
        tracker: &mut T,
    ) -> Result<Visibility, TrackingError> {
        match self.visibility.toggled() {
            Visibility::Shown => self.show(tracker)?,
            Visibility::Hidden => self.hide(tracker),
        }
        Ok(self.visibility)
    }

    fn show<T: FaceTracker + ?Sized>(&mut self, tracker: &mut T) -> Result<(), TrackingError> {
        self.session.activate(tracker, &mut self.scene)?;
        self.visibility = Visibility::Shown;
        if self.screen.rig_style() == RigStyle::SceneFile {
            tracing::debug!("didAdd: face anchor");
        }
        Ok(())
    }

    fn hide<T: FaceTracker + ?Sized>(&mut self, tracker: &mut T) {
        self.session.deactivate(tracker, &mut self.scene);
        self.visibility = Visibility::Hidden;
        if self.screen.rig_style() == RigStyle::SceneFile {
            tracing::debug!("didRemove: face anchor");
        }
    }

    pub fn on_frame(&mut self, frame: &SessionFrame) -> FrameOutcome {
        self.session.on_frame(&mut self.scene, frame)
    }

    /// Handle a tap; `None` when this screen has no tap handler
    pub fn tap(&mut self, x: f32, y: f32) -> Option<TapOutcome> {
        let taps = self.taps.as_mut()?;
        Some(taps.handle_tap(&self.scene, x, y))
    }

    /// Leave the screen, tearing the session down
    pub fn close<T: FaceTracker + ?Sized>(mut self, tracker: &mut T) {
        self.hide(tracker);
        tracing::info!("Closed screen: {}", self.screen.title());
    }

    /// One-line summary for the console
    pub fn status(&self) -> String {
        let mut status = format!(
            "{} [{}] button: {}",
            self.screen.title(),
            match self.visibility {
                Visibility::Shown => "shown",
                Visibility::Hidden => "hidden",
            },
            self.visibility.button_label()
        );

        if let Some(rig) = self.session.rig() {
            for (label, marker) in [("left", rig.left), ("right", rig.right)] {
                if let Some(transform) = self.scene.local_transform(marker) {
                    status.push_str(&format!(" {}={:.3}", label, transform.scale.x));
                }
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundHandle;
    use crate::error::AudioError;
    use crate::session::tests::ScriptedTracker;
    use crate::tracking::{blendshapes, FaceFrame, HeadTransform};
    use glam::{Quat, Vec3};

    #[derive(Default)]
    struct CountingBackend {
        plays: usize,
    }

    impl SoundBackend for CountingBackend {
        fn load_sound(&mut self, _resource: &str) -> Result<SoundHandle, AudioError> {
            Ok(SoundHandle(0))
        }

        fn play(&mut self, _sound: SoundHandle) {
            self.plays += 1;
        }
    }

    fn frame(tracker: &ScriptedTracker, jaw_open: f32) -> SessionFrame {
        let head = HeadTransform::new(Vec3::new(0.0, 0.0, -0.4), Quat::IDENTITY);
        SessionFrame {
            session: tracker.running.unwrap(),
            frame: FaceFrame::new(head).with_blendshape(blendshapes::JAW_OPEN, jaw_open),
        }
    }

    #[test]
    fn test_menu_selection() {
        assert_eq!(Screen::from_selection(1), Screen::RealityComposer);
        assert_eq!(Screen::from_selection(2), Screen::PureCode);
        assert_eq!(Screen::from_selection(7), Screen::PureCode);
        assert_eq!("reality-composer".parse::<Screen>(), Ok(Screen::RealityComposer));
        assert_eq!("1".parse::<Screen>(), Ok(Screen::RealityComposer));
        assert!("nope".parse::<Screen>().is_err());

        let menu = render_menu();
        assert!(menu.starts_with("Demo"));
        assert!(menu.contains("1. By Reality Composer"));
        assert!(menu.contains("2. By Pure Code"));
    }

    #[test]
    fn test_toggle_labels() {
        assert_eq!(Visibility::Shown.button_label(), "Hide");
        assert_eq!(Visibility::Hidden.button_label(), "Show");
        assert_eq!(Visibility::Shown.toggled(), Visibility::Hidden);
    }

    #[test]
    fn test_screen_starts_shown_and_toggles() {
        let mut tracker = ScriptedTracker::default();
        let mut demo: DemoScreen<CountingBackend> =
            DemoScreen::open(Screen::PureCode, &Config::default(), &mut tracker, None).unwrap();

        assert_eq!(demo.visibility(), Visibility::Shown);
        assert_eq!(demo.scene().attached_markers().len(), 2);

        assert_eq!(demo.toggle(&mut tracker).unwrap(), Visibility::Hidden);
        assert!(demo.scene().attached_markers().is_empty());
        assert!(tracker.running.is_none());

        assert_eq!(demo.toggle(&mut tracker).unwrap(), Visibility::Shown);
        assert_eq!(demo.scene().attached_markers().len(), 2);
    }

    #[test]
    fn test_open_fails_fast_without_tracking() {
        let mut tracker = ScriptedTracker {
            unavailable: true,
            ..Default::default()
        };
        let result: Result<DemoScreen<CountingBackend>, _> =
            DemoScreen::open(Screen::RealityComposer, &Config::default(), &mut tracker, None);
        assert!(matches!(result, Err(TrackingError::Unavailable(_))));
    }

    #[test]
    fn test_reality_composer_curve_and_anchor() {
        let mut tracker = ScriptedTracker::default();
        let mut demo: DemoScreen<CountingBackend> = DemoScreen::open(
            Screen::RealityComposer,
            &Config::default(),
            &mut tracker,
            Some(CountingBackend::default()),
        )
        .unwrap();

        let f = frame(&tracker, 0.5);
        assert_eq!(demo.on_frame(&f), FrameOutcome::Applied);

        let rig = *demo.session().rig().unwrap();
        let scale = demo.scene().local_transform(rig.right).unwrap().scale;
        assert!((scale - Vec3::splat(0.55)).length() < 1e-5);

        // The face-tracked anchor followed the head
        let anchor = demo.scene().local_transform(rig.anchor.entity()).unwrap();
        assert_eq!(anchor.translation, Vec3::new(0.0, 0.0, -0.4));

        // No tap handler on this screen
        assert_eq!(demo.tap(195.0, 422.0), None);
    }

    #[test]
    fn test_pure_code_tap_plays() {
        let mut tracker = ScriptedTracker::default();
        let mut demo = DemoScreen::open(
            Screen::PureCode,
            &Config::default(),
            &mut tracker,
            Some(CountingBackend::default()),
        )
        .unwrap();

        let f = frame(&tracker, 0.0);
        demo.on_frame(&f);

        let rig = *demo.session().rig().unwrap();
        let world = demo
            .scene()
            .world_matrix(rig.right)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        let point = demo.scene().camera().world_to_screen(world).unwrap();

        assert_eq!(demo.tap(point.x, point.y), Some(TapOutcome::Played(rig.right)));
        assert_eq!(demo.tap(1.0, 1.0), Some(TapOutcome::Miss));
        assert!(demo.status().contains("button: Hide"));
    }

    #[test]
    fn test_nan_jaw_open_keeps_scale_and_taps_miss() {
        let mut tracker = ScriptedTracker::default();
        let mut demo = DemoScreen::open(
            Screen::PureCode,
            &Config::default(),
            &mut tracker,
            Some(CountingBackend::default()),
        )
        .unwrap();

        demo.on_frame(&frame(&tracker, 0.5));
        assert_eq!(demo.on_frame(&frame(&tracker, f32::NAN)), FrameOutcome::Applied);

        let rig = *demo.session().rig().unwrap();
        let scale = demo.scene().local_transform(rig.left).unwrap().scale;
        assert!((scale - Vec3::splat(1.8)).length() < 1e-5);

        assert_eq!(demo.tap(1.0, 1.0), Some(TapOutcome::Miss));
    }
}
