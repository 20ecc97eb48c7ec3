//! Audio module
//!
//! Plays a click when a tap lands on an entity.

#[cfg(feature = "playback")]
pub mod playback;
pub mod silent;

use crate::error::AudioError;
use crate::scene::{EntityId, SceneGraph};

#[cfg(feature = "playback")]
pub use playback::RodioBackend;
pub use silent::SilentBackend;

/// Handle to a sound loaded by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub usize);

/// Loads and plays sound resources
pub trait SoundBackend {
    fn load_sound(&mut self, resource: &str) -> Result<SoundHandle, AudioError>;

    /// Fire and forget; overlapping plays are allowed
    fn play(&mut self, sound: SoundHandle);
}

impl<B: SoundBackend + ?Sized> SoundBackend for Box<B> {
    fn load_sound(&mut self, resource: &str) -> Result<SoundHandle, AudioError> {
        (**self).load_sound(resource)
    }

    fn play(&mut self, sound: SoundHandle) {
        (**self).play(sound)
    }
}

#[derive(Debug, Clone, Copy)]
enum SoundSlot {
    Unloaded,
    Loaded(SoundHandle),
    /// Load failed once; taps stay silent
    Failed,
}

/// Result of a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing under the tap
    Miss,
    /// An entity was hit and the click played
    Played(EntityId),
    /// An entity was hit but there is no sound to play
    Silent(EntityId),
}

/// Tap handler: pick, then play the cue.
///
/// The sound is loaded on the first tap that hits something and reused for
/// every later hit. A failed load is reported once and never retried.
pub struct TapNotifier<B: SoundBackend> {
    backend: B,
    resource: String,
    sound: SoundSlot,
}

impl<B: SoundBackend> TapNotifier<B> {
    pub fn new(backend: B, resource: impl Into<String>) -> Self {
        Self {
            backend,
            resource: resource.into(),
            sound: SoundSlot::Unloaded,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handle a tap at screen coordinates
    pub fn handle_tap<S: SceneGraph + ?Sized>(&mut self, scene: &S, x: f32, y: f32) -> TapOutcome {
        let Some(entity) = scene.pick(x, y) else {
            tracing::debug!("Tap at ({}, {}) hit nothing", x, y);
            return TapOutcome::Miss;
        };

        tracing::debug!("Tap at ({}, {}) hit {:?}", x, y, entity);
        if self.play() {
            TapOutcome::Played(entity)
        } else {
            TapOutcome::Silent(entity)
        }
    }

    fn play(&mut self) -> bool {
        if let SoundSlot::Unloaded = self.sound {
            self.sound = match self.backend.load_sound(&self.resource) {
                Ok(sound) => SoundSlot::Loaded(sound),
                Err(e) => {
                    tracing::warn!("{}", e);
                    SoundSlot::Failed
                }
            };
        }

        match self.sound {
            SoundSlot::Loaded(sound) => {
                self.backend.play(sound);
                true
            }
            SoundSlot::Unloaded | SoundSlot::Failed => false,
        }
    }
}
