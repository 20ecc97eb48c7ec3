//! Backend for running without an audio device

use std::path::PathBuf;

use super::{SoundBackend, SoundHandle};
use crate::error::AudioError;

/// Resolves sound files like a real backend but only logs plays
#[derive(Debug, Clone)]
pub struct SilentBackend {
    sounds_dir: PathBuf,
    sounds: Vec<PathBuf>,
}

impl SilentBackend {
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            sounds_dir: sounds_dir.into(),
            sounds: Vec::new(),
        }
    }
}

impl SoundBackend for SilentBackend {
    fn load_sound(&mut self, resource: &str) -> Result<SoundHandle, AudioError> {
        let path = self.sounds_dir.join(resource);
        if !path.is_file() {
            return Err(AudioError::ResourceNotFound(resource.to_string()));
        }
        self.sounds.push(path);
        Ok(SoundHandle(self.sounds.len() - 1))
    }

    fn play(&mut self, sound: SoundHandle) {
        match self.sounds.get(sound.0) {
            Some(path) => tracing::info!("Click ({})", path.display()),
            None => tracing::warn!("Unknown sound handle {:?}", sound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let mut backend = SilentBackend::new("does/not/exist");
        assert!(matches!(
            backend.load_sound("mixkit-classic-click.wav"),
            Err(AudioError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_existing_file() {
        let dir = std::env::temp_dir();
        let name = format!("goldeneyes-silent-{}.wav", std::process::id());
        std::fs::write(dir.join(&name), b"RIFF").unwrap();

        let mut backend = SilentBackend::new(&dir);
        let handle = backend.load_sound(&name).unwrap();
        assert_eq!(handle, SoundHandle(0));
        backend.play(handle);

        std::fs::remove_file(dir.join(&name)).ok();
    }
}
