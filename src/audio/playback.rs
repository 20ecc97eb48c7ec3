//! Sound playback through rodio
//!
//! The output stream must stay alive for as long as sounds play, and it is not
//! `Send`, so this backend lives on the thread that drives the screen.

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use super::{SoundBackend, SoundHandle};
use crate::error::AudioError;

/// Encoded sound bytes, decoded afresh for every play
#[derive(Debug, Clone)]
pub struct ClickSound {
    bytes: Arc<Vec<u8>>,
}

impl AsRef<[u8]> for ClickSound {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl ClickSound {
    fn decoder(&self) -> Result<Decoder<Cursor<ClickSound>>, AudioError> {
        Decoder::new(Cursor::new(self.clone())).map_err(|e| AudioError::Decode(e.to_string()))
    }
}

/// Plays sounds on the default output device
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sounds_dir: PathBuf,
    sounds: Vec<ClickSound>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::OutputDevice(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            handle,
            sounds_dir: sounds_dir.into(),
            sounds: Vec::new(),
        })
    }
}

impl SoundBackend for RodioBackend {
    fn load_sound(&mut self, resource: &str) -> Result<SoundHandle, AudioError> {
        let path = self.sounds_dir.join(resource);
        if !path.is_file() {
            return Err(AudioError::ResourceNotFound(resource.to_string()));
        }

        let bytes = std::fs::read(&path)
            .map_err(|e| AudioError::Decode(format!("{}: {}", path.display(), e)))?;
        let sound = ClickSound {
            bytes: Arc::new(bytes),
        };

        // Fail at load time rather than on every tap
        sound.decoder()?;

        tracing::info!("Loaded sound {}", path.display());
        self.sounds.push(sound);
        Ok(SoundHandle(self.sounds.len() - 1))
    }

    fn play(&mut self, handle: SoundHandle) {
        let Some(sound) = self.sounds.get(handle.0) else {
            tracing::warn!("Unknown sound handle {:?}", handle);
            return;
        };

        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("{}", AudioError::Playback(e.to_string()));
                return;
            }
        };

        match sound.decoder() {
            Ok(decoder) => {
                sink.append(decoder);
                sink.detach();
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
