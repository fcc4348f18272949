//! The explosion sound. Entirely optional: any failure at startup leaves a silent cue.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Something that can be told a firework just exploded.
pub trait ExplosionCue {
    /// Fire and forget. Must never fail or block.
    fn play_explosion_cue(&self);
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("couldn't read sound file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[cfg(feature = "audio")]
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),

    #[cfg(feature = "audio")]
    #[error("couldn't decode sound file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("built without audio support (enable the `audio` feature)")]
    Unsupported,
}

/// The explosion cue used by the running program.
pub struct Audio {
    player: Option<backend::Player>,
}

impl Audio {
    /// A cue that never makes a sound.
    pub fn disabled() -> Self {
        Self { player: None }
    }

    /// Load the explosion sound from `path`. Failing to do so is not an error for the
    /// program: a warning is logged and the returned cue stays silent.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(player) => {
                tracing::info!("Loaded explosion sound from {}", path.display());
                Self {
                    player: Some(player),
                }
            }
            Err(error) => {
                tracing::warn!("{error}, explosion sound disabled");
                Self::disabled()
            }
        }
    }

    fn try_load(path: &Path) -> Result<backend::Player, AudioError> {
        let bytes = std::fs::read(path).map_err(|source| AudioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        backend::Player::new(bytes)
    }

    pub fn is_enabled(&self) -> bool {
        self.player.is_some()
    }
}

impl ExplosionCue for Audio {
    fn play_explosion_cue(&self) {
        if let Some(player) = &self.player {
            player.play();
        }
    }
}

#[cfg(feature = "audio")]
mod backend {
    use std::io::Cursor;

    use rodio::source::Buffered;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Source as _};

    use super::AudioError;

    pub(super) struct Player {
        // Dropping the stream stops all playback, so it lives as long as the player
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sound: Buffered<Decoder<Cursor<Vec<u8>>>>,
    }

    impl Player {
        pub(super) fn new(bytes: Vec<u8>) -> Result<Self, AudioError> {
            let sound = Decoder::new(Cursor::new(bytes))?.buffered();
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
                sound,
            })
        }

        pub(super) fn play(&self) {
            if let Err(error) = self.handle.play_raw(self.sound.clone().convert_samples()) {
                tracing::trace!("Explosion sound dropped: {error}");
            }
        }
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    use super::AudioError;

    pub(super) struct Player;

    impl Player {
        pub(super) fn new(_bytes: Vec<u8>) -> Result<Self, AudioError> {
            Err(AudioError::Unsupported)
        }

        pub(super) fn play(&self) {}
    }
}
