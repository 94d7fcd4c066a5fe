//! Fire-and-forget sound clip playback.

use heapless::Vec;
use rand::{Rng, RngCore};

use crate::driver::AudioDriver;
use crate::error::{ConfigError, Peripheral, PeripheralError, driver_error};
use crate::task::Actuator;
use crate::types::ActuatorKind;

/// Default playlist capacity.
pub const MAX_CLIPS: usize = 8;

/// A fixed, non-empty set of clip identifiers.
///
/// # Type Parameters
/// * `N` - Maximum number of clips
#[derive(Debug, Clone)]
pub struct Playlist<const N: usize = MAX_CLIPS> {
    clips: Vec<&'static str, N>,
}

impl<const N: usize> Playlist<N> {
    /// Creates a new playlist builder.
    pub fn builder() -> PlaylistBuilder<N> {
        PlaylistBuilder::new()
    }

    /// Builds a playlist from a slice of clips.
    ///
    /// # Errors
    /// * `EmptyPlaylist` - `clips` is empty
    /// * `CapacityExceeded` - more than `N` clips
    pub fn from_clips(clips: &[&'static str]) -> Result<Self, ConfigError> {
        clips
            .iter()
            .try_fold(Self::builder(), |builder, clip| builder.clip(*clip))?
            .build()
    }

    /// Returns the number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Always false: an empty playlist cannot be built.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Returns the clip at `index`.
    pub fn get(&self, index: usize) -> Option<&'static str> {
        self.clips.get(index).copied()
    }

    /// Iterates over the clips in order.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.clips.iter().copied()
    }
}

/// Builder for validated playlists.
#[derive(Debug)]
pub struct PlaylistBuilder<const N: usize> {
    clips: Vec<&'static str, N>,
}

impl<const N: usize> PlaylistBuilder<N> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { clips: Vec::new() }
    }

    /// Appends a clip.
    ///
    /// # Errors
    /// * `CapacityExceeded` - the playlist already holds `N` clips
    pub fn clip(mut self, clip: &'static str) -> Result<Self, ConfigError> {
        self.clips
            .push(clip)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(self)
    }

    /// Builds the playlist.
    ///
    /// # Errors
    /// * `EmptyPlaylist` - no clips were added
    pub fn build(self) -> Result<Playlist<N>, ConfigError> {
        if self.clips.is_empty() {
            return Err(ConfigError::EmptyPlaylist);
        }
        Ok(Playlist { clips: self.clips })
    }
}

impl<const N: usize> Default for PlaylistBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts one uniformly chosen clip per trigger.
///
/// The animation is over as soon as playback has been *started*: the task
/// raises its done signal while the clip is still playing.
pub struct AudioPlayback<A: AudioDriver, R: RngCore, const N: usize = MAX_CLIPS> {
    audio: A,
    rng: R,
    playlist: Playlist<N>,
    last_clip: Option<&'static str>,
}

impl<A: AudioDriver, R: RngCore, const N: usize> AudioPlayback<A, R, N> {
    /// Creates an audio player over `playlist`.
    pub fn new(audio: A, rng: R, playlist: Playlist<N>) -> Self {
        Self {
            audio,
            rng,
            playlist,
            last_clip: None,
        }
    }

    /// Returns the clip started by the most recent successful animation.
    pub fn last_clip(&self) -> Option<&'static str> {
        self.last_clip
    }

    /// Returns the playlist.
    pub fn playlist(&self) -> &Playlist<N> {
        &self.playlist
    }

    /// Returns the audio driver.
    pub fn driver(&self) -> &A {
        &self.audio
    }
}

impl<A: AudioDriver, R: RngCore, const N: usize> Actuator for AudioPlayback<A, R, N> {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Audio
    }

    async fn run_animation(&mut self) -> Result<(), PeripheralError> {
        let index = self.rng.gen_range(0..self.playlist.len());
        let Some(clip) = self.playlist.get(index) else {
            return Ok(());
        };

        info!("audio: playing {}", clip);
        self.audio
            .play(clip)
            .map_err(driver_error(Peripheral::Actuator(ActuatorKind::Audio)))?;
        self.last_clip = Some(clip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_playlist() {
        let result = Playlist::<4>::builder().build();
        assert!(matches!(result, Err(ConfigError::EmptyPlaylist)));
    }

    #[test]
    fn builder_rejects_overflow() {
        let result = Playlist::<2>::builder()
            .clip("a.mp3")
            .and_then(|b| b.clip("b.mp3"))
            .and_then(|b| b.clip("c.mp3"));
        assert!(matches!(result, Err(ConfigError::CapacityExceeded)));
    }

    #[test]
    fn from_clips_keeps_order() {
        let playlist = Playlist::<4>::from_clips(&["one.mp3", "two.mp3"]).unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.get(0), Some("one.mp3"));
        assert_eq!(playlist.get(1), Some("two.mp3"));
        assert_eq!(playlist.get(2), None);
    }

    #[test]
    fn from_empty_slice_is_rejected() {
        assert!(matches!(
            Playlist::<4>::from_clips(&[]),
            Err(ConfigError::EmptyPlaylist)
        ));
    }
}
