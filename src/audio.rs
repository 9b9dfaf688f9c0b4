//! Synthesised sound effects
//!
//! Every [`Sound`] maps to a short sequence of sine tones that is appended to
//! a detached sink. Playback problems never reach the game: if no output
//! device exists the manager is simply not created, and a sink that fails to
//! open drops the sound.

use crate::game::Sound;
use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::time::Duration;
use tracing::{debug, warn};

/// Loudest any single tone gets at volume 100
const MASTER_GAIN: f32 = 0.35;

/// One note of an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub millis: u64,
}

const fn tone(frequency: f32, millis: u64) -> Tone {
    Tone { frequency, millis }
}

const MOVE: &[Tone] = &[tone(220.0, 25)];
const ROTATE: &[Tone] = &[tone(330.0, 30)];
const LOCK: &[Tone] = &[tone(130.8, 45)];
const HARD_DROP: &[Tone] = &[tone(196.0, 30), tone(98.0, 60)];
const HOLD: &[Tone] = &[tone(392.0, 40), tone(523.3, 40)];
const SINGLE: &[Tone] = &[tone(523.3, 70), tone(659.3, 90)];
const DOUBLE: &[Tone] = &[tone(523.3, 60), tone(659.3, 60), tone(784.0, 90)];
const TRIPLE: &[Tone] = &[
    tone(523.3, 50),
    tone(659.3, 50),
    tone(784.0, 50),
    tone(1046.5, 100),
];
const TETRIS: &[Tone] = &[
    tone(523.3, 50),
    tone(659.3, 50),
    tone(784.0, 50),
    tone(1046.5, 50),
    tone(1318.5, 160),
];
const LEVEL_UP: &[Tone] = &[tone(440.0, 80), tone(554.4, 80), tone(659.3, 80), tone(880.0, 200)];
const GAME_OVER: &[Tone] = &[tone(392.0, 180), tone(311.1, 180), tone(261.6, 180), tone(196.0, 400)];

/// Notes played for `sound`
pub fn tones(sound: Sound) -> &'static [Tone] {
    match sound {
        Sound::Move => MOVE,
        Sound::Rotate => ROTATE,
        Sound::Lock => LOCK,
        Sound::HardDrop => HARD_DROP,
        Sound::Hold => HOLD,
        Sound::LineClear(0 | 1) => SINGLE,
        Sound::LineClear(2) => DOUBLE,
        Sound::LineClear(3) => TRIPLE,
        Sound::LineClear(_) => TETRIS,
        Sound::LevelUp => LEVEL_UP,
        Sound::GameOver => GAME_OVER,
    }
}

/// Map a 0-100 volume to a sink gain
pub fn gain(volume: u8, muted: bool) -> f32 {
    if muted {
        return 0.0;
    }
    f32::from(volume.min(100)) / 100.0 * MASTER_GAIN
}

/// Audio manager handles all sound playback
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    volume: u8,
    muted: bool,
}

impl AudioManager {
    /// Open the default output device, or `None` if there isn't one
    pub fn new(volume: u8, muted: bool) -> Option<Self> {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "no audio output, running silent");
                return None;
            }
        };

        Some(Self {
            _stream: stream,
            stream_handle,
            volume: volume.min(100),
            muted,
        })
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Play a sound effect
    pub fn play(&self, sound: Sound) {
        let gain = gain(self.volume, self.muted);
        if gain <= 0.0 {
            return;
        }

        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                debug!(error = %e, ?sound, "dropping sound");
                return;
            }
        };
        for note in tones(sound) {
            let source = SineWave::new(note.frequency)
                .take_duration(Duration::from_millis(note.millis))
                .fade_in(Duration::from_millis(4))
                .amplify(gain);
            sink.append(source);
        }
        sink.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sound_has_notes() {
        let sounds = [
            Sound::Move,
            Sound::Rotate,
            Sound::Lock,
            Sound::HardDrop,
            Sound::Hold,
            Sound::LineClear(1),
            Sound::LineClear(2),
            Sound::LineClear(3),
            Sound::LineClear(4),
            Sound::LevelUp,
            Sound::GameOver,
        ];
        for sound in sounds {
            let notes = tones(sound);
            assert!(!notes.is_empty(), "{sound:?}");
            assert!(notes.iter().all(|n| n.frequency > 0.0 && n.millis > 0));
        }
    }

    #[test]
    fn bigger_clears_play_longer() {
        let length = |count| tones(Sound::LineClear(count)).len();
        assert!(length(1) < length(2));
        assert!(length(2) < length(3));
        assert!(length(3) < length(4));
    }

    #[test]
    fn gain_follows_volume_and_mute() {
        assert_eq!(gain(0, false), 0.0);
        assert_eq!(gain(100, true), 0.0);
        assert!(gain(50, false) < gain(100, false));
        assert_eq!(gain(200, false), gain(100, false));
    }
}
