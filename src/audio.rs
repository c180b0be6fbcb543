//! Audio requests and the Web Audio sink
//!
//! The simulation never touches audio. Each frame the `GameEvent`s it raised
//! are turned into `PlayRequest`s, queued, and flushed into an `AudioSink`.
//! Sounds are procedurally generated oscillator tones; no external files.

use crate::error::AudioError;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase};

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator voice: start/end frequency, peak gain, offset and length in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub freq: f32,
    pub end_freq: f32,
    pub gain: f32,
    pub delay: f64,
    pub duration: f64,
}

const fn tone(wave: Wave, freq: f32, end_freq: f32, gain: f32, delay: f64, duration: f64) -> Tone {
    Tone { wave, freq, end_freq, gain, delay, duration }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Pixel Escape jump
    Jump,
    /// Star picked up
    Star,
    /// Heart picked up
    Heart,
    /// Shield, hotdog or candy
    PowerUp,
    /// Actor lost a life
    Hit,
    /// Bullet fired
    Laser,
    /// Monster damaged but alive
    MonsterHit,
    /// Monster destroyed
    Explosion,
    /// Shark school incoming
    Warning,
    /// Shopping cart grabbed
    CartGrab,
    /// Chaser caught the runner
    Tagged,
    /// Tag round timer ran out
    TimeUp,
    /// Difficulty stepped up
    LevelUp,
    /// Round started from the menu or game over screen
    MenuClick,
    GameOver,
    /// Best score beaten
    NewBest,
}

impl SoundEffect {
    /// The effect a simulation event should make, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::PhaseChanged { to: GamePhase::Playing, .. } => Some(SoundEffect::MenuClick),
            GameEvent::PhaseChanged { .. } => None,
            GameEvent::Jumped { .. } => Some(SoundEffect::Jump),
            GameEvent::BulletFired { .. } => Some(SoundEffect::Laser),
            GameEvent::CartGrabbed { .. } => Some(SoundEffect::CartGrab),
            GameEvent::ActorHit { .. } => Some(SoundEffect::Hit),
            GameEvent::StarCollected { .. } => Some(SoundEffect::Star),
            GameEvent::HeartCollected { .. } => Some(SoundEffect::Heart),
            GameEvent::PowerUpCollected { .. } => Some(SoundEffect::PowerUp),
            GameEvent::MonsterHit { .. } => Some(SoundEffect::MonsterHit),
            GameEvent::MonsterDestroyed { .. } => Some(SoundEffect::Explosion),
            GameEvent::DropSpawned { .. } => None,
            GameEvent::SharksIncoming { .. } => Some(SoundEffect::Warning),
            GameEvent::DifficultyRaised { .. } => Some(SoundEffect::LevelUp),
            GameEvent::Tagged => Some(SoundEffect::Tagged),
            GameEvent::TimeUp => Some(SoundEffect::TimeUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        }
    }

    pub fn tones(&self) -> &'static [Tone] {
        use Wave::*;
        match self {
            SoundEffect::Jump => &const { [tone(Square, 220.0, 440.0, 0.3, 0.0, 0.12)] },
            SoundEffect::Star => &const { [
                tone(Sine, 440.0, 440.0, 0.3, 0.0, 0.08),
                tone(Sine, 880.0, 880.0, 0.3, 0.07, 0.12),
            ] },
            SoundEffect::Heart => &const { [
                tone(Sine, 523.0, 523.0, 0.3, 0.0, 0.1),
                tone(Sine, 659.0, 659.0, 0.3, 0.1, 0.1),
                tone(Sine, 784.0, 784.0, 0.3, 0.2, 0.2),
            ] },
            SoundEffect::PowerUp => &const { [tone(Triangle, 330.0, 1320.0, 0.35, 0.0, 0.3)] },
            SoundEffect::Hit => &const { [
                tone(Sawtooth, 180.0, 60.0, 0.45, 0.0, 0.25),
                tone(Sine, 70.0, 40.0, 0.3, 0.0, 0.2),
            ] },
            SoundEffect::Laser => &const { [tone(Square, 1200.0, 300.0, 0.15, 0.0, 0.08)] },
            SoundEffect::MonsterHit => &const { [tone(Square, 300.0, 200.0, 0.25, 0.0, 0.06)] },
            SoundEffect::Explosion => &const { [
                tone(Sawtooth, 120.0, 30.0, 0.45, 0.0, 0.35),
                tone(Square, 60.0, 40.0, 0.25, 0.02, 0.3),
            ] },
            SoundEffect::Warning => &const { [
                tone(Square, 200.0, 200.0, 0.25, 0.0, 0.15),
                tone(Square, 200.0, 200.0, 0.25, 0.25, 0.15),
            ] },
            SoundEffect::CartGrab => &const { [tone(Triangle, 150.0, 300.0, 0.3, 0.0, 0.15)] },
            SoundEffect::Tagged => &const { [
                tone(Sawtooth, 440.0, 110.0, 0.4, 0.0, 0.4),
                tone(Square, 220.0, 55.0, 0.2, 0.05, 0.4),
            ] },
            SoundEffect::TimeUp => &const { [
                tone(Sine, 523.0, 523.0, 0.3, 0.0, 0.15),
                tone(Sine, 784.0, 784.0, 0.3, 0.15, 0.15),
                tone(Sine, 1047.0, 1047.0, 0.3, 0.3, 0.3),
            ] },
            SoundEffect::LevelUp => &const { [tone(Triangle, 440.0, 660.0, 0.2, 0.0, 0.15)] },
            SoundEffect::MenuClick => &const { [tone(Square, 660.0, 660.0, 0.2, 0.0, 0.05)] },
            SoundEffect::GameOver => &const { [
                tone(Sawtooth, 220.0, 110.0, 0.4, 0.0, 0.4),
                tone(Sawtooth, 165.0, 82.0, 0.4, 0.4, 0.6),
            ] },
            SoundEffect::NewBest => &const { [
                tone(Square, 523.0, 523.0, 0.25, 0.0, 0.1),
                tone(Square, 659.0, 659.0, 0.25, 0.1, 0.1),
                tone(Square, 784.0, 784.0, 0.25, 0.2, 0.1),
                tone(Square, 1047.0, 1047.0, 0.3, 0.3, 0.4),
            ] },
        }
    }
}

/// Background music per game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Menu,
    Gameplay,
    GameOver,
}

impl MusicTrack {
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Menu => MusicTrack::Menu,
            GamePhase::Playing => MusicTrack::Gameplay,
            GamePhase::GameOver => MusicTrack::GameOver,
        }
    }

    /// Note frequencies of one pass of the loop
    pub fn melody(&self) -> &'static [f32] {
        match self {
            MusicTrack::Menu => &[262.0, 330.0, 392.0, 523.0, 392.0, 330.0],
            MusicTrack::Gameplay => &[220.0, 262.0, 330.0, 440.0, 330.0, 262.0, 294.0, 349.0],
            MusicTrack::GameOver => &[392.0, 330.0, 262.0, 196.0],
        }
    }

    /// Seconds per note
    pub fn note_length(&self) -> f64 {
        match self {
            MusicTrack::Menu => 0.4,
            MusicTrack::Gameplay => 0.2,
            MusicTrack::GameOver => 0.6,
        }
    }
}

/// Seconds of music scheduled ahead of the clock
pub const MUSIC_LOOKAHEAD: f64 = 2.0;

/// Music loop bookkeeping in audio-clock seconds
///
/// `V` is whatever handle the backend needs to cut a note short. Switching
/// track hands back every still-sounding voice so the old loop stops at once
/// and the new one starts from the current time.
#[derive(Debug)]
pub struct MusicSchedule<V> {
    current: Option<(MusicTrack, f32)>,
    /// Time up to which notes are scheduled
    until: f64,
    /// Scheduled voices and the time each one ends
    voices: Vec<(V, f64)>,
}

impl<V> Default for MusicSchedule<V> {
    fn default() -> Self {
        Self { current: None, until: 0.0, voices: Vec::new() }
    }
}

impl<V> MusicSchedule<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<(MusicTrack, f32)> {
        self.current
    }

    pub fn scheduled_until(&self) -> f64 {
        self.until
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Select a track; returns the voices to stop now.
    /// Re-selecting the playing track only updates its volume.
    pub fn select(&mut self, track: MusicTrack, volume: f32, now: f64) -> Vec<V> {
        let same = self.current.map(|(t, _)| t) == Some(track);
        self.current = Some((track, volume));
        if same {
            return Vec::new();
        }
        self.cut(now)
    }

    /// Stop the music; returns the voices to stop now
    pub fn silence(&mut self, now: f64) -> Vec<V> {
        self.current = None;
        self.cut(now)
    }

    fn cut(&mut self, now: f64) -> Vec<V> {
        self.until = now;
        self.voices.drain(..).map(|(v, _)| v).collect()
    }

    /// Start time of the next melody pass, if one is due
    pub fn due(&mut self, now: f64) -> Option<(MusicTrack, f32, f64)> {
        self.voices.retain(|(_, end)| *end > now);
        let (track, volume) = self.current?;
        if self.until > now + MUSIC_LOOKAHEAD {
            return None;
        }
        Some((track, volume, self.until.max(now)))
    }

    /// Record a voice scheduled to end at `end`
    pub fn add_voice(&mut self, voice: V, end: f64) {
        self.voices.push((voice, end));
    }

    /// Mark notes scheduled up to `until`
    pub fn scheduled_to(&mut self, until: f64) {
        self.until = self.until.max(until);
    }
}

/// Something to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    Effect(SoundEffect),
    Music(MusicTrack),
}

/// Audio output backend
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
    fn set_music(&mut self, track: MusicTrack, volume: f32) -> Result<(), AudioError>;
}

/// Requests raised since the last flush
#[derive(Debug, Clone, Default)]
pub struct AudioQueue {
    requests: Vec<PlayRequest>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: PlayRequest) {
        self.requests.push(request);
    }

    /// Queue the effects and music changes for a frame's events
    pub fn push_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::PhaseChanged { to, .. } = event {
                self.push(PlayRequest::Music(MusicTrack::for_phase(*to)));
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.push(PlayRequest::Effect(effect));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn drain(&mut self) -> Vec<PlayRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Hand every queued request to the sink; failures are logged and dropped
    pub fn flush(&mut self, sink: &mut dyn AudioSink, settings: &Settings) {
        for request in self.drain() {
            let result = match request {
                PlayRequest::Effect(effect) => sink.play_effect(effect, settings.sfx_gain()),
                PlayRequest::Music(track) => sink.set_music(track, settings.music_gain()),
            };
            match result {
                Ok(()) | Err(AudioError::Silenced) => {}
                Err(err) => log::warn!("Dropped {:?}: {}", request, err),
            }
        }
    }
}

/// Native sink: logs what would play
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        log::debug!("sfx {:?} at {:.2}", effect, volume);
        Ok(())
    }

    fn set_music(&mut self, track: MusicTrack, volume: f32) -> Result<(), AudioError> {
        log::debug!("music {:?} at {:.2}", track, volume);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, MusicSchedule, MusicTrack, SoundEffect, Tone, Wave};
    use crate::error::AudioError;

    fn js_err(err: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Backend(format!("{:?}", err))
    }

    /// Web Audio oscillator output
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
        music: MusicSchedule<OscillatorNode>,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, music: MusicSchedule::new() }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn context(&self) -> Result<&AudioContext, AudioError> {
            let ctx = self.ctx.as_ref().ok_or(AudioError::NoContext)?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Ok(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            wave: Wave,
        ) -> Result<(OscillatorNode, GainNode), AudioError> {
            let osc = ctx.create_oscillator().map_err(js_err)?;
            let gain = ctx.create_gain().map_err(js_err)?;

            osc.set_type(match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(js_err)?;
            gain.connect_with_audio_node(&ctx.destination()).map_err(js_err)?;

            Ok((osc, gain))
        }

        /// Schedule one tone; returns its oscillator and stop time
        fn play_tone(
            ctx: &AudioContext,
            tone: &Tone,
            at: f64,
            vol: f32,
        ) -> Result<(OscillatorNode, f64), AudioError> {
            let (osc, gain) = Self::create_osc(ctx, tone.freq, tone.wave)?;
            let t = at + tone.delay;
            let end = t + tone.duration;

            gain.gain().set_value_at_time(0.0, at).map_err(js_err)?;
            gain.gain().set_value_at_time(vol * tone.gain, t).map_err(js_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, end)
                .map_err(js_err)?;
            if tone.end_freq != tone.freq {
                osc.frequency().set_value_at_time(tone.freq, t).map_err(js_err)?;
                osc.frequency()
                    .exponential_ramp_to_value_at_time(tone.end_freq, end)
                    .map_err(js_err)?;
            }

            osc.start_with_when(t).map_err(js_err)?;
            osc.stop_with_when(end + 0.02).map_err(js_err)?;
            Ok((osc, end + 0.02))
        }

        fn stop_voices(voices: Vec<OscillatorNode>, now: f64) {
            for osc in voices {
                // Throws only if the node already stopped
                let _ = osc.stop_with_when(now);
            }
        }

        /// Keep the current music track scheduled ahead of the clock
        pub fn pump(&mut self) {
            let Some(ctx) = self.ctx.as_ref() else { return };
            let Some((track, vol, mut at)) = self.music.due(ctx.current_time()) else {
                return;
            };
            for &freq in track.melody() {
                let note = Tone {
                    wave: Wave::Triangle,
                    freq,
                    end_freq: freq,
                    gain: 0.12,
                    delay: 0.0,
                    duration: track.note_length() * 0.9,
                };
                match Self::play_tone(ctx, &note, at, vol) {
                    Ok((osc, end)) => self.music.add_voice(osc, end),
                    Err(err) => {
                        log::warn!("Music note dropped: {}", err);
                        break;
                    }
                }
                at += track.note_length();
            }
            self.music.scheduled_to(at);
        }
    }

    impl AudioSink for WebAudioSink {
        fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            if volume <= 0.0 {
                return Err(AudioError::Silenced);
            }
            let ctx = self.context()?;
            let t = ctx.current_time();
            for tone in effect.tones() {
                Self::play_tone(ctx, tone, t, volume)?;
            }
            Ok(())
        }

        fn set_music(&mut self, track: MusicTrack, volume: f32) -> Result<(), AudioError> {
            let now = self.context()?.current_time();
            if volume <= 0.0 {
                Self::stop_voices(self.music.silence(now), now);
                return Err(AudioError::Silenced);
            }
            // A new track cuts the old loop off instead of queueing behind it
            Self::stop_voices(self.music.select(track, volume, now), now);
            self.pump();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ActorRole, GamePhase};

    #[derive(Default)]
    struct RecordingSink {
        effects: Vec<(SoundEffect, f32)>,
        music: Vec<MusicTrack>,
        fail: bool,
    }

    impl AudioSink for RecordingSink {
        fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Backend("boom".into()));
            }
            self.effects.push((effect, volume));
            Ok(())
        }

        fn set_music(&mut self, track: MusicTrack, _volume: f32) -> Result<(), AudioError> {
            self.music.push(track);
            Ok(())
        }
    }

    #[test]
    fn test_events_map_to_requests() {
        let mut queue = AudioQueue::new();
        queue.push_events(&[
            GameEvent::PhaseChanged { from: GamePhase::Menu, to: GamePhase::Playing },
            GameEvent::Jumped { role: ActorRole::Player1 },
            GameEvent::DropSpawned { lane: crate::sim::LaneId::Hearts },
            GameEvent::GameOver { final_score: 3, winner: None },
        ]);
        assert_eq!(
            queue.drain(),
            vec![
                PlayRequest::Music(MusicTrack::Gameplay),
                PlayRequest::Effect(SoundEffect::MenuClick),
                PlayRequest::Effect(SoundEffect::Jump),
                PlayRequest::Effect(SoundEffect::GameOver),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_flush_uses_settings_gain() {
        let mut queue = AudioQueue::new();
        queue.push(PlayRequest::Effect(SoundEffect::Star));
        queue.push(PlayRequest::Music(MusicTrack::Menu));
        let mut sink = RecordingSink::default();
        let settings = Settings { master_volume: 0.5, sfx_volume: 0.5, ..Settings::default() };
        queue.flush(&mut sink, &settings);
        assert_eq!(sink.effects, vec![(SoundEffect::Star, 0.25)]);
        assert_eq!(sink.music, vec![MusicTrack::Menu]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let mut queue = AudioQueue::new();
        queue.push(PlayRequest::Effect(SoundEffect::Hit));
        let mut sink = RecordingSink { fail: true, ..RecordingSink::default() };
        queue.flush(&mut sink, &Settings::default());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_every_effect_has_audible_tones() {
        let effects = [
            SoundEffect::Jump,
            SoundEffect::Star,
            SoundEffect::Heart,
            SoundEffect::PowerUp,
            SoundEffect::Hit,
            SoundEffect::Laser,
            SoundEffect::MonsterHit,
            SoundEffect::Explosion,
            SoundEffect::Warning,
            SoundEffect::CartGrab,
            SoundEffect::Tagged,
            SoundEffect::TimeUp,
            SoundEffect::LevelUp,
            SoundEffect::MenuClick,
            SoundEffect::GameOver,
            SoundEffect::NewBest,
        ];
        for effect in effects {
            let tones = effect.tones();
            assert!(!tones.is_empty(), "{:?}", effect);
            // exponential ramps need positive endpoints
            assert!(tones.iter().all(|t| t.freq > 0.0 && t.end_freq > 0.0 && t.duration > 0.0));
        }
    }

    /// Schedule one pass of the due track the way the web sink does
    fn schedule_pass(music: &mut MusicSchedule<u32>, now: f64, next_voice: &mut u32) {
        let Some((track, _, mut at)) = music.due(now) else { return };
        for _ in track.melody() {
            music.add_voice(*next_voice, at + track.note_length());
            *next_voice += 1;
            at += track.note_length();
        }
        music.scheduled_to(at);
    }

    #[test]
    fn test_track_change_stops_old_loop_and_starts_now() {
        let mut music = MusicSchedule::new();
        let mut next = 0;
        assert!(music.select(MusicTrack::Menu, 0.5, 0.0).is_empty());
        schedule_pass(&mut music, 0.0, &mut next);
        // Six menu notes of 0.4s
        assert!((music.scheduled_until() - 2.4).abs() < 1e-9);
        assert_eq!(music.voice_count(), 6);

        // Halfway through the pass the game starts
        let stopped = music.select(MusicTrack::Gameplay, 0.5, 1.0);
        assert_eq!(stopped.len(), 6);
        assert_eq!(music.voice_count(), 0);
        assert_eq!(music.due(1.0), Some((MusicTrack::Gameplay, 0.5, 1.0)));
    }

    #[test]
    fn test_same_track_keeps_playing() {
        let mut music = MusicSchedule::new();
        let mut next = 0;
        music.select(MusicTrack::Gameplay, 0.5, 0.0);
        schedule_pass(&mut music, 0.0, &mut next);
        let until = music.scheduled_until();

        assert!(music.select(MusicTrack::Gameplay, 0.8, 0.5).is_empty());
        assert_eq!(music.current(), Some((MusicTrack::Gameplay, 0.8)));
        assert_eq!(music.scheduled_until(), until);
        assert!(music.voice_count() > 0);
    }

    #[test]
    fn test_music_pass_due_within_lookahead() {
        let mut music = MusicSchedule::new();
        let mut next = 0;
        music.select(MusicTrack::GameOver, 0.5, 0.0);
        // Four notes of 0.6s fill the lookahead
        schedule_pass(&mut music, 0.0, &mut next);
        assert_eq!(music.due(0.0), None);
        schedule_pass(&mut music, 0.5, &mut next);
        assert!((music.scheduled_until() - 4.8).abs() < 1e-9);
        assert_eq!(music.voice_count(), 8);

        // Ended voices are pruned as the clock moves on
        assert!(music.due(3.3).is_some());
        assert_eq!(music.voice_count(), 3);
    }

    #[test]
    fn test_silence_stops_everything() {
        let mut music = MusicSchedule::new();
        let mut next = 0;
        music.select(MusicTrack::Menu, 0.5, 0.0);
        schedule_pass(&mut music, 0.0, &mut next);
        assert_eq!(music.silence(0.2).len(), 6);
        assert_eq!(music.current(), None);
        assert_eq!(music.due(0.2), None);
    }
}
