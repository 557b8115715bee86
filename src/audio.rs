//! Sound cues and playback
//!
//! The core only names cues. In the browser they are synthesized with the
//! Web Audio API and a looping background track plays underneath. Natively
//! they are dropped.

use std::cell::RefCell;
use std::rc::Rc;

/// Cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Stick picked up
    PickUp,
    /// Stick dropped into the row
    Drop,
    /// Sort rewarded with diamonds
    CollectDiamond,
    LevelUp,
    /// Shop purchase made
    Purchase,
    /// Portal opened
    Portal,
}

/// Receives cues; playback is fire and forget
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    /// Apply gains (0.0 - 1.0) from the player's settings
    fn set_volume(&mut self, _music: f32, _sfx: f32) {}

    /// Start the background track if it is not playing yet
    fn start_music(&mut self) {}
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Records cues and gains. Clones share the log.
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    cues: Rc<RefCell<Vec<SoundCue>>>,
    volume: Rc<RefCell<Option<(f32, f32)>>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues received so far, oldest first
    pub fn take(&self) -> Vec<SoundCue> {
        std::mem::take(&mut *self.cues.borrow_mut())
    }

    /// Last (music, sfx) gains applied
    pub fn volume(&self) -> Option<(f32, f32)> {
        *self.volume.borrow()
    }
}

impl AudioSink for CueLog {
    fn play(&mut self, cue: SoundCue) {
        self.cues.borrow_mut().push(cue);
    }

    fn set_volume(&mut self, music: f32, sfx: f32) {
        *self.volume.borrow_mut() = Some((music, sfx));
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundCue};
    use crate::catalog::MUSIC_ASSET_KEY;

    /// Procedural cue player plus background music
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        music: Option<HtmlAudioElement>,
        sfx_volume: f32,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let music = HtmlAudioElement::new_with_src(MUSIC_ASSET_KEY).ok();
            if let Some(music) = &music {
                music.set_loop(true);
                music.set_volume(0.5);
            }
            Self {
                ctx,
                music,
                sfx_volume: 0.5,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short blips at rising or falling pitches
        fn play_notes(&self, ctx: &AudioContext, vol: f32, notes: &[f32], spacing: f64, length: f64, osc_type: OscillatorType) {
            for (i, &freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * spacing;
                gain.gain().set_value_at_time(vol, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + length).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + length + 0.05).ok();
            }
        }

        /// Wooden knock, pitch sliding up (pick up) or down (drop)
        fn play_knock(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.08).ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(to, t + 0.08).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Portal - long swelling whoosh
        fn play_portal(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain().linear_ramp_to_value_at_time(vol * 0.4, t + 1.0).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 3.0).ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(900.0, t + 1.5).ok();
            osc.frequency().exponential_ramp_to_value_at_time(80.0, t + 3.0).ok();

            osc.start().ok();
            osc.stop_with_when(t + 3.1).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                SoundCue::PickUp => self.play_knock(ctx, vol, 300.0, 520.0),
                SoundCue::Drop => self.play_knock(ctx, vol, 420.0, 180.0),
                SoundCue::CollectDiamond => {
                    self.play_notes(ctx, vol * 0.25, &[1320.0, 1760.0, 2640.0], 0.05, 0.2, OscillatorType::Sine)
                }
                SoundCue::LevelUp => {
                    self.play_notes(ctx, vol * 0.3, &[523.0, 659.0, 784.0, 1047.0], 0.1, 0.35, OscillatorType::Triangle)
                }
                SoundCue::Purchase => self.play_notes(ctx, vol * 0.3, &[880.0, 1175.0], 0.08, 0.25, OscillatorType::Square),
                SoundCue::Portal => self.play_portal(ctx, vol),
            }
        }

        fn set_volume(&mut self, music: f32, sfx: f32) {
            self.sfx_volume = sfx.clamp(0.0, 1.0);
            if let Some(track) = &self.music {
                track.set_volume(music.clamp(0.0, 1.0) as f64);
            }
        }

        fn start_music(&mut self) {
            self.resume();
            let Some(track) = &self.music else { return };
            if track.paused() {
                // Rejected until the page has seen a user gesture
                let _ = track.play();
            }
        }
    }
}
