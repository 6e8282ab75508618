/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to compile a silent stub instead.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_type: Arc<Vec<u8>>,
        sfx_proceed: Arc<Vec<u8>>,
        sfx_bump: Arc<Vec<u8>>,
        sfx_trap: Arc<Vec<u8>>,
        sfx_return: Arc<Vec<u8>>,
        sfx_goal: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, running silent: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_type: Arc::new(make_wav(&gen_type())),
                sfx_proceed: Arc::new(make_wav(&gen_proceed())),
                sfx_bump: Arc::new(make_wav(&gen_bump())),
                sfx_trap: Arc::new(make_wav(&gen_trap())),
                sfx_return: Arc::new(make_wav(&gen_return())),
                sfx_goal: Arc::new(make_wav(&gen_goal())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_type(&self) { self.play(&self.sfx_type); }
        pub fn play_proceed(&self) { self.play(&self.sfx_proceed); }
        pub fn play_bump(&self) { self.play(&self.sfx_bump); }
        pub fn play_trap(&self) { self.play(&self.sfx_trap); }
        pub fn play_return(&self) { self.play(&self.sfx_return); }
        pub fn play_goal(&self) { self.play(&self.sfx_goal); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn samples_for(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Sequence of notes, each a sine with optional 2nd harmonic and a
    /// linear decay to `1 - decay` of full volume.
    fn gen_notes(notes: &[(f32, f32)], overtone: f32, decay: f32, volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, dur) in notes {
            let n = samples_for(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * decay;
                let wave = (t * freq * TAU).sin() * (1.0 - overtone)
                    + (t * freq * 2.0 * TAU).sin() * overtone;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Typewriter tick: very short high click.
    fn gen_type() -> Vec<f32> {
        gen_notes(&[(1800.0, 0.012)], 0.0, 1.0, 0.12)
    }

    /// Gate opens: low-high two-note chime.
    fn gen_proceed() -> Vec<f32> {
        gen_notes(&[(392.0, 0.08), (784.0, 0.18)], 0.3, 1.0, 0.3)
    }

    /// Wall bump: short low thud.
    fn gen_bump() -> Vec<f32> {
        gen_notes(&[(110.0, 0.05)], 0.2, 1.0, 0.25)
    }

    /// Trap: dissonant tritone sting with a noise burst on top.
    fn gen_trap() -> Vec<f32> {
        let mut out = gen_notes(&[(466.0, 0.09), (330.0, 0.22)], 0.4, 0.6, 0.3);
        let burst = samples_for(0.06);
        let mut rng: u32 = 0x5eed;
        for (i, s) in out.iter_mut().take(burst).enumerate() {
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
            *s += noise * 0.2 * (1.0 - i as f32 / burst as f32);
        }
        out
    }

    /// Swept back to start: falling whistle.
    fn gen_return() -> Vec<f32> {
        let n = samples_for(0.2);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 900.0 - t * 650.0;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t).powf(0.7) * 0.22
            })
            .collect()
    }

    /// Mansion reached: rising arpeggio with a held top note.
    fn gen_goal() -> Vec<f32> {
        let mut out = gen_notes(
            &[(440.0, 0.1), (523.0, 0.1), (659.0, 0.1), (880.0, 0.1)],
            0.3, 0.3, 0.3,
        );
        out.extend(gen_notes(&[(880.0, 0.35)], 0.2, 1.0, 0.3));
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let byte_rate = SAMPLE_RATE * CHANNELS as u32 * BITS as u32 / 8;
        let block_align = CHANNELS * BITS / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_bump());
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
            assert_eq!(wav.len(), 44 + data_size);
            assert_eq!(data_size, samples_for(0.05) * 2);
        }

        #[test]
        fn generated_samples_stay_in_range() {
            for s in [gen_type(), gen_proceed(), gen_trap(), gen_return(), gen_goal()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_type(&self) {}
    pub fn play_proceed(&self) {}
    pub fn play_bump(&self) {}
    pub fn play_trap(&self) {}
    pub fn play_return(&self) {}
    pub fn play_goal(&self) {}
}
