//! Block decoder: spectrogram, carrier search, symbol extraction
//!
//! The [`Decoder`] turns one block of audio into zero or more
//! [`Message`]s. It computes a magnitude spectrogram, sums it into
//! a per-bin power vector, searches that vector for carrier peaks,
//! and runs two-level clustering on each candidate bin's envelope
//! to recover the keying. See the [`Monitor`](crate::Monitor) for
//! the streaming wrapper that stitches blocks together.

use std::fmt;

#[cfg(not(test))]
use log::trace;

#[cfg(test)]
use std::println as trace;

use crate::cluster::{Step, TwoMeans};
use crate::codec::code_to_text;
use crate::stft::Stft;

/// Shortest credible dot duration, in frames
///
/// When the lower mean of the duration mixture does not exceed
/// this, the timing is too fine to trust and the bin is skipped.
const MIN_RELIABLE_DOT: f64 = 2.0;

/// Code characters for the two key-down classes: dot, then dash
const TONES: [&str; 2] = [".", "-"];

/// One decoded carrier
///
/// Carries the decoded code string, the carrier's absolute STFT
/// bin, and the per-frame magnitude envelope the decode was made
/// from. The envelope is retained so the [`Monitor`](crate::Monitor)
/// can re-decode an extended copy when the next block arrives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub(crate) envelope: Vec<f64>,
    pub(crate) code: String,
    pub(crate) freq: usize,
    pub(crate) life: u32,
    pub(crate) miss: u32,
    pub(crate) side: bool,
}

impl Message {
    /// Decoded code string: dots, dashes, and gap separators
    ///
    /// May be empty, and may end mid-character; the monitor keeps
    /// extending it while the station keeps keying.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Decoded Latin text
    ///
    /// Runs [`code_to_text()`](crate::code_to_text) over the code
    /// string. Unreadable tokens, including the empty token a word
    /// gap leaves behind, appear as `?`.
    pub fn text(&self) -> String {
        code_to_text(&self.code)
    }

    /// Absolute STFT bin of the carrier
    pub fn freq(&self) -> usize {
        self.freq
    }

    /// Consecutive monitor cycles this carrier has decoded
    pub fn life(&self) -> u32 {
        self.life
    }

    /// Consecutive monitor cycles this carrier has been absent
    pub fn miss(&self) -> u32 {
        self.miss
    }

    /// Per-frame magnitudes on the carrier bin
    pub fn envelope(&self) -> &[f64] {
        &self.envelope
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin {}: \"{}\"", self.freq, self.text())
    }
}

/// Multi-carrier Morse decoder for one block of audio
///
/// All fields are plain tunables;
/// [`with_sample_rate()`](Decoder::with_sample_rate) fills in the
/// stock settings. [`read()`](Decoder::read) is stateless with
/// respect to the signal: every call decodes its input in
/// isolation.
#[derive(Clone, Debug)]
pub struct Decoder {
    /// Refinement rounds for every clustering run
    pub iter: usize,

    /// Lowest STFT bin to search; DC and hum live below this
    pub bias: usize,

    /// Neighborhood half-width, in bins, examined around each
    /// carrier peak
    pub band: usize,

    /// Envelope gain ceiling for the pre-clustering rescale
    pub gain: f64,

    /// A bin is noise unless its tone mean exceeds `mute` times
    /// its silence mean
    pub mute: f64,

    /// Fraction of total band power a peak must reach
    pub loud: f64,

    /// Spectral front-end
    pub stft: Stft,
}

impl Decoder {
    /// Decoder with the stock settings for a sampling rate
    pub fn with_sample_rate(rate: u32) -> Self {
        Self {
            iter: 5,
            bias: 5,
            band: 0,
            gain: 2.0,
            mute: 5.0,
            loud: 0.01,
            stft: Stft::new((rate / 100) as usize, 2048),
        }
    }

    /// Decode every carrier audible in a block of samples
    ///
    /// Returns one [`Message`] per bin that yielded a non-empty
    /// decode. An input shorter than one STFT frame yields no
    /// messages. Neighbor-bin decodes are marked internally and
    /// filtered by the monitor's emission gate.
    pub fn read(&self, signal: &[f64]) -> Vec<Message> {
        let spec = self.stft.spectrogram(signal);
        let half = self.stft.frame_len() / 2;

        let mut dist = vec![0.0f64; half];
        for spectrum in &spec {
            let band = spectrum.get(self.bias..).unwrap_or(&[]);
            for (slot, &mag) in dist.iter_mut().zip(band) {
                *slot += mag * mag;
            }
        }

        let mut result = Vec::new();
        let mut buff = vec![0.0f64; spec.len()];
        for idx in self.search(&dist) {
            trace!("candidate carrier at bin {}", idx);
            for offset in -(self.band as isize)..=(self.band as isize) {
                let shifted = idx as isize + offset;
                let bin = shifted.clamp(0, half as isize - 1) as usize;
                for (frame, spectrum) in buff.iter_mut().zip(&spec) {
                    *frame = spectrum[bin];
                }
                let mut message = self.detect(&buff);
                if !message.code.is_empty() {
                    message.side = offset != 0;
                    message.freq = shifted.max(0) as usize;
                    result.push(message);
                }
            }
        }
        result
    }

    /// Find candidate carrier bins in the accumulated power vector
    ///
    /// A peak is committed once the walk falls back below the
    /// loudness threshold; a peak still pending when the vector
    /// ends is rejected.
    fn search(&self, dist: &[f64]) -> Vec<usize> {
        let lev = self.loud * dist.iter().sum::<f64>();
        let mut found = Vec::new();
        let mut top = 0.0f64;
        let mut pos = 0usize;
        for (index, &val) in dist.iter().enumerate() {
            if val > top {
                top = val;
                pos = index;
            } else if val < lev && top > lev {
                found.push(self.bias + pos);
                top = 0.0;
                pos = 0;
            }
        }
        found
    }

    /// Decode one bin's envelope into a message
    ///
    /// The envelope is retained in the result even when the decode
    /// is empty. The code stays empty when the bin fails the mute
    /// test or the dot/dash separation is too fine to trust.
    pub(crate) fn detect(&self, envelope: &[f64]) -> Message {
        let mut message = Message {
            envelope: envelope.to_vec(),
            ..Message::default()
        };

        let steps = self.binarize(envelope);
        let runs = match steps.split_last() {
            // the final step has no following edge to measure against
            Some((_, runs)) if !runs.is_empty() => runs,
            _ => return message,
        };

        let tones: Vec<f64> = runs.iter().filter(|s| s.down).map(|s| s.span).collect();
        if tones.is_empty() {
            return message;
        }
        let mut widths = TwoMeans::new(tones);
        widths.optimize(self.iter);
        if widths.means()[0] <= MIN_RELIABLE_DOT {
            trace!("dot mean {:0.1} too short, skipping bin", widths.means()[0]);
            return message;
        }

        for step in runs {
            if step.down {
                message.code.push_str(TONES[widths.class(step.span)]);
            } else {
                message.code.push_str(widths.gap(step.span).separator());
            }
        }
        message
    }

    /// Split an envelope into keying transitions
    ///
    /// The rescale lifts every sample within `gain` of the peak up
    /// to the peak, flattening key-down plateaus while the rising
    /// and falling edges stay put. Returns no steps when the tone
    /// mean fails to clear the silence mean by the mute ratio.
    fn binarize(&self, envelope: &[f64]) -> Vec<Step> {
        let peak = envelope.iter().cloned().fold(0.0, f64::max);
        let keyed: Vec<f64> = envelope
            .iter()
            .map(|&mag| mag * self.gain.min(peak / mag))
            .collect();

        let mut levels = TwoMeans::new(keyed);
        levels.optimize(self.iter);
        let [floor, tone] = levels.means();
        if tone > self.mute * floor {
            levels.steps()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testsig;

    const RATE: u32 = 8000;
    const FRAME_LEN: usize = 2048;

    // 300 ms: 30 frames per unit at the 10 ms hop, so even the
    // 256 ms analysis window cannot fuse adjacent elements
    const UNIT: usize = 2400;

    fn keyed_message(code: &str, bin: usize) -> Vec<f64> {
        let mut segments = vec![(false, RATE as usize)];
        segments.extend(testsig::keying(code, UNIT));
        segments.push((false, 2 * RATE as usize));
        testsig::keyed_carrier(&segments, bin, FRAME_LEN)
    }

    #[test]
    fn test_empty_input() {
        let decoder = Decoder::with_sample_rate(RATE);
        assert!(decoder.read(&[]).is_empty());
        assert!(decoder.read(&vec![0.0; 512]).is_empty());
    }

    #[test]
    fn test_decodes_single_carrier() {
        let decoder = Decoder::with_sample_rate(RATE);
        let messages = decoder.read(&keyed_message("... --- ...", 256));

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].freq(), 256);
        assert!(!messages[0].side);
        assert_eq!(messages[0].code().trim(), "... --- ...");
        assert_eq!(messages[0].text().trim_matches('?'), "SOS");
    }

    #[test]
    fn test_separates_two_carriers() {
        let decoder = Decoder::with_sample_rate(RATE);
        let low = keyed_message(".-", 256);
        let high = keyed_message("-.-", 600);
        let mut messages = decoder.read(&testsig::mix(&low, &high));
        messages.sort_by_key(|m| m.freq());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].freq(), 256);
        assert_eq!(messages[0].code().trim(), ".-");
        assert_eq!(messages[1].freq(), 600);
        assert_eq!(messages[1].code().trim(), "-.-");
    }

    #[test]
    fn test_rejects_noise() {
        let decoder = Decoder::with_sample_rate(RATE);
        let messages = decoder.read(&testsig::noise(3 * RATE as usize, 0.1));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_silence_yields_nothing() {
        let decoder = Decoder::with_sample_rate(RATE);
        assert!(decoder.read(&vec![0.0; 3 * RATE as usize]).is_empty());
    }

    #[test]
    fn test_neighbor_bins_are_marked_side() {
        let mut decoder = Decoder::with_sample_rate(RATE);
        decoder.band = 1;
        let messages = decoder.read(&keyed_message("... --- ...", 256));

        assert_eq!(messages.len(), 3);
        for message in &messages {
            assert_eq!(message.side, message.freq() != 256);
            assert_eq!(message.code().trim(), "... --- ...");
        }
    }

    #[test]
    fn test_detect_keeps_envelope() {
        let decoder = Decoder::with_sample_rate(RATE);
        let envelope = vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let message = decoder.detect(&envelope);
        assert_eq!(message.envelope(), &envelope[..]);
        // a lone two-frame tone is not credible timing
        assert!(message.code().is_empty());
    }
}
