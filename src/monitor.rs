//! Streaming monitor: rolling buffer and carrier tracking
//!
//! The [`Monitor`] wraps a [`Decoder`] for continuous operation.
//! Each call to [`read()`](Monitor::read) appends the fresh block
//! to a bounded rolling buffer, re-decodes the buffer with a
//! widened bin neighborhood, and reconciles the detections with
//! the carriers already being tracked. A tracked carrier whose
//! envelope keeps growing is re-decoded in full on every merge, so
//! the dot/dash means settle as more keying accumulates.

#[cfg(not(test))]
use log::{debug, trace};

#[cfg(test)]
use std::{println as debug, println as trace};

use crate::builder::MonitorBuilder;
use crate::decoder::{Decoder, Message};
use crate::stft::Stft;

/// Streaming multi-carrier Morse monitor
///
/// Create one with a [`MonitorBuilder`]:
///
/// ```
/// use cwmonitor::MonitorBuilder;
///
/// let mut monitor = MonitorBuilder::new(8000).build();
/// # let block = vec![0.0f64; 800];
/// for message in monitor.read(&block) {
///     println!("{}", message);
/// }
/// ```
///
/// A `Monitor` owns its buffer and target table; two monitors on
/// distinct streams may run concurrently.
#[derive(Clone, Debug)]
pub struct Monitor {
    max_hold: usize,
    max_miss: u32,
    max_band: usize,
    decoder: Decoder,
    samples: Vec<f64>,
    targets: Vec<Message>,
}

impl Monitor {
    /// Consume one block of samples and report the active carriers
    ///
    /// Returns every tracked carrier that is still alive: carriers
    /// freshly decoded this cycle, and carriers recently missed
    /// but within their grace period (the [`miss()`](Message::miss)
    /// count tells which). Neighbor-bin decodes are used for
    /// continuity only and never returned.
    pub fn read(&mut self, signal: &[f64]) -> Vec<Message> {
        let shift = self.decoder.stft.frame_shift();
        self.samples.extend_from_slice(signal);
        if self.samples.len() > self.max_hold {
            self.samples.drain(..signal.len() / shift * shift);
        }
        let result = self.sweep(self.merge(signal.len()));
        self.targets = result.clone();
        result
    }

    /// Drop the rolling buffer and every tracked carrier
    pub fn reset(&mut self) {
        self.samples.clear();
        self.targets.clear();
    }

    /// Carriers currently being tracked
    pub fn targets(&self) -> &[Message] {
        &self.targets
    }

    /// The underlying block decoder
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Decode the rolling buffer and fold fresh detections into
    /// the tracked carriers
    ///
    /// Detections sharing a tracked carrier's bin extend its
    /// envelope with the frames contributed by the new block and
    /// re-decode the whole envelope with the narrow decoder. A
    /// neighbor-bin detection that merges this way keeps an
    /// existing target alive under slight drift; one that does not
    /// merge is discarded here, at the emission gate.
    fn merge(&self, block_len: usize) -> Vec<Message> {
        let shift = self.decoder.stft.frame_shift();
        let mut wide = self.decoder.clone();
        wide.band = self.max_band;

        let mut fresh = Vec::new();
        for mut next in wide.read(&self.samples) {
            for prev in &self.targets {
                if next.freq == prev.freq {
                    let drop = next.envelope.len().saturating_sub(block_len / shift);
                    let mut joined = prev.envelope.clone();
                    joined.extend_from_slice(&next.envelope[drop..]);
                    let mut merged = self.decoder.detect(&joined);
                    merged.freq = prev.freq;
                    merged.life = prev.life;
                    next = merged;
                    trace!("bin {}: extended to {} frames", next.freq, next.envelope.len());
                }
            }
            if !next.side {
                if next.life == 0 {
                    debug!("bin {}: new carrier", next.freq);
                }
                next.life += 1;
                fresh.push(next);
            }
        }
        fresh
    }

    /// Carry recently-missed carriers and drop the expired
    fn sweep(&self, mut fresh: Vec<Message>) -> Vec<Message> {
        let mut carried = Vec::new();
        for prev in &self.targets {
            if fresh.iter().any(|next| next.freq == prev.freq) {
                continue;
            }
            if prev.miss < self.max_miss {
                let mut idle = prev.clone();
                idle.miss += 1;
                carried.push(idle);
            } else {
                debug!("bin {}: carrier expired", prev.freq);
            }
        }
        fresh.extend(carried);
        fresh
    }
}

impl From<&MonitorBuilder> for Monitor {
    /// Create the Monitor from its Builder
    fn from(cfg: &MonitorBuilder) -> Self {
        let decoder = Decoder {
            iter: cfg.cluster_iterations,
            bias: cfg.bias,
            band: 0,
            gain: cfg.gain,
            mute: cfg.mute_ratio,
            loud: cfg.loud_fraction,
            stft: Stft::new(cfg.frame_shift, cfg.frame_len),
        };
        Self {
            max_hold: cfg.max_hold,
            max_miss: cfg.max_miss,
            max_band: cfg.max_band,
            decoder,
            samples: Vec::new(),
            targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testsig;

    const RATE: u32 = 8000;
    const FRAME_LEN: usize = 2048;
    const UNIT: usize = 2400;

    // one half-second block; a whole multiple of the 80-sample
    // frame shift, so merged envelopes stay frame-aligned
    const BLOCK: usize = 4000;

    fn read_in_blocks(monitor: &mut Monitor, signal: &[f64]) -> Vec<Vec<Message>> {
        let mut padded = signal.to_vec();
        padded.resize((signal.len() + BLOCK - 1) / BLOCK * BLOCK, 0.0);
        padded
            .chunks(BLOCK)
            .map(|block| monitor.read(block))
            .collect()
    }

    fn keyed_message(code: &str, bin: usize) -> Vec<f64> {
        let mut segments = vec![(false, RATE as usize)];
        segments.extend(testsig::keying(code, UNIT));
        segments.push((false, 2 * RATE as usize));
        testsig::keyed_carrier(&segments, bin, FRAME_LEN)
    }

    #[test]
    fn test_silence_reports_nothing() {
        let mut monitor = MonitorBuilder::new(RATE).build();
        for result in read_in_blocks(&mut monitor, &vec![0.0; 4 * RATE as usize]) {
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_message_spans_blocks() {
        let mut monitor = MonitorBuilder::new(RATE).build();
        let cycles = read_in_blocks(&mut monitor, &keyed_message("-.-. --.-", 256));

        let last = cycles
            .iter()
            .flatten()
            .filter(|m| m.freq() == 256 && !m.code().is_empty())
            .last()
            .expect("carrier never decoded");
        assert_eq!(last.code().trim(), "-.-. --.-");
        assert_eq!(last.text().trim_matches('?'), "CQ");
        assert!(last.life() >= 2);
    }

    #[test]
    fn test_side_detections_never_emitted() {
        let mut monitor = MonitorBuilder::new(RATE).build();
        for result in read_in_blocks(&mut monitor, &keyed_message("-.-. --.-", 256)) {
            for message in result {
                assert!(!message.side);
            }
        }
    }

    #[test]
    fn test_missed_target_expires() {
        let mut monitor = MonitorBuilder::new(RATE).build();
        let mut cycles = read_in_blocks(&mut monitor, &keyed_message("-.-. --.-", 256));
        // four seconds of silence flushes the buffer; the grace
        // period runs out over the following cycles
        cycles.extend(read_in_blocks(&mut monitor, &vec![0.0; 8 * RATE as usize]));

        let misses: Vec<u32> = cycles
            .iter()
            .flatten()
            .filter(|m| m.freq() == 256)
            .map(|m| m.miss())
            .collect();
        assert!(misses.len() >= 5);
        // the target survives exactly max_miss silent cycles
        assert_eq!(&misses[misses.len() - 5..], &[1, 2, 3, 4, 5]);
        assert!(cycles.last().map(|last| last.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_drifting_carrier_keeps_its_target() {
        let mut monitor = MonitorBuilder::new(RATE).build();

        // the station drifts up one bin between the two characters
        let mut first = vec![(false, RATE as usize)];
        first.extend(testsig::keying("-.-.", UNIT));
        first.push((false, 3 * UNIT));
        let mut second = testsig::keying("--.-", UNIT);
        second.push((false, 2 * RATE as usize));
        let mut signal = testsig::keyed_carrier(&first, 256, FRAME_LEN);
        signal.extend(testsig::keyed_carrier(&second, 257, FRAME_LEN));

        let cycles = read_in_blocks(&mut monitor, &signal);
        for result in &cycles {
            for message in result {
                assert!(!message.side);
            }
        }
        let last = cycles
            .iter()
            .flatten()
            .filter(|m| m.freq() == 256 && !m.code().is_empty())
            .last()
            .expect("carrier lost across the drift");
        assert_eq!(last.code().trim(), "-.-. --.-");
    }

    #[test]
    fn test_reset() {
        let mut monitor = MonitorBuilder::new(RATE).build();
        read_in_blocks(&mut monitor, &keyed_message(".-", 256));
        assert!(!monitor.targets().is_empty());

        monitor.reset();
        assert!(monitor.targets().is_empty());
        assert!(monitor.read(&vec![0.0; BLOCK]).is_empty());
    }
}
