//! Monitor configuration

use crate::monitor::Monitor;

/// Builds a [`Monitor`]
///
/// The builder comes with a working set of defaults; the only
/// mandatory parameter is the input sampling rate.
///
/// ```
/// use cwmonitor::MonitorBuilder;
///
/// let monitor = MonitorBuilder::new(8000)
///     .with_max_miss(3)        // drop a quiet carrier sooner
///     .with_loud_fraction(0.02) // demand louder peaks
///     .build();
/// ```
///
/// The setters are part of this crate's API; the default values
/// are not, and may be revised in any minor release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorBuilder {
    pub(crate) input_rate: u32,
    pub(crate) max_hold: usize,
    pub(crate) max_miss: u32,
    pub(crate) max_band: usize,
    pub(crate) cluster_iterations: usize,
    pub(crate) bias: usize,
    pub(crate) gain: f64,
    pub(crate) mute_ratio: f64,
    pub(crate) loud_fraction: f64,
    pub(crate) frame_shift: usize,
    pub(crate) frame_len: usize,
}

impl MonitorBuilder {
    /// New monitor configuration for the given sampling rate, in Hz
    ///
    /// The frame shift defaults to a 10 ms hop at the given rate,
    /// and the rolling buffer holds the most recent two seconds.
    pub fn new(input_rate: u32) -> Self {
        Self {
            input_rate,
            max_hold: 2 * input_rate as usize,
            max_miss: 5,
            max_band: 3,
            cluster_iterations: 5,
            bias: 5,
            gain: 2.0,
            mute_ratio: 5.0,
            loud_fraction: 0.01,
            frame_shift: (input_rate / 100) as usize,
            frame_len: 2048,
        }
    }

    /// Build a monitor, ready to read samples
    pub fn build(&self) -> Monitor {
        Monitor::from(self)
    }

    /// Input sampling rate, in Hz
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Rolling buffer capacity, in samples
    ///
    /// Each read decodes at most this much trailing audio. Longer
    /// buffers stabilise the dot/dash estimate at the cost of
    /// more work per block.
    pub fn with_max_hold(&mut self, samples: usize) -> &mut Self {
        self.max_hold = samples;
        self
    }

    /// Cycles a quiet carrier survives before it is dropped
    pub fn with_max_miss(&mut self, cycles: u32) -> &mut Self {
        self.max_miss = cycles;
        self
    }

    /// Neighborhood half-width, in bins, searched for continuity
    ///
    /// The monitor re-decodes this many bins to either side of
    /// every carrier peak so a slightly drifting station keeps
    /// extending its existing target.
    pub fn with_max_band(&mut self, bins: usize) -> &mut Self {
        self.max_band = bins;
        self
    }

    /// Refinement rounds for the clustering passes
    pub fn with_cluster_iterations(&mut self, rounds: usize) -> &mut Self {
        self.cluster_iterations = rounds;
        self
    }

    /// Lowest STFT bin worth searching
    ///
    /// Bins below this are ignored entirely; DC offset and mains
    /// hum live down there.
    pub fn with_bias(&mut self, bins: usize) -> &mut Self {
        self.bias = bins;
        self
    }

    /// Envelope gain ceiling used by the pre-clustering rescale
    ///
    /// Clamped to at least 1.0; a ceiling below unity would
    /// attenuate the envelope peak itself.
    pub fn with_gain(&mut self, gain: f64) -> &mut Self {
        self.gain = f64::max(gain, 1.0);
        self
    }

    /// Tone-to-silence ratio below which a bin is treated as noise
    pub fn with_mute_ratio(&mut self, ratio: f64) -> &mut Self {
        self.mute_ratio = f64::max(ratio, 1.0);
        self
    }

    /// Fraction of total band power a carrier peak must reach
    ///
    /// Clamped to `[0.0, 1.0]`.
    pub fn with_loud_fraction(&mut self, fraction: f64) -> &mut Self {
        self.loud_fraction = f64::clamp(fraction, 0.0, 1.0);
        self
    }

    /// Spectral frame shift and length, in samples
    pub fn with_stft(&mut self, frame_shift: usize, frame_len: usize) -> &mut Self {
        self.frame_shift = frame_shift;
        self.frame_len = frame_len;
        self
    }
}

impl Default for MonitorBuilder {
    /// Monitor configuration for 8 kHz input
    fn default() -> Self {
        Self::new(8000)
    }
}
