//! Short-time Fourier front-end
//!
//! Splits the input into overlapping Hann-windowed frames and
//! yields one magnitude spectrum per frame, truncated at Nyquist.
//! The decoder reads these spectra two ways: summed across time as
//! a per-bin power vector for the carrier search, and sliced along
//! time as the keying envelope of a single bin.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Hann-windowed short-time Fourier transform
///
/// The frame length and shift are fixed at creation time. Cloning
/// is cheap; the planned FFT is shared.
#[derive(Clone)]
pub struct Stft {
    frame_shift: usize,
    frame_len: usize,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl Stft {
    /// Plan an STFT with the given frame shift and length
    ///
    /// A zero `frame_shift` is raised to one sample.
    pub fn new(frame_shift: usize, frame_len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_len);
        Self {
            frame_shift: frame_shift.max(1),
            frame_len,
            window: hann_window(frame_len),
            fft,
        }
    }

    /// Frame length, in samples
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Frame shift, in samples
    pub fn frame_shift(&self) -> usize {
        self.frame_shift
    }

    /// Magnitude spectrogram of a signal
    ///
    /// Frames start every `frame_shift` samples; the last frame is
    /// the last one that fits entirely within the signal, so an
    /// input shorter than one frame yields no spectra. Each
    /// spectrum holds the `frame_len / 2` magnitudes below
    /// Nyquist.
    pub fn spectrogram(&self, signal: &[f64]) -> Vec<Vec<f64>> {
        if signal.len() < self.frame_len {
            return Vec::new();
        }
        let count = (signal.len() - self.frame_len) / self.frame_shift + 1;
        let mut frame = vec![Complex::new(0.0, 0.0); self.frame_len];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut spectra = Vec::with_capacity(count);
        for index in 0..count {
            let start = index * self.frame_shift;
            for (dst, (&sample, &weight)) in frame
                .iter_mut()
                .zip(signal[start..start + self.frame_len].iter().zip(&self.window))
            {
                *dst = Complex::new(sample * weight, 0.0);
            }
            self.fft.process_with_scratch(&mut frame, &mut scratch);
            spectra.push(frame[..self.frame_len / 2].iter().map(|c| c.norm()).collect());
        }
        spectra
    }
}

impl fmt::Debug for Stft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stft")
            .field("frame_shift", &self.frame_shift)
            .field("frame_len", &self.frame_len)
            .finish_non_exhaustive()
    }
}

fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (len as f64 - 1.0)).cos())
        .collect()
}
