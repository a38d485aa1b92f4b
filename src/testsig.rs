//! Synthetic keyed carriers for the unit tests
//!
//! The tests synthesize their own on-off-keyed sine waves instead
//! of shipping audio fixtures. Tones are placed on exact STFT bins
//! so the spectral peak lands where the test expects it.

/// Expand a dot/dash code string into key-down/key-up segments
///
/// Returns `(key_down, samples)` pairs. A dot keys down for one
/// `unit`, a dash for three; every symbol is followed by one unit
/// of silence. A space in `code` widens the preceding silence by
/// three more units, which keeps inter-character gaps safely wider
/// than a dash.
pub(crate) fn keying(code: &str, unit: usize) -> Vec<(bool, usize)> {
    let mut segments = Vec::new();
    for symbol in code.chars() {
        match symbol {
            '.' => {
                segments.push((true, unit));
                segments.push((false, unit));
            }
            '-' => {
                segments.push((true, 3 * unit));
                segments.push((false, unit));
            }
            _ => {
                segments.push((false, 3 * unit));
            }
        }
    }
    segments
}

/// Render keying segments as a sine carrier on an exact STFT bin
///
/// The tone frequency is `bin / frame_len` cycles per sample, with
/// phase kept continuous across key-up intervals.
pub(crate) fn keyed_carrier(segments: &[(bool, usize)], bin: usize, frame_len: usize) -> Vec<f64> {
    let rate = 2.0 * std::f64::consts::PI * bin as f64 / frame_len as f64;
    let total: usize = segments.iter().map(|&(_, len)| len).sum();
    let mut out = Vec::with_capacity(total);
    for &(down, len) in segments {
        for _ in 0..len {
            let phase = rate * out.len() as f64;
            out.push(if down { phase.sin() } else { 0.0 });
        }
    }
    out
}

/// Deterministic white-ish noise from a linear congruential generator
pub(crate) fn noise(len: usize, amplitude: f64) -> Vec<f64> {
    let mut state = 0x2545f491u64;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let uniform = (state >> 11) as f64 / (1u64 << 53) as f64;
        out.push(amplitude * (2.0 * uniform - 1.0));
    }
    out
}

/// Element-wise sum of two signals, zero-padding the shorter
pub(crate) fn mix(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len().max(b.len())];
    for (dst, &sample) in out.iter_mut().zip(a) {
        *dst += sample;
    }
    for (dst, &sample) in out.iter_mut().zip(b) {
        *dst += sample;
    }
    out
}
