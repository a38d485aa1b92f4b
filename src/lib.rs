//! # cwmonitor: multi-carrier Morse decoding
//!
//! This crate decodes Morse-code (CW) transmissions from a
//! real-valued audio stream. It accepts blocks of time-domain
//! samples at a known sampling rate, finds the narrow-band
//! carriers being keyed on and off, and emits the Latin text
//! carried on each one. Several stations keying simultaneously on
//! nearby frequencies are decoded independently, which makes the
//! crate suitable for amateur-radio band monitoring.
//!
//! ## Example
//!
//! You will first need baseband audio from a radio: the audio you
//! would normally listen to, mixed down to mono floating-point
//! samples. Capturing it is beyond the scope of this crate; to
//! sample your soundcard, try
//! [cpal](https://crates.io/crates/cpal).
//!
//! ```
//! use cwmonitor::MonitorBuilder;
//!
//! // create a Monitor with your audio sampling rate
//! let mut monitor = MonitorBuilder::new(8000).build();
//!
//! // push blocks of f64 PCM mono audio as they arrive; each
//! // read reports the carriers currently being tracked
//! # let block = vec![0.0f64; 800];
//! for message in monitor.read(&block) {
//!     println!("bin {}: {} ({} reads)", message.freq(), message.text(), message.life());
//! }
//! ```
//!
//! The [`Monitor`] keeps a rolling buffer of recent audio and a
//! table of active carriers. A carrier that keeps keying has its
//! decoded text re-estimated over its whole accumulated envelope
//! on every read, so the dot/dash timing estimate improves as the
//! transmission goes on; a carrier that goes quiet is carried for
//! a few reads and then dropped. For one-shot decoding of a
//! complete recording, use a [`Decoder`] directly.
//!
//! Conversion between Latin text and code strings is exposed as
//! [`code_to_text()`] and [`text_to_code()`]:
//!
//! ```
//! use cwmonitor::{code_to_text, text_to_code};
//!
//! assert_eq!(text_to_code("SOS"), "... --- ...");
//! assert_eq!(code_to_text("... --- ..."), "SOS");
//! ```
//!
//! ## Background
//!
//! Morse code survives on the amateur bands because on-off keying
//! of a bare carrier is about the simplest modulation there is,
//! and because trained operators copy it through conditions that
//! defeat voice. Decoding it by machine means recovering three
//! things the operator's ear does at once: which frequencies hold
//! a keyed carrier, where the key-down intervals start and stop,
//! and whether each interval is a dot or a dash. This crate does
//! the three steps with a short-time Fourier front-end, a carrier
//! peak search over the averaged spectrum, and two rounds of
//! two-class clustering per carrier, one over the magnitude
//! envelope and one over the keyed durations. No fixed words-per-
//! minute rate is assumed; the dot/dash split is re-estimated per
//! carrier from the signal itself.

mod builder;
mod cluster;
mod codec;
mod decoder;
mod monitor;
mod stft;

#[cfg(test)]
mod testsig;

pub use builder::MonitorBuilder;
pub use cluster::{Gap, Step, TwoMeans};
pub use codec::{code_to_text, text_to_code, MalformedTableErr, MorseTable};
pub use decoder::{Decoder, Message};
pub use monitor::Monitor;
pub use stft::Stft;
