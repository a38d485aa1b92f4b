//! Two-class clustering of envelopes and keying intervals
//!
//! [`TwoMeans`] is a one-dimensional, two-class mixture estimator:
//! the class means are seeded with the sample minimum and maximum,
//! then refined for a fixed number of assign-and-average rounds.
//! The decoder runs it twice per candidate carrier, over different
//! domains:
//!
//! 1. over the per-frame magnitude envelope, to separate "key
//!    down" from "key up" — [`steps()`](TwoMeans::steps) then
//!    extracts the transition list; and
//! 2. over the key-down run durations, to separate dots from
//!    dashes — [`class()`](TwoMeans::class) classifies each run,
//!    and [`gap()`](TwoMeans::gap) derives the key-up thresholds
//!    from the same means.

/// An envelope transition
///
/// Marks the frame index at which a new keying state begins.
/// `down = true` is a rising edge (tone starts); `down = false` is
/// a falling edge (silence starts). `span` is the distance, in
/// frames, to the following step; the last step of a sequence has
/// no following step and its span is left at zero, to be ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Frame index where the new state begins
    pub time: usize,

    /// True if the key is down from this step to the next
    pub down: bool,

    /// Frames until the next step
    pub span: f64,
}

/// Classified key-up interval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gap {
    /// Pause between the symbols of one character
    Symbol,

    /// Pause between characters
    Letter,

    /// Pause between words
    ///
    /// The separator is two spaces. The codec's single-space split
    /// turns the pair into one empty token, which decodes to `?`
    /// between the words; callers may post-process.
    Word,
}

impl Gap {
    /// Separator emitted into the decoded code string
    pub fn separator(&self) -> &'static str {
        match self {
            Gap::Symbol => "",
            Gap::Letter => " ",
            Gap::Word => "  ",
        }
    }
}

/// Two-class one-dimensional mixture estimator
///
/// Owns its sample vector. After [`optimize()`](TwoMeans::optimize)
/// the means satisfy `m[0] ≤ m[1]`, every sample is closer to its
/// own class mean than to the other (ties toward class 0), and
/// each mean is the arithmetic average of its members.
#[derive(Clone, Debug)]
pub struct TwoMeans {
    x: Vec<f64>,
    m: [f64; 2],
}

impl TwoMeans {
    /// Seed the estimator with a sample vector
    ///
    /// The class means start at the sample minimum and maximum.
    pub fn new(x: Vec<f64>) -> Self {
        let lo = x.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let m = if x.is_empty() { [0.0, 0.0] } else { [lo, hi] };
        Self { x, m }
    }

    /// Refine the class means
    ///
    /// Runs `iterations` rounds of nearest-mean assignment and
    /// per-class averaging. A class left empty by an assignment
    /// round retains its previous mean. The means are sorted
    /// ascending afterwards.
    pub fn optimize(&mut self, iterations: usize) {
        for _ in 0..iterations {
            let mut sum = [0.0f64; 2];
            let mut count = [0usize; 2];
            for &x in &self.x {
                let class = self.class(x);
                sum[class] += x;
                count[class] += 1;
            }
            for class in 0..2 {
                if count[class] > 0 {
                    self.m[class] = sum[class] / count[class] as f64;
                }
            }
        }
        if self.m[0] > self.m[1] {
            self.m.swap(0, 1);
        }
    }

    /// The class means, ascending
    pub fn means(&self) -> [f64; 2] {
        self.m
    }

    /// Nearest-mean class of a value, ties toward class 0
    pub fn class(&self, x: f64) -> usize {
        usize::from((x - self.m[0]).abs() > (x - self.m[1]).abs())
    }

    /// Classify a key-up duration against the key-down means
    ///
    /// Gaps no longer than the upper (dash) mean are
    /// intra-character; gaps up to three times the dash mean
    /// separate characters; anything longer separates words.
    pub fn gap(&self, span: f64) -> Gap {
        if span <= self.m[1] {
            Gap::Symbol
        } else if span <= 3.0 * self.m[1] {
            Gap::Letter
        } else {
            Gap::Word
        }
    }

    /// Extract the keying transitions of a classified envelope
    ///
    /// Emits a [`Step`] at index 0 and at every index where the
    /// class assignment changes; class 1 (the louder class) maps
    /// to key-down. Each step's span is the distance to the next
    /// step; the final step keeps a zero span.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::new();
        let mut prev = None;
        for (time, &x) in self.x.iter().enumerate() {
            let class = self.class(x);
            if prev != Some(class) {
                if let Some(last) = steps.last_mut() {
                    last.span = (time - last.time) as f64;
                }
                steps.push(Step {
                    time,
                    down: class == 1,
                    span: 0.0,
                });
            }
            prev = Some(class);
        }
        steps
    }
}
