//! Stack trace post-processing pipeline.
//!
//! Processors are composed statically into a [`TracePipeline`] at engine
//! construction; each takes and returns an ordered frame sequence
//! (innermost call first). Processing is cosmetic — it reduces
//! diagnostic volume and must never drive control flow.

use problemkit_core::Frame;
use tracing::trace;

/// One stage of the trace pipeline.
pub trait TraceProcessor: Send + Sync {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Post-process `frames`. `cause_frames` is the *unprocessed* stack
    /// of the immediate cause, when one exists.
    fn process(&self, frames: Vec<Frame>, cause_frames: Option<&[Frame]>) -> Vec<Frame>;
}

/// Passes frames through unchanged.
pub struct Identity;

impl TraceProcessor for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn process(&self, frames: Vec<Frame>, _cause_frames: Option<&[Frame]>) -> Vec<Frame> {
        frames
    }
}

/// Trailing-overlap trimming.
///
/// When a fault is wrapped close to where its cause originated, the
/// wrapper's trailing frames repeat the cause's leading frames; only
/// the wrapper's unique leading frames are kept. The overlap is the
/// longest *contiguous* trailing block of the wrapper that matches the
/// start of the cause, not a general subsequence alignment.
pub struct OverlapTrimmer;

impl OverlapTrimmer {
    /// Largest `k` such that the last `k` wrapper frames equal,
    /// frame-for-frame, the first `k` cause frames. Scans `k` downward;
    /// the first match wins.
    fn overlap(frames: &[Frame], cause_frames: &[Frame]) -> usize {
        let max = frames.len().min(cause_frames.len());
        (1..=max)
            .rev()
            .find(|&k| frames[frames.len() - k..] == cause_frames[..k])
            .unwrap_or(0)
    }
}

impl TraceProcessor for OverlapTrimmer {
    fn name(&self) -> &'static str {
        "overlap-trimmer"
    }

    fn process(&self, mut frames: Vec<Frame>, cause_frames: Option<&[Frame]>) -> Vec<Frame> {
        let Some(cause_frames) = cause_frames else {
            return frames;
        };
        let overlap = Self::overlap(&frames, cause_frames);
        if overlap > 0 {
            trace!(overlap, total = frames.len(), "trimming shared trailing frames");
            frames.truncate(frames.len() - overlap);
        }
        frames
    }
}

/// An explicit, ordered composition of processors.
pub struct TracePipeline {
    processors: Vec<Box<dyn TraceProcessor>>,
}

impl TracePipeline {
    /// Compose a pipeline from an explicit processor list.
    pub fn new(processors: Vec<Box<dyn TraceProcessor>>) -> Self {
        Self { processors }
    }

    /// The standard pipeline: overlap trimming only.
    pub fn standard() -> Self {
        Self::new(vec![Box::new(OverlapTrimmer)])
    }

    /// A pipeline that leaves every stack untouched.
    pub fn passthrough() -> Self {
        Self::new(vec![Box::new(Identity)])
    }

    /// Run every processor in order.
    pub fn run(&self, mut frames: Vec<Frame>, cause_frames: Option<&[Frame]>) -> Vec<Frame> {
        for processor in &self.processors {
            frames = processor.process(frames, cause_frames);
        }
        frames
    }
}

impl Default for TracePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(symbols: &[&str]) -> Vec<Frame> {
        symbols.iter().map(|s| Frame::named(*s)).collect()
    }

    #[test]
    fn shared_trailing_frames_are_trimmed() {
        // wrapper [a,b,c,d] vs cause [c,d,e]: wrapper's trailing [c,d]
        // repeats the cause's leading [c,d], so overlap = 2
        let out = OverlapTrimmer.process(frames(&["a", "b", "c", "d"]), Some(&frames(&["c", "d", "e"])));
        assert_eq!(out, frames(&["a", "b"]));
    }

    #[test]
    fn zero_overlap_leaves_frames_unchanged() {
        let wrapper = frames(&["a", "b"]);
        let out = OverlapTrimmer.process(wrapper.clone(), Some(&frames(&["x", "y"])));
        assert_eq!(out, wrapper);
    }

    #[test]
    fn no_cause_leaves_frames_unchanged() {
        let wrapper = frames(&["a", "b"]);
        let out = OverlapTrimmer.process(wrapper.clone(), None);
        assert_eq!(out, wrapper);
    }

    #[test]
    fn identical_stacks_trim_to_empty() {
        let shared = frames(&["a", "b", "c"]);
        let out = OverlapTrimmer.process(shared.clone(), Some(&shared));
        assert!(out.is_empty());
    }

    #[test]
    fn interior_match_is_not_an_overlap() {
        // [c,d] appears inside the cause but not at its start
        let out = OverlapTrimmer.process(frames(&["a", "c", "d"]), Some(&frames(&["x", "c", "d", "e"])));
        assert_eq!(out, frames(&["a", "c", "d"]));
    }

    #[test]
    fn longest_match_wins_over_shorter_ones() {
        // both [c,d] and the single [d]-vs-[c] candidate are checked;
        // the longest contiguous block is taken
        let out = OverlapTrimmer.process(frames(&["a", "c", "d"]), Some(&frames(&["c", "d"])));
        assert_eq!(out, frames(&["a"]));
    }

    #[test]
    fn pipeline_runs_processors_in_order() {
        struct DropFirst;
        impl TraceProcessor for DropFirst {
            fn name(&self) -> &'static str {
                "drop-first"
            }
            fn process(&self, frames: Vec<Frame>, _: Option<&[Frame]>) -> Vec<Frame> {
                frames.into_iter().skip(1).collect()
            }
        }

        let pipeline = TracePipeline::new(vec![Box::new(DropFirst), Box::new(OverlapTrimmer)]);
        let out = pipeline.run(frames(&["x", "a", "d"]), Some(&frames(&["d", "e"])));
        // DropFirst removes "x", trimmer removes the shared "d"
        assert_eq!(out, frames(&["a"]));
    }

    #[test]
    fn passthrough_pipeline_is_identity() {
        let input = frames(&["a", "b"]);
        assert_eq!(TracePipeline::passthrough().run(input.clone(), Some(&frames(&["a", "b"]))), input);
    }
}
