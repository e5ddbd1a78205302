//! Gap-aware segmentation.

use contracts::{Segment, SegmentIndexList, Signal};
use tracing::instrument;

/// Splits a sample array into valid runs and single missing samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapSegmenter;

impl GapSegmenter {
    /// Segment a signal. See [`GapSegmenter::segment_samples`].
    #[instrument(
        name = "gap_segment",
        level = "trace",
        skip(signal),
        fields(source = %signal.source(), len = signal.len())
    )]
    pub fn segment(signal: &Signal) -> SegmentIndexList {
        Self::segment_samples(signal.samples())
    }

    /// Maximal runs of non-NaN samples interleaved with one length-1 segment
    /// per NaN sample. The result tiles `[0, len)` exactly.
    pub fn segment_samples(samples: &[f64]) -> SegmentIndexList {
        let mut segments = Vec::new();
        let mut run_start = 0;

        for (i, v) in samples.iter().enumerate() {
            if v.is_nan() {
                if run_start < i {
                    segments.push(Segment::valid(run_start, i));
                }
                segments.push(Segment::missing(i));
                run_start = i + 1;
            }
        }
        if run_start < samples.len() {
            segments.push(Segment::valid(run_start, samples.len()));
        }

        SegmentIndexList::from_segments(segments)
    }
}
