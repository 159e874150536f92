use std::collections::HashSet;

use image::GrayImage;
use crate::{
    config::LineConfig,
    traits::SegmentExtractor,
    types::{Orientation, Point, Segment},
};

/// Quantization step (pixels) used to collapse near-identical detections.
const DEDUPE_BUCKET: f64 = 5.0;

/// Row/column scanline extractor for axis-aligned wall strokes
#[derive(Debug, Clone, Default)]
pub struct ScanlineExtractor {
    pub config: LineConfig,
}

impl ScanlineExtractor {
    pub fn new(config: LineConfig) -> Self {
        Self { config }
    }
}

impl SegmentExtractor for ScanlineExtractor {
    fn extract_segments(&self, edges: &GrayImage) -> Vec<Segment> {
        detect_lines(edges, &self.config)
    }
}

/// Scans rows for horizontal runs and columns for vertical runs.
pub fn detect_lines(edges: &GrayImage, config: &LineConfig) -> Vec<Segment> {
    let (width, height) = edges.dimensions();
    let mut collector = SegmentCollector::default();
    let max_gap = config.max_gap();

    for y in 0..height {
        scan_line(width, |x| edges.get_pixel(x, y)[0], config.edge_threshold, max_gap, config.min_length, |from, to| {
            collector.push(Segment {
                orientation: Orientation::Horizontal,
                start: Point::new(from as f64, y as f64),
                end: Point::new(to as f64, y as f64),
                length: (to - from + 1) as f64,
            })
        });
    }

    let vertical_threshold = config.vertical_threshold();
    for x in 0..width {
        scan_line(height, |y| edges.get_pixel(x, y)[0], vertical_threshold, max_gap, config.min_length, |from, to| {
            collector.push(Segment {
                orientation: Orientation::Vertical,
                start: Point::new(x as f64, from as f64),
                end: Point::new(x as f64, to as f64),
                length: (to - from + 1) as f64,
            })
        });
    }

    tracing::debug!(
        segments = collector.segments.len(),
        duplicates = collector.duplicates,
        "scanline extraction finished"
    );
    collector.segments
}

/// Walks one scanline and reports every run `[from, to]` (last bright pixel
/// inclusive) of at least `min_length` pixels. Up to `max_gap` dark pixels
/// inside a run are bridged.
fn scan_line(
    len: u32,
    intensity: impl Fn(u32) -> u8,
    threshold: u8,
    max_gap: u32,
    min_length: u32,
    mut emit: impl FnMut(u32, u32),
) {
    let mut finish = |from: u32, to: u32| {
        if to - from + 1 >= min_length {
            emit(from, to);
        }
    };

    // (start, last bright pixel, current gap)
    let mut run: Option<(u32, u32, u32)> = None;
    for i in 0..len {
        if intensity(i) > threshold {
            run = match run {
                None => Some((i, i, 0)),
                Some((start, _, _)) => Some((start, i, 0)),
            };
        } else if let Some((start, last, gap)) = run {
            if gap < max_gap {
                run = Some((start, last, gap + 1));
            } else {
                finish(start, last);
                run = None;
            }
        }
    }
    if let Some((start, last, _)) = run {
        finish(start, last);
    }
}

#[derive(Default)]
struct SegmentCollector {
    segments: Vec<Segment>,
    seen: HashSet<(Orientation, i64, i64, i64)>,
    duplicates: usize,
}

impl SegmentCollector {
    fn push(&mut self, segment: Segment) {
        let bucket = |v: f64| (v / DEDUPE_BUCKET).round() as i64;
        let (from, to) = match segment.orientation {
            Orientation::Horizontal => (segment.start.x, segment.end.x),
            Orientation::Vertical => (segment.start.y, segment.end.y),
        };
        let key = (segment.orientation, bucket(segment.cross_coord()), bucket(from), bucket(to));
        if self.seen.insert(key) {
            self.segments.push(segment);
        } else {
            self.duplicates += 1;
        }
    }
}
