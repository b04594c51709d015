//! Picks a small, reproducible set of representative frames from a
//! per-frame statistic.
//!
//! Frames are classified into a dark and a light bucket by fixed
//! intervals, buckets are thinned so kept frames are spread out in time,
//! and each bucket is then randomly reduced to its target size.

use crate::video::FrameRate;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_SEED: u64 = 20202020;
pub const DEFAULT_SPACING_SECONDS: f64 = 15.0;

/// Closed interval of statistic values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub const DARK: Self = Self { low: 0.062746, high: 0.380000 };
    pub const LIGHT: Self = Self { low: 0.450000, high: 0.800000 };

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spacing {
    None,
    Frames(usize),
    Seconds(f64),
}

impl Spacing {
    /// Minimum index distance between two kept frames of the same bucket.
    pub fn threshold(&self, frame_rate: FrameRate) -> usize {
        match *self {
            Spacing::None => 0,
            Spacing::Frames(frames) => frames,
            Spacing::Seconds(seconds) => (frame_rate.as_f64() * seconds).round().max(0.0) as usize,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SamplerOptions {
    pub dark_count: usize,
    pub light_count: usize,
    pub seed: u64,
    pub spacing: Spacing,
    pub dark: Interval,
    pub light: Interval,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            dark_count: 8,
            light_count: 4,
            seed: DEFAULT_SEED,
            spacing: Spacing::Seconds(DEFAULT_SPACING_SECONDS),
            dark: Interval::DARK,
            light: Interval::LIGHT,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Buckets {
    pub dark: Vec<usize>,
    pub light: Vec<usize>,
}

/// Single forward pass; dark wins where intervals overlap.
pub fn classify(stats: &[f64], options: &SamplerOptions) -> Buckets {
    let mut buckets = Buckets::default();
    for (index, &value) in stats.iter().enumerate() {
        if options.dark.contains(value) {
            buckets.dark.push(index);
        } else if options.light.contains(value) {
            buckets.light.push(index);
        }
    }
    buckets
}

/// Keeps the first index, then every index at least `threshold` frames
/// after the last kept one. Expects `indices` in increasing order.
pub fn space_out(indices: &[usize], threshold: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(indices.len());
    for &index in indices {
        match kept.last() {
            Some(&last) if index - last < threshold => {}
            _ => kept.push(index),
        }
    }
    kept
}

/// Draws `count` distinct indices from `bucket` with a generator seeded
/// from `seed`. Buckets no larger than `count` are returned unchanged.
pub fn subsample(bucket: Vec<usize>, count: usize, seed: u64) -> Vec<usize> {
    if bucket.len() <= count {
        return bucket;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, bucket.len(), count)
        .into_iter()
        .map(|position| bucket[position])
        .collect()
}

pub fn sample(stats: &[f64], frame_rate: FrameRate, options: &SamplerOptions) -> Vec<usize> {
    let buckets = classify(stats, options);
    log::debug!("classified {} dark and {} light frames", buckets.dark.len(), buckets.light.len());

    let threshold = options.spacing.threshold(frame_rate);
    let dark = space_out(&buckets.dark, threshold);
    let light = space_out(&buckets.light, threshold);
    log::debug!(
        "{} dark and {} light frames remain at a spacing of {} frames",
        dark.len(), light.len(), threshold
    );

    let mut selected = subsample(dark, options.dark_count, options.seed);
    selected.extend(subsample(light, options.light_count, options.seed));

    if selected.is_empty() {
        log::warn!("No frame matched the dark or light range, nothing was selected");
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    const FILM: FrameRate = FrameRate { numerator: 24000, denominator: 1001 };

    fn alternating(len: usize) -> Vec<f64> {
        (0..len).map(|i| if i % 2 == 0 { 0.07 } else { 0.5 }).collect()
    }

    fn unspaced(dark_count: usize, light_count: usize) -> SamplerOptions {
        SamplerOptions {
            dark_count,
            light_count,
            spacing: Spacing::Seconds(0.001),
            ..SamplerOptions::default()
        }
    }

    #[test]
    fn classification_is_boundary_inclusive() {
        let stats = [0.062746, 0.38, 0.380001, 0.45, 0.8, 0.800001, 0.0627, 0.2, 0.6, 1.0];
        let buckets = classify(&stats, &SamplerOptions::default());
        assert_eq!(buckets.dark, vec![0, 1, 7]);
        assert_eq!(buckets.light, vec![3, 4, 8]);
    }

    #[test]
    fn spacing_threshold_from_seconds() {
        assert_eq!(Spacing::Seconds(15.0).threshold(FILM), 360);
        assert_eq!(Spacing::Seconds(0.001).threshold(FILM), 0);
        assert_eq!(Spacing::Frames(12).threshold(FILM), 12);
        assert_eq!(Spacing::None.threshold(FILM), 0);
    }

    #[test]
    fn close_indices_do_not_both_survive() {
        assert_eq!(space_out(&[100, 105], 10), vec![100]);
        assert_eq!(space_out(&[100, 110], 10), vec![100, 110]);
        assert_eq!(space_out(&[0, 4, 8, 12, 30], 10), vec![0, 12, 30]);
    }

    #[test]
    fn earliest_candidate_wins() {
        // 11 is skipped because 10 was accepted first, even though 11
        // would have left more room before 20.
        assert_eq!(space_out(&[0, 10, 11, 20], 10), vec![0, 10, 20]);
    }

    #[test]
    fn huge_threshold_keeps_only_first() {
        assert_eq!(space_out(&[1, 2], usize::MAX), vec![1]);

        let stats = [0.0, 0.1, 0.1];
        let frames = SamplerOptions { spacing: Spacing::Frames(usize::MAX), ..SamplerOptions::default() };
        assert_eq!(sample(&stats, FrameRate::new(24, 1), &frames), vec![1]);
        let seconds = SamplerOptions { spacing: Spacing::Seconds(1e300), ..SamplerOptions::default() };
        assert_eq!(sample(&stats, FrameRate::new(24, 1), &seconds), vec![1]);
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        assert_eq!(space_out(&[1, 2, 3], 0), vec![1, 2, 3]);
        assert!(space_out(&[], 5).is_empty());
    }

    #[test]
    fn subsample_keeps_small_buckets_untouched() {
        assert_eq!(subsample(vec![3, 9, 27], 3, DEFAULT_SEED), vec![3, 9, 27]);
        assert_eq!(subsample(vec![3, 9], 8, DEFAULT_SEED), vec![3, 9]);
        assert!(subsample(Vec::new(), 4, DEFAULT_SEED).is_empty());
    }

    #[test]
    fn subsample_draws_distinct_members() {
        let bucket: Vec<usize> = (0..50).map(|i| i * 3).collect();
        let drawn = subsample(bucket.clone(), 8, 7);
        assert_eq!(drawn.len(), 8);
        assert_eq!(drawn.iter().collect::<HashSet<_>>().len(), 8);
        assert!(drawn.iter().all(|index| bucket.contains(index)));
    }

    #[test]
    fn same_seed_gives_same_selection() {
        let stats: Vec<f64> = (0..500).map(|i| (i % 97) as f64 / 100.0).collect();
        let options = unspaced(8, 4);
        let first = sample(&stats, FILM, &options);
        let second = sample(&stats, FILM, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn each_bucket_is_drawn_with_a_fresh_generator() {
        let stats = alternating(40);
        let options = unspaced(3, 2);
        let buckets = classify(&stats, &options);
        assert!(buckets.dark.len() > 3 && buckets.light.len() > 2);

        let expected = [
            subsample(buckets.dark, 3, options.seed),
            subsample(buckets.light, 2, options.seed),
        ]
        .concat();
        assert_eq!(sample(&stats, FILM, &options), expected);
    }

    #[test]
    fn counts_are_capped_by_targets() {
        let stats: Vec<f64> = (0..300).map(|i| (i % 90) as f64 / 100.0).collect();
        let options = SamplerOptions { spacing: Spacing::Frames(5), ..SamplerOptions::default() };
        let buckets = classify(&stats, &options);
        let dark = space_out(&buckets.dark, 5).len();
        let light = space_out(&buckets.light, 5).len();

        let selected = sample(&stats, FILM, &options);
        let selected_dark = selected.iter().filter(|&&i| options.dark.contains(stats[i])).count();
        let selected_light = selected.iter().filter(|&&i| options.light.contains(stats[i])).count();
        assert_eq!(selected_dark, dark.min(options.dark_count));
        assert_eq!(selected_light, light.min(options.light_count));
    }

    #[test]
    fn result_is_unique_and_in_range() {
        let stats: Vec<f64> = (0..1000).map(|i| ((i * 37) % 100) as f64 / 100.0).collect();
        let selected = sample(&stats, FILM, &unspaced(20, 20));
        assert_eq!(selected.iter().collect::<HashSet<_>>().len(), selected.len());
        assert!(selected.iter().all(|&i| i < stats.len()));
    }

    #[test]
    fn alternating_sequence_scenario() {
        let stats = alternating(20);
        let options = unspaced(3, 2);
        let selected = sample(&stats, FILM, &options);

        assert_eq!(selected.len(), 5);
        assert!(selected[..3].iter().all(|i| i % 2 == 0));
        assert!(selected[3..].iter().all(|i| i % 2 == 1));
        assert_eq!(selected, sample(&stats, FILM, &options));
    }

    #[test]
    fn dark_frames_come_first() {
        let stats = [0.5, 0.5, 0.1, 0.6, 0.2];
        let selected = sample(&stats, FILM, &unspaced(8, 4));
        assert_eq!(selected, vec![2, 4, 0, 1, 3]);
    }

    #[test]
    fn empty_sequence_selects_nothing() {
        assert!(sample(&[], FILM, &SamplerOptions::default()).is_empty());
    }

    #[test]
    fn out_of_range_statistics_select_nothing() {
        let stats = [0.0, 0.01, 0.4, 0.9, 1.0];
        assert!(sample(&stats, FILM, &SamplerOptions::default()).is_empty());
    }
}
