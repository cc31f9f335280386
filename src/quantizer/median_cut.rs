use std::cmp::Reverse;

use image::Rgba;
use log::debug;
use priority_queue::PriorityQueue;

use crate::histogram::{weighted_average, ColorHistogram};
use crate::{Cluster, Quantizer};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
struct Rgb<T> {
    r: T,
    g: T,
    b: T,
}

impl<T> Rgb<T> {
    fn map<O>(self, mut f: impl FnMut(T) -> O) -> Rgb<O> {
        Rgb {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    fn as_mut(&mut self) -> Rgb<&mut T> {
        Rgb {
            r: &mut self.r,
            g: &mut self.g,
            b: &mut self.b,
        }
    }

    fn zip<O>(self, other: Rgb<O>) -> Rgb<(T, O)> {
        Rgb {
            r: (self.r, other.r),
            g: (self.g, other.g),
            b: (self.b, other.b),
        }
    }
}

impl From<Rgba<u8>> for Rgb<u8> {
    fn from(color: Rgba<u8>) -> Self {
        let [r, g, b, _] = color.0;
        Rgb { r, g, b }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct MinMax<T> {
    min: T,
    max: T,
}

impl<T: Ord + Copy> MinMax<T> {
    fn from_value(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn extend(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if self.max < value {
            self.max = value;
        }
    }
}

impl MinMax<u8> {
    fn range(&self) -> u64 {
        u64::from(self.max - self.min)
    }

    fn midpoint(&self) -> u8 {
        ((u16::from(self.min) + u16::from(self.max)) / 2) as u8
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Dimension {
    R,
    G,
    B,
}

impl Dimension {
    fn of(self, color: &Rgba<u8>) -> u8 {
        match self {
            Dimension::R => color[0],
            Dimension::G => color[1],
            Dimension::B => color[2],
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Bounds(Rgb<MinMax<u8>>);

impl Bounds {
    fn new(color: Rgb<u8>) -> Self {
        Self(color.map(MinMax::from_value))
    }

    fn extend(&mut self, color: Rgb<u8>) {
        self.0.as_mut().zip(color).map(|(mm, c)| mm.extend(c));
    }

    fn volume(&self) -> u64 {
        self.0.r.range() * self.0.g.range() * self.0.b.range()
    }

    fn longest_dimension(&self) -> (Dimension, MinMax<u8>) {
        let Rgb { r, g, b } = self.0;
        if r.range() >= g.range() && r.range() >= b.range() {
            (Dimension::R, r)
        } else if g.range() >= b.range() {
            (Dimension::G, g)
        } else {
            (Dimension::B, b)
        }
    }
}

/// Bounding box of a set of distinct colors.
#[derive(Debug, Clone)]
struct ColorBox {
    bounds: Bounds,
    colors: Vec<Rgba<u8>>,
}

impl ColorBox {
    fn from_colors(colors: Vec<Rgba<u8>>) -> Option<Self> {
        let mut iter = colors.iter().copied().map(Rgb::from);
        let mut bounds = Bounds::new(iter.next()?);
        for color in iter {
            bounds.extend(color);
        }
        Some(Self { bounds, colors })
    }

    fn volume(&self) -> u64 {
        self.bounds.volume()
    }

    /// A box can only be cut if its colors differ in red, green or blue.
    fn is_splittable(&self) -> bool {
        self.colors.len() > 1 && self.bounds.longest_dimension().1.range() > 0
    }

    /// Cuts the box at the midpoint of its widest channel.
    fn split(&self) -> Option<(ColorBox, ColorBox)> {
        let (dimension, range) = self.bounds.longest_dimension();
        let midpoint = range.midpoint();
        let (low, high): (Vec<_>, Vec<_>) = self
            .colors
            .iter()
            .partition(|color| dimension.of(color) <= midpoint);
        Some((ColorBox::from_colors(low)?, ColorBox::from_colors(high)?))
    }

    fn average(&self, histogram: &ColorHistogram) -> Rgba<u8> {
        weighted_average(
            self.colors
                .iter()
                .map(|color| (*color, histogram.count_of(color))),
        )
        .unwrap_or(Rgba([0, 0, 0, 0]))
    }
}

trait Extractor {
    fn extract(vbox: &ColorBox) -> u64;
}

struct PopulationVolumeExtractor {}

impl Extractor for PopulationVolumeExtractor {
    fn extract(vbox: &ColorBox) -> u64 {
        vbox.colors.len() as u64 * vbox.volume()
    }
}

struct PopulationExtractor {}

impl Extractor for PopulationExtractor {
    fn extract(vbox: &ColorBox) -> u64 {
        vbox.colors.len() as u64
    }
}

/// Unsplittable boxes sort last; equal scores prefer more colors, then the older box.
type Priority = (bool, u64, usize, Reverse<usize>);

fn priority<E: Extractor>(vbox: &ColorBox, id: usize) -> Priority {
    (
        vbox.is_splittable(),
        E::extract(vbox),
        vbox.colors.len(),
        Reverse(id),
    )
}

/// Splits boxes until there are `target` of them or the best candidate cannot be cut.
///
/// Returns false once splitting got stuck.
fn split_boxes<E: Extractor>(boxes: &mut Vec<ColorBox>, target: usize) -> bool {
    let mut queue: PriorityQueue<usize, Priority> = boxes
        .iter()
        .enumerate()
        .map(|(id, vbox)| (id, priority::<E>(vbox, id)))
        .collect();
    while boxes.len() < target {
        let id = match queue.pop() {
            Some((id, (true, ..))) => id,
            _ => return false,
        };
        let (low, high) = match boxes[id].split() {
            Some(halves) => halves,
            None => return false,
        };
        boxes[id] = low;
        boxes.push(high);
        let high_id = boxes.len() - 1;
        queue.push(id, priority::<E>(&boxes[id], id));
        queue.push(high_id, priority::<E>(&boxes[high_id], high_id));
    }
    true
}

/// Median cut quantizer
///
/// Boxes are cut at the midpoint of their widest channel. The first half of the
/// cuts goes to the boxes with the most colors, the rest to the boxes with the
/// largest product of color count and volume so that rare colors far away from
/// the bulk keep a slot of their own.
#[derive(Debug, Default)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, histogram: &ColorHistogram, max_colors: usize) -> Vec<Cluster> {
        let mut distinct_colors: Vec<_> = histogram.colors().collect();
        distinct_colors.sort_unstable_by_key(|color| color.0);

        if distinct_colors.len() <= max_colors {
            return distinct_colors.into_iter().map(Cluster::singleton).collect();
        }

        let mut boxes = match ColorBox::from_colors(distinct_colors) {
            Some(vbox) if max_colors > 0 => vec![vbox],
            _ => return Vec::new(),
        };
        if split_boxes::<PopulationExtractor>(&mut boxes, max_colors / 2) {
            split_boxes::<PopulationVolumeExtractor>(&mut boxes, max_colors);
        }
        debug!(
            "median cut reduced {} colors to {} clusters",
            histogram.len(),
            boxes.len()
        );

        boxes
            .into_iter()
            .map(|vbox| Cluster {
                color: vbox.average(histogram),
                members: vbox.colors,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(colors: &[([u8; 4], usize)]) -> ColorHistogram {
        ColorHistogram::from_pixels(
            colors
                .iter()
                .flat_map(|&(color, count)| std::iter::repeat(Rgba(color)).take(count)),
        )
    }

    #[test]
    fn few_colors_are_kept_exactly() {
        let histogram = histogram(&[([9, 9, 9, 255], 3), ([1, 2, 3, 255], 1)]);
        let clusters = MedianCut.quantize(&histogram, 16);
        assert_eq!(
            clusters,
            vec![
                Cluster::singleton(Rgba([1, 2, 3, 255])),
                Cluster::singleton(Rgba([9, 9, 9, 255])),
            ]
        );
    }

    #[test]
    fn never_exceeds_budget() {
        let colors: Vec<_> = (0..=255u8)
            .flat_map(|r| (0..4u8).map(move |g| ([r, g * 60, 255 - r, 255], 1)))
            .collect();
        let histogram = histogram(&colors);
        for &budget in &[1usize, 2, 7, 64, 255] {
            let clusters = MedianCut.quantize(&histogram, budget);
            assert_eq!(clusters.len(), budget);
            let members: usize = clusters.iter().map(|c| c.members.len()).sum();
            assert_eq!(members, histogram.len());
        }
    }

    #[test]
    fn splits_widest_channel_at_midpoint() {
        let histogram = histogram(&[
            ([0, 0, 0, 255], 1),
            ([100, 0, 0, 255], 1),
            ([101, 0, 0, 255], 1),
            ([200, 10, 0, 255], 1),
        ]);
        let clusters = MedianCut.quantize(&histogram, 2);
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters[0].members,
            vec![Rgba([0, 0, 0, 255]), Rgba([100, 0, 0, 255])]
        );
        assert_eq!(
            clusters[1].members,
            vec![Rgba([101, 0, 0, 255]), Rgba([200, 10, 0, 255])]
        );
    }

    #[test]
    fn equal_ranges_split_red_first() {
        let histogram = histogram(&[
            ([0, 0, 0, 255], 1),
            ([100, 0, 0, 255], 1),
            ([100, 100, 0, 255], 1),
        ]);
        let clusters = MedianCut.quantize(&histogram, 2);
        assert_eq!(clusters[0].members, vec![Rgba([0, 0, 0, 255])]);
        assert_eq!(
            clusters[1].members,
            vec![Rgba([100, 0, 0, 255]), Rgba([100, 100, 0, 255])]
        );
    }

    /// 30 dark colors in a thin box and 3 bright colors spanning a huge one.
    /// The first cut separates them.
    fn dense_and_sparse() -> ColorHistogram {
        let mut colors: Vec<_> = (0..30u8).map(|i| ([i, i % 2, i % 3, 255], 1)).collect();
        colors.extend(&[
            ([200, 0, 0, 255], 1),
            ([225, 0, 250, 255], 1),
            ([250, 250, 0, 255], 1),
        ]);
        histogram(&colors)
    }

    #[test]
    fn late_cuts_prefer_large_volume() {
        let clusters = MedianCut.quantize(&dense_and_sparse(), 4);
        assert_eq!(clusters.len(), 4);
        assert_eq!(
            clusters[1].members,
            vec![Rgba([200, 0, 0, 255]), Rgba([225, 0, 250, 255])]
        );
        assert_eq!(clusters[2].members, vec![Rgba([250, 250, 0, 255])]);
        assert_eq!(clusters[0].members.len() + clusters[3].members.len(), 30);
    }

    #[test]
    fn early_cuts_prefer_many_colors() {
        let clusters = MedianCut.quantize(&dense_and_sparse(), 6);
        assert_eq!(clusters.len(), 6);
        // the second cut went to the dense box although the sparse one is far larger
        assert!(clusters[2].members.iter().all(|c| c[0] < 30));
        assert_eq!(clusters[3].members, vec![Rgba([250, 250, 0, 255])]);
    }

    #[test]
    fn representative_is_weighted_average() {
        let histogram = histogram(&[
            ([0, 0, 0, 255], 3),
            ([40, 0, 0, 255], 1),
            ([250, 250, 250, 255], 1),
        ]);
        let clusters = MedianCut.quantize(&histogram, 2);
        assert_eq!(clusters[0].color, Rgba([10, 0, 0, 255]));
        assert_eq!(clusters[1].color, Rgba([250, 250, 250, 255]));
    }

    #[test]
    fn colors_differing_only_in_alpha_stay_together() {
        let histogram = histogram(&[
            ([5, 5, 5, 0], 1),
            ([5, 5, 5, 100], 1),
            ([5, 5, 5, 255], 1),
        ]);
        let clusters = MedianCut.quantize(&histogram, 2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
    }

    #[test]
    fn empty_histogram_yields_nothing() {
        let clusters = MedianCut.quantize(&ColorHistogram::default(), 256);
        assert!(clusters.is_empty());
    }

    #[test]
    fn deterministic() {
        let colors: Vec<_> = (0..200u8)
            .map(|i| ([i, i.wrapping_mul(7), i.wrapping_mul(13), 255], i as usize % 5 + 1))
            .collect();
        let histogram = histogram(&colors);
        let first = MedianCut.quantize(&histogram, 32);
        let second = MedianCut.quantize(&histogram.clone(), 32);
        assert_eq!(first, second);
    }
}
