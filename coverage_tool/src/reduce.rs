//! Splitting and down-sampling of depth tracks.

use crate::DepthPoint;

/// Separates the points at `keep` positions from the rest.
///
/// Both `points` and `keep` are expected in ascending position order; the
/// walk advances through `keep` only when the current point matches it.
/// Returns `(reserved, remaining)`.
#[must_use]
pub fn split_points(points: Vec<DepthPoint>, keep: &[u32]) -> (Vec<DepthPoint>, Vec<DepthPoint>) {
    let mut reserved = Vec::with_capacity(keep.len());
    let mut remaining = Vec::with_capacity(points.len());
    let mut wanted = keep.iter().peekable();

    for point in points {
        if wanted.next_if(|&&pos| pos == point.position).is_some() {
            reserved.push(point);
        } else {
            remaining.push(point);
        }
    }
    (reserved, remaining)
}

/// Reduces `points` covering `start..=end` to at most `max_points` windows.
///
/// Positions without a pileup record count as depth 0. The region is
/// zero-filled over `end - start + 2` slots and cut into consecutive windows of
/// `slots / max_points` entries, the first `slots % max_points` windows taking
/// one extra. Each window yields its first position and the integer mean depth.
///
/// The input is returned untouched when `max_points <= 1`, when the region would
/// shrink by less than a factor of two, or when `end < start`.
#[must_use]
pub fn reduce_points(start: u32, end: u32, points: Vec<DepthPoint>, max_points: usize) -> Vec<DepthPoint> {
    if max_points <= 1 || end < start {
        return points;
    }

    let Ok(span) = usize::try_from(end - start) else {
        return points;
    };
    let slots = span + 2;
    let factor = slots / max_points;
    if factor <= 1 {
        return points;
    }

    let mut filled = vec![0_u32; slots];
    for point in &points {
        if (start..=end).contains(&point.position) {
            if let Some(depth) = usize::try_from(point.position - start)
                .ok()
                .and_then(|idx| filled.get_mut(idx))
            {
                *depth = point.depth;
            }
        }
    }

    let mut reduced = Vec::with_capacity(max_points);
    let mut extra = slots % max_points;
    let mut offset = 0;
    while let Some(rest) = filled.get(offset..).filter(|rest| !rest.is_empty()) {
        let width = if extra > 0 {
            extra -= 1;
            factor + 1
        } else {
            factor
        };
        let window = rest.get(..width).unwrap_or(rest);
        let sum: u64 = window.iter().copied().map(u64::from).sum();
        let mean = sum / window.len() as u64;
        reduced.push(DepthPoint {
            position: start.saturating_add(u32::try_from(offset).unwrap_or(u32::MAX)),
            depth: u32::try_from(mean).unwrap_or(u32::MAX),
        });
        offset += width;
    }
    reduced
}
