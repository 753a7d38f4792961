use imageproc::contours::find_contours;
use imageproc::point::Point;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Contour, Mask};

/// Find every boundary in the mask, holes included.
///
/// Border following (Suzuki-Abe) keeps the full outer/hole hierarchy; each
/// chain is then compressed down to its direction changes. Enumeration order
/// is whatever the raster scan produces and callers must not rely on it.
pub fn find_boundaries(mask: &Mask) -> AnalysisResult<Vec<Contour>> {
    if mask.width() == 0 || mask.height() == 0 {
        return Err(AnalysisError::ExtractionFailure(format!(
            "mask is {}x{}",
            mask.width(),
            mask.height()
        )));
    }
    if let Some(bad) = mask
        .as_gray()
        .as_raw()
        .iter()
        .find(|&&v| v != 0 && v != Mask::SELECTED)
    {
        return Err(AnalysisError::ExtractionFailure(format!(
            "mask is not binary (found value {})",
            bad
        )));
    }

    Ok(find_contours::<i32>(mask.as_gray())
        .into_iter()
        .map(|c| Contour {
            points: compress_chain(&c.points),
            kind: c.border_type.into(),
            parent: c.parent,
        })
        .collect())
}

/// Drop points lying in the middle of a straight run of the closed chain.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            direction(prev, cur) != direction(cur, next)
        })
        .map(|i| points[i])
        .collect();
    // A chain that never turns (a single pixel revisited) keeps its start
    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

fn direction(from: Point<i32>, to: Point<i32>) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}
