use crate::models::{BoundingBox, Contour};

/// Keep contours enclosing strictly more than `min_area` and map their
/// bounding boxes back to full resolution.
///
/// Output order follows the input order. Nested contours are not merged, so
/// a region with a large hole yields one box for its outer border and one
/// for the hole.
pub fn filter_regions(contours: &[Contour], min_area: f64, divisor: u32) -> Vec<BoundingBox> {
    contours
        .iter()
        .filter(|c| c.area() > min_area)
        .filter_map(|c| c.bounding_rect())
        .map(|rect| rect.scaled(divisor))
        .collect()
}
