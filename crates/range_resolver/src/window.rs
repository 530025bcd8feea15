use history_model::{DateWindow, PricePoint};

/// Points dated within `window`, both ends inclusive, in their original
/// order. A window ending before it starts is treated as the single day
/// `window.from`.
pub fn filter_window(points: &[PricePoint], window: DateWindow) -> Vec<PricePoint> {
    let window = window.normalized();
    points
        .iter()
        .filter(|point| window.contains(point.date))
        .copied()
        .collect()
}
