use std::collections::BTreeMap;

use crate::config::CurveShape;

/// Generates a diagnostic target mana curve: mana value -> desired card
/// count, summing exactly to `total_cards`.
///
/// Weights follow the configured shape over the `[min_mv, max_mv]` span;
/// rounding residue is corrected one card at a time so the total is exact.
pub fn generate_target_curve(
    min_mv: u32,
    max_mv: u32,
    total_cards: u32,
    shape: CurveShape,
) -> BTreeMap<u32, u32> {
    let mut curve = BTreeMap::new();
    if max_mv < min_mv {
        return curve;
    }
    let span = max_mv - min_mv + 1;

    let weights: Vec<f64> = (min_mv..=max_mv)
        .map(|mv| {
            let offset = mv - min_mv;
            match shape {
                CurveShape::Linear => (span - offset) as f64,
                CurveShape::Inverse => (1 + offset) as f64,
                CurveShape::Flat => 1.0,
                CurveShape::Bell => {
                    let mid = (min_mv + max_mv) as f64 / 2.0;
                    span as f64 - (mv as f64 - mid).abs()
                }
            }
        })
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut allocated: i64 = 0;
    for (mv, weight) in (min_mv..=max_mv).zip(&weights) {
        let count = ((weight / total_weight) * total_cards as f64).round() as u32;
        curve.insert(mv, count);
        allocated += count as i64;
    }

    // Correct rounding drift against the requested total.
    let values: Vec<u32> = (min_mv..=max_mv).collect();
    let mut diff = total_cards as i64 - allocated;
    let mut idx = 0usize;
    while diff > 0 {
        if let Some(count) = curve.get_mut(&values[idx % values.len()]) {
            *count += 1;
            diff -= 1;
        }
        idx += 1;
    }
    while diff < 0 {
        if let Some(count) = curve.get_mut(&values[idx % values.len()])
            && *count > 0
        {
            *count -= 1;
            diff += 1;
        }
        idx += 1;
    }

    curve
}
