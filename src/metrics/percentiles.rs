use super::types::Stat;

const P90: f64 = 0.90;
const P95: f64 = 0.95;
const P99: f64 = 0.99;

/// Quantile of an ascending slice by linear interpolation of the empirical CDF.
///
/// Rank `p * n` falls between order statistics `i` and `i + 1` (1-based); the
/// result blends them by the distance to the upper one. Returns `0.0` for an
/// empty slice.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> f64 {
    let count = sorted.len();
    if count == 0 {
        return 0.0;
    }
    let target = p * count as f64;
    let upper_rank = target.ceil();
    if upper_rank <= 1.0 {
        return sorted.first().copied().unwrap_or(0.0);
    }
    let upper = (upper_rank as usize).min(count);
    let index = upper.saturating_sub(1);
    let (Some(lower_value), Some(upper_value)) =
        (sorted.get(index.saturating_sub(1)), sorted.get(index))
    else {
        return 0.0;
    };
    let weight = upper as f64 - target;
    weight * lower_value + (1.0 - weight) * upper_value
}

/// Mean and tail quantiles of an ascending slice whose total is `sum`.
pub(crate) fn stat_from_sorted(sorted: &[f64], sum: f64) -> Stat {
    let (Some(min), Some(max)) = (sorted.first(), sorted.last()) else {
        return Stat::default();
    };
    let mean = (sum / sorted.len() as f64).clamp(*min, *max);
    Stat {
        mean,
        p90: quantile(sorted, P90),
        p95: quantile(sorted, P95),
        p99: quantile(sorted, P99),
    }
}
