use crate::error::AnalyticsError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Arithmetic mean of `values`; None when there are no values or the sum
/// does not fit in a `Decimal`.
pub fn mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut sum = Decimal::ZERO;
    let mut count = 0u64;
    for value in values {
        let Some(next) = sum.checked_add(value) else {
            tracing::warn!(count, "Mean left undefined: sum overflowed.");
            return None;
        };
        sum = next;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    sum.checked_div(Decimal::from(count))
}

/// The `q`-th quantile of `values` (`q` in 0..=1), interpolating linearly
/// between the two nearest order statistics.
///
/// Returns `Ok(None)` for an empty input.
pub fn percentile(values: &[Decimal], q: Decimal) -> Result<Option<Decimal>, AnalyticsError> {
    if q < Decimal::ZERO || q > Decimal::ONE {
        return Err(AnalyticsError::InvalidQuantile(q));
    }
    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let last = sorted.len() - 1;
    let position = Decimal::from(last) * q;
    let lower = position.floor();
    let index = lower
        .to_usize()
        .ok_or_else(|| AnalyticsError::Calculation(format!("quantile position {position} out of range")))?;
    if index >= last {
        return Ok(Some(sorted[last]));
    }

    let fraction = position - lower;
    sorted[index + 1]
        .checked_sub(sorted[index])
        .and_then(|gap| gap.checked_mul(fraction))
        .and_then(|step| sorted[index].checked_add(step))
        .map(Some)
        .ok_or_else(|| AnalyticsError::Calculation("quantile interpolation overflowed".to_string()))
}
