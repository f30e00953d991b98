use cosmwasm_std::{Int128, Int256, Isqrt, Uint128, Uint256};
use pulse_common::Decimal;

use crate::state::{Summary, UpdateEntry};

fn int256_to_decimal(v: Int256) -> Option<Decimal> {
    Int128::try_from(v).ok().map(|x| Decimal::from_i128(x.i128()))
}

/// Population statistics over the populated window.
///
/// Returns `None` for an empty window or when intermediate arithmetic
/// leaves the representable domain; the caller keeps the previous summary
/// in that case. The median of an even-sized sample is the lower of the
/// two middle values. Mean and variance use integer division truncating
/// toward zero.
pub fn compute_summary(entries: &[UpdateEntry]) -> Option<Summary> {
    if entries.is_empty() {
        return None;
    }

    let mut values: Vec<i128> = Vec::with_capacity(entries.len());
    for entry in entries {
        values.push(entry.result.to_i128()?);
    }
    values.sort_unstable();

    let n = values.len();
    let count = Int256::from(n as u64);
    let min = values[0];
    let max = values[n - 1];
    let median = values[(n - 1) / 2];

    let mut sum = Int256::zero();
    for v in &values {
        sum = sum.checked_add(Int256::from(*v)).ok()?;
    }
    let mean = sum / count;

    let mut squares = Int256::zero();
    for v in &values {
        let d = Int256::from(*v).checked_sub(mean).ok()?;
        squares = squares.checked_add(d.checked_mul(d).ok()?).ok()?;
    }
    let variance = Uint256::try_from(squares / count).ok()?;
    let stdev: u128 = Uint128::try_from(variance.isqrt()).ok()?.u128();

    let range_wide = Int256::from(max) - Int256::from(min);
    let range: u128 = Uint128::try_from(Uint256::try_from(range_wide).ok()?)
        .ok()?
        .u128();

    let min_timestamp_ms = entries.iter().map(|e| e.timestamp_ms).min()?;
    let max_timestamp_ms = entries.iter().map(|e| e.timestamp_ms).max()?;

    Some(Summary {
        result: Decimal::from_i128(median),
        mean: int256_to_decimal(mean)?,
        range: Decimal::new(range, false),
        stdev: Decimal::new(stdev, false),
        min_result: Decimal::from_i128(min),
        max_result: Decimal::from_i128(max),
        min_timestamp_ms,
        max_timestamp_ms,
    })
}
