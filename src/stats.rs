//! Shared numeric helpers
//!
//! Every score, delta and percentage goes through [`round_score`] so that
//! values derived from the same intermediates always round the same way.

/// Round to the nearest integer, halves toward positive infinity
pub fn round_score(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the present values only; `None` when nothing is present
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    mean(&present)
}
