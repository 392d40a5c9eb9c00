#![forbid(unsafe_code)]

//! Value and percentage text.

/// Value to text.
pub type ValueFormatter<'a> = &'a dyn Fn(f64) -> String;

/// Default value text: shortest round-trip form, `-0` printed as `0`.
#[must_use]
pub fn default_value_text(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    value.to_string()
}

/// Apply `formatter` or fall back to [`default_value_text`].
#[must_use]
pub fn value_text(value: f64, formatter: Option<ValueFormatter<'_>>) -> String {
    formatter.map_or_else(|| default_value_text(value), |f| f(value))
}

/// Round to the nearest integer, halves towards positive infinity.
///
/// `50.5` becomes `51` and `-2.5` becomes `-2`.
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// `value / parent` as a whole-number percentage, e.g. `"33%"`.
#[must_use]
pub fn percentage_text(value: f64, parent: f64) -> String {
    let pct = round_half_up(value / parent * 100.0);
    let pct = if pct == 0.0 { 0.0 } else { pct };
    format!("{pct}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(50.5), 51.0);
        assert_eq!(round_half_up(50.49), 50.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn percentages_are_whole_numbers() {
        assert_eq!(percentage_text(1.0, 3.0), "33%");
        assert_eq!(percentage_text(2.0, 3.0), "67%");
        assert_eq!(percentage_text(1.0, 2.0), "50%");
        assert_eq!(percentage_text(5.0, 5.0), "100%");
    }

    #[test]
    fn missing_parent_reads_nan() {
        assert_eq!(percentage_text(1.0, f64::NAN), "NaN%");
    }

    #[test]
    fn value_text_prefers_formatter() {
        let fmt = |v: f64| format!("${v:.2}");
        assert_eq!(value_text(3.0, Some(&fmt)), "$3.00");
        assert_eq!(value_text(3.0, None), "3");
        assert_eq!(value_text(2.5, None), "2.5");
        assert_eq!(value_text(-0.0, None), "0");
    }
}
