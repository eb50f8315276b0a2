//! Display-side temperature conversion.
//!
//! The service already returns temperatures in the requested [`UnitMode`];
//! the display then converts them to the *opposite* unit. Metric data is shown
//! in Fahrenheit and imperial data in Celsius.

use crate::model::UnitMode;

/// Converts a stored temperature for display, rounded to 2 decimals.
pub fn convert(temperature: f64, mode: UnitMode) -> f64 {
    let value = match mode {
        UnitMode::Metric => temperature * 9.0 / 5.0 + 32.0,
        UnitMode::Imperial => (temperature - 32.0) * 5.0 / 9.0,
    };
    round_to(value, 2)
}

/// Unit letter printed next to a [`convert`]ed value.
pub fn display_symbol(mode: UnitMode) -> &'static str {
    match mode {
        UnitMode::Metric => "F",
        UnitMode::Imperial => "C",
    }
}

/// Wind speed is displayed as delivered, so the unit follows the request mode.
pub fn wind_unit(mode: UnitMode) -> &'static str {
    match mode {
        UnitMode::Metric => "m/s",
        UnitMode::Imperial => "mph",
    }
}

pub fn toggle_label(mode: UnitMode) -> &'static str {
    match mode {
        UnitMode::Metric => "Switch to °C",
        UnitMode::Imperial => "Switch to °F",
    }
}

/// Largest number of fractional digits in the exact expansion of an `f64`.
const MAX_EXACT_DIGITS: usize = 1074;

/// Rounds to `places` decimals like JavaScript's `toFixed`.
///
/// The decision is taken on the exact decimal expansion of `value`, so
/// `1.45` (stored as `1.4499999...`) rounds down. Exact ties round away from
/// zero, and the sign of small negative values is kept.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() || places >= MAX_EXACT_DIGITS {
        return value;
    }

    let exact = format!("{:.*}", MAX_EXACT_DIGITS, value.abs());
    let Some((int_part, frac_part)) = exact.split_once('.') else {
        return value;
    };

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .collect();
    if frac_part.as_bytes()[places] >= b'5' {
        increment_decimal(&mut digits);
    }

    let mut text = String::from_utf8_lossy(&digits).into_owned();
    if places > 0 {
        text.insert(text.len() - places, '.');
    }
    let rounded: f64 = text.parse().unwrap_or(value.abs());
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

/// Adds one unit in the last place to a string of ASCII digits.
fn increment_decimal(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_freezing_point_displays_as_fahrenheit() {
        assert_eq!(convert(0.0, UnitMode::Metric), 32.0);
        assert_eq!(convert(100.0, UnitMode::Metric), 212.0);
    }

    #[test]
    fn imperial_freezing_point_displays_as_celsius() {
        assert_eq!(convert(32.0, UnitMode::Imperial), 0.0);
        assert_eq!(convert(212.0, UnitMode::Imperial), 100.0);
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        assert_eq!(convert(21.37, UnitMode::Metric), 70.47);
        assert_eq!(convert(70.0, UnitMode::Imperial), 21.11);
    }

    #[test]
    fn round_trip_is_approximate() {
        let there = convert(17.3, UnitMode::Metric);
        let back = convert(there, UnitMode::Imperial);
        assert!((back - 17.3).abs() < 0.01);
    }

    #[test]
    fn symbols_are_inverted_relative_to_request_mode() {
        assert_eq!(display_symbol(UnitMode::Metric), "F");
        assert_eq!(display_symbol(UnitMode::Imperial), "C");
        assert_eq!(wind_unit(UnitMode::Metric), "m/s");
        assert_eq!(wind_unit(UnitMode::Imperial), "mph");
        assert_eq!(toggle_label(UnitMode::Metric), "Switch to °C");
    }

    #[test]
    fn round_to_uses_exact_binary_value() {
        // 1.45, 0.15 and 10.35 are stored slightly below the written value
        assert_eq!(round_to(1.45, 1), 1.4);
        assert_eq!(round_to(0.15, 1), 0.1);
        assert_eq!(round_to(10.35, 1), 10.3);
        assert_eq!(round_to(1.005, 2), 1.0);
    }

    #[test]
    fn round_to_breaks_exact_ties_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn round_to_carries_into_integer_part() {
        assert_eq!(round_to(9.96, 1), 10.0);
        assert_eq!(round_to(99.999, 2), 100.0);
        assert_eq!(round_to(-0.96, 1), -1.0);
    }

    #[test]
    fn round_to_keeps_sign_of_small_negatives() {
        let rounded = round_to(-0.001, 2);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_negative());
        assert_eq!(format!("{rounded:.2}"), "-0.00");
    }

    #[test]
    fn round_to_passes_non_finite_values_through() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }
}
