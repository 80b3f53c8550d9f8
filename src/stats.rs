// ------------------------------------------------------------
// Per-frame statistic series and the overlay text built from them
// ------------------------------------------------------------

use crate::error::{Result, VizError};

/// Number of decimal places kept in the overlay.
pub const OVERLAY_DECIMALS: i32 = 3;

/// A labelled scalar series, one value per frame.
#[derive(Debug, Clone)]
pub struct Statistic {
    pub label: String,
    pub values: Vec<f64>,
}

impl Statistic {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn value_at(&self, frame: usize) -> Result<f64> {
        self.values
            .get(frame)
            .copied()
            .ok_or_else(|| VizError::StatisticOutOfRange {
                label: self.label.clone(),
                frame,
                len: self.values.len(),
            })
    }
}

// Correctly rounded at OVERLAY_DECIMALS places (ties to even on the exact
// binary value). Non-finite input is returned unchanged.
pub fn round_for_overlay(value: f64) -> f64 {
    format!("{:.*}", OVERLAY_DECIMALS as usize, value)
        .parse()
        .unwrap_or(value)
}

// Shortest round-trip form with a signed, two-digit exponent (`1e+16`,
// `2.5e-05`) and lowercase `nan`.
pub fn format_overlay_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// Overlay text for `frame`: one `"label:  value\n"` line per statistic in
/// input order. Values print in their shortest form after rounding, so
/// `1.5` stays `1.5`, `2` prints as `2.0` and `1e16` as `1e+16`.
pub fn overlay_text(stats: &[Statistic], frame: usize) -> Result<String> {
    let mut text = String::new();
    for stat in stats {
        let value = round_for_overlay(stat.value_at(frame)?);
        text.push_str(&format!("{}:  {}\n", stat.label, format_overlay_value(value)));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_rounds_to_three_places() {
        let stats = vec![Statistic::new("E", vec![1.23456])];
        assert_eq!(overlay_text(&stats, 0).unwrap(), "E:  1.235\n");
    }

    #[test]
    fn overlay_keeps_input_order_one_line_each() {
        let stats = vec![
            Statistic::new("E", vec![0.0, 10.0004]),
            Statistic::new("theta", vec![0.0, -0.5]),
            Statistic::new("t", vec![0.0, 2.0]),
        ];
        assert_eq!(
            overlay_text(&stats, 1).unwrap(),
            "E:  10.0\ntheta:  -0.5\nt:  2.0\n"
        );
    }

    #[test]
    fn overlay_is_empty_without_statistics() {
        assert_eq!(overlay_text(&[], 7).unwrap(), "");
    }

    #[test]
    fn short_series_fails_at_missing_frame() {
        let stats = vec![Statistic::new("E", vec![1.0, 2.0])];
        assert!(overlay_text(&stats, 1).is_ok());
        match overlay_text(&stats, 2) {
            Err(VizError::StatisticOutOfRange { label, frame, len }) => {
                assert_eq!(label, "E");
                assert_eq!(frame, 2);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn ties_round_to_even_on_exact_value() {
        let stats = vec![Statistic::new("v", vec![0.0625, 1.0005, 2.675, -0.0004])];
        let at = |i| overlay_text(&stats_at(&stats, i), 0).unwrap();
        assert_eq!(at(0), "v:  0.062\n");
        assert_eq!(at(1), "v:  1.0\n");
        assert_eq!(at(2), "v:  2.675\n");
        assert_eq!(at(3), "v:  -0.0\n");
    }

    fn stats_at(stats: &[Statistic], i: usize) -> Vec<Statistic> {
        stats
            .iter()
            .map(|s| Statistic::new(s.label.clone(), vec![s.values[i]]))
            .collect()
    }

    #[test]
    fn large_values_use_signed_exponent() {
        assert_eq!(format_overlay_value(1e16), "1e+16");
        assert_eq!(format_overlay_value(1.25e20), "1.25e+20");
        assert_eq!(format_overlay_value(2.5e-5), "2.5e-05");
        assert_eq!(format_overlay_value(-3e300), "-3e+300");
        assert_eq!(format_overlay_value(123.5), "123.5");
        assert_eq!(format_overlay_value(f64::NAN), "nan");
        assert_eq!(format_overlay_value(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn huge_values_are_not_scaled() {
        assert_eq!(round_for_overlay(1e308), 1e308);
        assert!(round_for_overlay(f64::NAN).is_nan());
    }
}
