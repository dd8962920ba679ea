//! Physical artwork dimensions and the free-text `"W × H cm"` form.
//!
//! The parser is deliberately outside the scene engine: the engine only ever
//! sees an already-validated [`DimensionsCm`] or nothing at all.

/// A real-world artwork size in centimeters. Both edges are finite and `> 0`
/// by construction when produced by [`parse_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionsCm {
    pub width_cm: f32,
    pub height_cm: f32,
}

impl DimensionsCm {
    #[must_use]
    pub fn long_edge(&self) -> f32 {
        self.width_cm.max(self.height_cm)
    }

    #[must_use]
    pub fn short_edge(&self) -> f32 {
        self.width_cm.min(self.height_cm)
    }
}

/// Parse a `"<number> × <number> cm"` string. The separator may be `×`, `x`,
/// or `X` and the numbers may carry a decimal part. Anything else yields
/// `None`, which downstream code treats identically to "no physical
/// dimensions provided".
#[must_use]
pub fn parse_dimensions(raw: &str) -> Option<DimensionsCm> {
    let lower = raw.trim().to_ascii_lowercase();
    let body = lower.strip_suffix("cm")?;
    let (left, right) = body.split_once(['×', 'x'])?;
    let width_cm = parse_cm_number(left)?;
    let height_cm = parse_cm_number(right)?;
    Some(DimensionsCm {
        width_cm,
        height_cm,
    })
}

// Accepts digits with an optional single fractional part: no signs,
// exponents, named values, or bare dots like "96." / ".5".
fn parse_cm_number(part: &str) -> Option<f32> {
    let part = part.trim();
    let (int, frac) = match part.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (part, None),
    };
    if int.is_empty() || !int.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(f) = frac {
        if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    let value: f32 = part.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_size() {
        let d = parse_dimensions("96 × 80 cm").unwrap();
        assert_eq!(d.width_cm, 96.0);
        assert_eq!(d.height_cm, 80.0);
    }

    #[test]
    fn accepts_ascii_separators_and_tight_spacing() {
        assert!(parse_dimensions("96x80cm").is_some());
        assert!(parse_dimensions("96 X 80 cm").is_some());
        assert!(parse_dimensions("  120.5 x 90 CM  ").is_some());
    }

    #[test]
    fn keeps_decimal_precision() {
        let d = parse_dimensions("120.5 x 90 cm").unwrap();
        assert!((d.width_cm - 120.5).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_garbage_and_partial_strings() {
        assert!(parse_dimensions("abc").is_none());
        assert!(parse_dimensions("96 cm").is_none());
        assert!(parse_dimensions("96 × 80").is_none());
        assert!(parse_dimensions("").is_none());
    }

    #[test]
    fn rejects_bare_and_repeated_decimal_points() {
        assert!(parse_dimensions("96. x 80 cm").is_none());
        assert!(parse_dimensions(".5 x 80 cm").is_none());
        assert!(parse_dimensions("1.2.3 x 80 cm").is_none());
        assert!(parse_dimensions("96 x . cm").is_none());
    }

    #[test]
    fn rejects_non_positive_and_signed_values() {
        assert!(parse_dimensions("0 x 10 cm").is_none());
        assert!(parse_dimensions("-5 x 10 cm").is_none());
        assert!(parse_dimensions("+5 x 10 cm").is_none());
        assert!(parse_dimensions("inf x 10 cm").is_none());
    }

    #[test]
    fn long_and_short_edges() {
        let d = parse_dimensions("80 x 96 cm").unwrap();
        assert_eq!(d.long_edge(), 96.0);
        assert_eq!(d.short_edge(), 80.0);
    }
}
