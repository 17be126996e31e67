/// Piecewise-linear float curve, clamped at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    keys: Vec<(f32, f32)>,
}

impl ResponseCurve {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn constant(value: f32) -> Self {
        Self::new().with_key(0.0, value)
    }

    /// Adds a key, keeping keys sorted by input.
    pub fn with_key(mut self, input: f32, output: f32) -> Self {
        let at = self.keys.partition_point(|&(x, _)| x < input);
        self.keys.insert(at, (input, output));
        self
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Evaluates the curve; an empty curve evaluates to 1.
    pub fn eval(&self, input: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 1.0,
        };

        if input <= first.0 {
            return first.1;
        }
        if input >= last.0 {
            return last.1;
        }

        let upper = self.keys.partition_point(|&(x, _)| x <= input);
        let (x0, y0) = self.keys[upper - 1];
        let (x1, y1) = self.keys[upper];
        let span = x1 - x0;
        if span <= f32::EPSILON {
            return y1;
        }
        y0 + (y1 - y0) * ((input - x0) / span)
    }
}

impl Default for ResponseCurve {
    /// Full rate at rest, half rate at 100 units/s.
    fn default() -> Self {
        Self::new().with_key(0.0, 1.0).with_key(100.0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_curve_halves_at_speed() {
        let curve = ResponseCurve::default();
        assert_relative_eq!(curve.eval(0.0), 1.0);
        assert_relative_eq!(curve.eval(50.0), 0.75);
        assert_relative_eq!(curve.eval(100.0), 0.5);
        assert_relative_eq!(curve.eval(1000.0), 0.5);
        assert_relative_eq!(curve.eval(-5.0), 1.0);
    }

    #[test]
    fn keys_are_sorted_on_insert() {
        let curve = ResponseCurve::new().with_key(10.0, 2.0).with_key(0.0, 0.0);
        assert_eq!(curve.keys(), &[(0.0, 0.0), (10.0, 2.0)]);
        assert_relative_eq!(curve.eval(5.0), 1.0);
    }

    #[test]
    fn empty_curve_is_neutral() {
        assert_relative_eq!(ResponseCurve::new().eval(42.0), 1.0);
        assert_relative_eq!(ResponseCurve::constant(3.0).eval(42.0), 3.0);
    }
}
