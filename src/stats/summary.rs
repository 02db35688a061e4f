/// Mean, sample standard deviation (ddof = 1) and count of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    /// NaN when fewer than two values were summarised.
    pub std: f64,
    pub n: usize,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
                n,
            };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return Self {
                mean,
                std: f64::NAN,
                n,
            };
        }
        let var = values
            .iter()
            .map(|v| {
                let d = *v - mean;
                d * d
            })
            .sum::<f64>()
            / (n as f64 - 1.0);
        Self {
            mean,
            std: var.max(0.0).sqrt(),
            n,
        }
    }

    /// Half-width of the error bar, or `None` when the spread is undefined.
    pub fn error(&self) -> Option<f64> {
        self.std.is_finite().then_some(self.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_std_uses_bessel_correction() {
        let s = Summary::of(&[1.0, 2.0, 3.0]);
        assert_eq!(s.n, 3);
        assert_relative_eq!(s.mean, 2.0);
        assert_relative_eq!(s.std, 1.0);
        assert_eq!(s.error(), Some(s.std));
    }

    #[test]
    fn single_value_has_undefined_spread() {
        let s = Summary::of(&[0.7]);
        assert_eq!(s.n, 1);
        assert_eq!(s.mean, 0.7);
        assert!(s.std.is_nan());
        assert_eq!(s.error(), None);
    }

    #[test]
    fn empty_group_is_nan() {
        let s = Summary::of(&[]);
        assert_eq!(s.n, 0);
        assert!(s.mean.is_nan());
    }
}
