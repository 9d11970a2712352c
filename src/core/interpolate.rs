//! Monotone piecewise cubic Hermite interpolation (Fritsch–Carlson, PCHIP).

#[derive(Debug, Clone)]
pub struct Pchip {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

impl Pchip {
    /// Builds the interpolant. `xs` must be strictly increasing. Returns `None`
    /// without at least one point.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Option<Self> {
        let n = xs.len();
        if n == 0 || n != ys.len() {
            return None;
        }
        if n == 1 {
            return Some(Self {
                xs,
                ys,
                slopes: vec![0.0],
            });
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

        let mut slopes = vec![0.0; n];
        if n == 2 {
            slopes[0] = delta[0];
            slopes[1] = delta[0];
            return Some(Self { xs, ys, slopes });
        }

        for k in 1..n - 1 {
            let (d0, d1) = (delta[k - 1], delta[k]);
            if d0 == 0.0 || d1 == 0.0 || d0.signum() != d1.signum() {
                slopes[k] = 0.0;
            } else {
                let w1 = 2.0 * h[k] + h[k - 1];
                let w2 = h[k] + 2.0 * h[k - 1];
                slopes[k] = (w1 + w2) / (w1 / d0 + w2 / d1);
            }
        }
        slopes[0] = edge_slope(h[0], h[1], delta[0], delta[1]);
        slopes[n - 1] = edge_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);

        Some(Self { xs, ys, slopes })
    }

    /// Value at `x`. Outside the known range the nearest end value is held.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        let k = self.xs.partition_point(|&xk| xk <= x) - 1;
        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[k] + h10 * h * self.slopes[k] + h01 * self.ys[k + 1] + h11 * h * self.slopes[k + 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_knots() {
        let pchip = Pchip::new(vec![0.0, 1.0, 2.0, 4.0], vec![0.0, 2.0, 3.0, 3.5]).unwrap();
        assert!((pchip.evaluate(1.0) - 2.0).abs() < 1e-12);
        assert!((pchip.evaluate(2.0) - 3.0).abs() < 1e-12);
        assert!((pchip.evaluate(4.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_preserves_monotonicity_and_plateaus() {
        let pchip = Pchip::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 0.0, 10.0, 10.0]).unwrap();
        let mut previous = pchip.evaluate(0.0);
        for i in 1..=30 {
            let value = pchip.evaluate(i as f64 * 0.1);
            assert!(value >= previous - 1e-12);
            assert!((-1e-12..=10.0 + 1e-12).contains(&value));
            previous = value;
        }
        // flat segments stay flat; no overshoot below zero at night
        assert_eq!(pchip.evaluate(0.5), 0.0);
        assert_eq!(pchip.evaluate(2.5), 10.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(Pchip::new(vec![], vec![]).is_none());
        let single = Pchip::new(vec![5.0], vec![7.0]).unwrap();
        assert_eq!(single.evaluate(0.0), 7.0);
        assert_eq!(single.evaluate(10.0), 7.0);

        let linear = Pchip::new(vec![0.0, 2.0], vec![0.0, 4.0]).unwrap();
        assert!((linear.evaluate(1.0) - 2.0).abs() < 1e-12);
    }
}
