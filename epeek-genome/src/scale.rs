//! Genomic-coordinate to screen-pixel mapping.

/// A mapping from genomic coordinates to screen pixels.
///
/// Any `Fn(f64) -> f64` is a scale, so tests and callers can pass closures.
pub trait Scale {
    fn apply(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> Scale for F {
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Linear scale from a `[d0, d1]` domain onto a `[r0, r1]` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    /// Map a pixel back to a genomic coordinate.
    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (y - r0) * (d1 - d0) / (r1 - r0)
    }
}

impl Scale for LinearScale {
    fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (x - d0) * (r1 - r0) / (d1 - d0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints() {
        let s = LinearScale::new((1000.0, 2000.0), (0.0, 600.0));
        assert_eq!(s.apply(1000.0), 0.0);
        assert_eq!(s.apply(2000.0), 600.0);
        assert_eq!(s.apply(1500.0), 300.0);
    }

    #[test]
    fn invert_round_trips() {
        let s = LinearScale::new((1000.0, 2000.0), (0.0, 600.0));
        assert!((s.invert(s.apply(1234.0)) - 1234.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_domain() {
        let s = LinearScale::new((5.0, 5.0), (10.0, 20.0));
        assert_eq!(s.apply(7.0), 10.0);
    }

    #[test]
    fn closures_are_scales() {
        let double = |x: f64| x * 2.0;
        assert_eq!(double.apply(4.0), 8.0);
    }
}
