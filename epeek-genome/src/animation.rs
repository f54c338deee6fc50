//! Fixed-step domain animation for panning and zooming.

/// Easing curve applied to the animation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    CubicInOut,
}

impl Ease {
    /// Eased value of `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
        }
    }
}

/// Clock increment per tick.
pub const STEP: f64 = 0.02;

/// Kind of domain move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Zoom,
}

/// An in-progress interpolation between two genomic domains.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainAnimation {
    from: (f64, f64),
    to: (f64, f64),
    ease: Ease,
    clock: f64,
}

impl DomainAnimation {
    pub fn new(from: (f64, f64), to: (f64, f64), ease: Ease) -> Self {
        Self {
            from,
            to,
            ease,
            clock: 0.0,
        }
    }

    pub fn target(&self) -> (f64, f64) {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.clock > 1.0
    }

    /// Domain at the current clock, then advance the clock by one step.
    pub fn tick(&mut self) -> (f64, f64) {
        let k = self.ease.apply(self.clock);
        let lerp = |a: f64, b: f64| a + (b - a) * k;
        let domain = (lerp(self.from.0, self.to.0), lerp(self.from.1, self.to.1));
        self.clock += STEP;
        domain
    }
}

/// Target domain of a move by `factor` over `domain`.
///
/// Panning shifts the window by `span * (factor - 1)`. Zooming by a factor
/// above 1 narrows the window around its centre; below 1 widens it.
pub fn target_domain(domain: (f64, f64), factor: f64, motion: Motion) -> (f64, f64) {
    let (start, end) = domain;
    let span = end - start;
    match motion {
        Motion::Left => {
            let offset = span * factor - span;
            (start - offset, end - offset)
        }
        Motion::Right => {
            let offset = span * factor - span;
            (start + offset, end + offset)
        }
        Motion::Zoom => {
            let new_span = span / factor;
            let centre = start + span / 2.0;
            (centre - new_span / 2.0, centre + new_span / 2.0)
        }
    }
}
