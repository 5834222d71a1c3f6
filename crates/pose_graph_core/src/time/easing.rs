use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Shape of a blend curve. Every easing maps `0` to `0` and `1` to `1`; inputs are clamped to
/// that range first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    /// Jumps straight to 1 as soon as the input is positive.
    Constant,
    #[default]
    Linear,
    In(EasingCurve),
    Out(EasingCurve),
    InOut(EasingCurve),
}

/// Base curves, expressed as their ease-in form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EasingCurve {
    Sine,
    Quad,
    Cubic,
    Quart,
    Expo,
    Circ,
    Back,
    /// Oscillating curve; `springiness` controls how quickly the oscillation grows.
    Elastic { oscillations: f32, springiness: f32 },
}

impl Easing {
    pub const SINE_IN_OUT: Self = Self::InOut(EasingCurve::Sine);
    pub const CUBIC_IN_OUT: Self = Self::InOut(EasingCurve::Cubic);

    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0., 1.);
        match self {
            Easing::Constant => {
                if t > 0. {
                    1.
                } else {
                    0.
                }
            }
            Easing::Linear => t,
            Easing::In(curve) => curve.ease_in(t),
            Easing::Out(curve) => 1. - curve.ease_in(1. - t),
            Easing::InOut(curve) => {
                if t < 0.5 {
                    curve.ease_in(2. * t) / 2.
                } else {
                    1. - curve.ease_in(2. - 2. * t) / 2.
                }
            }
        }
    }
}

impl EasingCurve {
    const BACK_OVERSHOOT: f32 = 1.70158;

    fn ease_in(&self, t: f32) -> f32 {
        match *self {
            EasingCurve::Sine => 1. - (t * FRAC_PI_2).cos(),
            EasingCurve::Quad => t * t,
            EasingCurve::Cubic => t * t * t,
            EasingCurve::Quart => t * t * t * t,
            EasingCurve::Expo => {
                if t == 0. {
                    0.
                } else {
                    2f32.powf(10. * t - 10.)
                }
            }
            EasingCurve::Circ => 1. - (1. - t * t).max(0.).sqrt(),
            EasingCurve::Back => {
                let c1 = Self::BACK_OVERSHOOT;
                (c1 + 1.) * t * t * t - c1 * t * t
            }
            EasingCurve::Elastic {
                oscillations,
                springiness,
            } => {
                let growth = if springiness == 0. {
                    t
                } else {
                    ((springiness * t).exp() - 1.) / (springiness.exp() - 1.)
                };
                growth * ((2. * PI * oscillations.max(0.) + FRAC_PI_2) * t).sin()
            }
        }
    }
}
