//! Enzyme kinetics rate equations.
//!
//! Every function takes the independent variables first (concentrations,
//! temperature or time) and the parameter vector second, in the order
//! declared by the matching [`Model`] constant.

use crate::model::Model;

/// Gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.3144621;

/// Michaelis-Menten: `v = Vmax·S / (Km + S)`
pub fn michaelis(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] / (p[1] + x[0])
}

/// Alberty bisubstrate equation:
/// `v = Vmax·A·B / (KmA·B + KmB·A + A·B + KsA·KmB)`
pub fn alberty(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] * x[1] / (p[1] * x[1] + p[2] * x[0] + x[0] * x[1] + p[3] * p[2])
}

/// Double displacement (ping-pong): Alberty without the constant term.
pub fn pingpong(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] * x[1] / (p[1] * x[1] + p[2] * x[0] + x[0] * x[1])
}

/// Mixed inhibition: `v = Vmax·S / (Km(1 + I/KIa) + S(1 + I/KIb))`
pub fn mixed(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] / (p[1] * (1.0 + x[1] / p[2]) + x[0] * (1.0 + x[1] / p[3]))
}

/// Competitive inhibition (mixed with KIb → ∞).
pub fn competitive(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] / (p[1] * (1.0 + x[1] / p[2]) + x[0])
}

/// Uncompetitive inhibition (mixed with KIa → ∞).
pub fn uncompetitive(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] / (p[1] + x[0] * (1.0 + x[1] / p[2]))
}

/// Non-competitive inhibition (mixed with KIa = KIb).
pub fn noncompetitive(x: &[f64], p: &[f64]) -> f64 {
    p[0] * x[0] / ((p[1] + x[0]) * (1.0 + x[1] / p[2]))
}

/// pH dependence with two ionizations on the free enzyme and two on the complex.
pub fn ph(x: &[f64], p: &[f64]) -> f64 {
    let (s, h) = (x[0], x[1]);
    p[0] * s / (p[1] * (1.0 + h / p[2] + p[4] / h) + s * (1.0 + h / p[3] + p[5] / h))
}

/// Michaelis-Menten with an Arrhenius factor relative to the reference
/// temperature `T1` at which `Vmax` is measured. `T1` is normally kept fixed.
pub fn michaelistemp(x: &[f64], p: &[f64]) -> f64 {
    let (s, t) = (x[0], x[1]);
    s * p[0] * (-p[2] / GAS_CONSTANT * (1.0 / p[3] - 1.0 / t)).exp() / (p[1] + s)
}

/// Michaelis-Menten with first order thermal inactivation of the enzyme.
pub fn michaelis_inactiv(x: &[f64], p: &[f64]) -> f64 {
    let (s, t) = (x[0], x[1]);
    s * p[0] * (-p[2] * t).exp() / (p[1] + s)
}

pub const MICHAELIS: Model = Model::new("michaelis", &["Vmax", "Km"], &["S"], michaelis);
pub const ALBERTY: Model = Model::new(
    "alberty",
    &["Vmax", "KmA", "KmB", "KsA"],
    &["A", "B"],
    alberty,
);
pub const PINGPONG: Model = Model::new("pingpong", &["Vmax", "KmA", "KmB"], &["A", "B"], pingpong);
pub const MIXED: Model = Model::new("mixed", &["Vmax", "Km", "KIa", "KIb"], &["S", "I"], mixed);
pub const COMPETITIVE: Model = Model::new(
    "competitive",
    &["Vmax", "Km", "KIa"],
    &["S", "I"],
    competitive,
);
pub const UNCOMPETITIVE: Model = Model::new(
    "uncompetitive",
    &["Vmax", "Km", "KIb"],
    &["S", "I"],
    uncompetitive,
);
pub const NONCOMPETITIVE: Model = Model::new(
    "noncompetitive",
    &["Vmax", "Km", "KIb"],
    &["S", "I"],
    noncompetitive,
);
pub const PH: Model = Model::new(
    "ph",
    &["Vmax", "Km", "Ka1", "Ka2", "Ka3", "Ka4"],
    &["S", "H"],
    ph,
);
pub const MICHAELIS_TEMP: Model = Model::new(
    "michaelistemp",
    &["Vmax", "Km", "Ea", "T1"],
    &["S", "T"],
    michaelistemp,
);
pub const MICHAELIS_INACTIV: Model = Model::new(
    "michaelis_inactiv",
    &["Vmax", "Km", "kt"],
    &["S", "t"],
    michaelis_inactiv,
);

/// All enzyme models, in registry order.
pub const ALL: [Model; 10] = [
    MICHAELIS,
    ALBERTY,
    PINGPONG,
    MIXED,
    COMPETITIVE,
    UNCOMPETITIVE,
    NONCOMPETITIVE,
    PH,
    MICHAELIS_TEMP,
    MICHAELIS_INACTIV,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelFunction;
    use approx::assert_relative_eq;

    #[test]
    fn test_michaelis_half_saturation() {
        // v = Vmax/2 at S = Km
        assert_relative_eq!(michaelis(&[5.0], &[10.0, 5.0]), 5.0);
        assert_relative_eq!(michaelis(&[1.0], &[10.0, 5.0]), 10.0 / 6.0);
    }

    #[test]
    fn test_inhibitors_reduce_to_michaelis_without_inhibitor() {
        let s = [4.0, 0.0];
        let mm = michaelis(&s[..1], &[10.0, 2.0]);
        assert_relative_eq!(competitive(&s, &[10.0, 2.0, 1.5]), mm);
        assert_relative_eq!(uncompetitive(&s, &[10.0, 2.0, 1.5]), mm);
        assert_relative_eq!(noncompetitive(&s, &[10.0, 2.0, 1.5]), mm);
        assert_relative_eq!(mixed(&s, &[10.0, 2.0, 1.5, 3.0]), mm);
    }

    #[test]
    fn test_temperature_model_at_reference_temperature() {
        // T = T1 cancels the Arrhenius factor
        let v = michaelistemp(&[4.0, 298.15], &[10.0, 2.0, 50_000.0, 298.15]);
        assert_relative_eq!(v, michaelis(&[4.0], &[10.0, 2.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_inactivation_decays() {
        let v0 = michaelis_inactiv(&[4.0, 0.0], &[10.0, 2.0, 0.1]);
        let v10 = michaelis_inactiv(&[4.0, 10.0], &[10.0, 2.0, 0.1]);
        assert_relative_eq!(v10, v0 * (-1.0f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_descriptor_cardinalities() {
        for model in ALL.iter() {
            assert!(model.nparams() >= 2, "{} has too few parameters", model.name());
            assert_eq!(model.parameter_count(), Some(model.nparams()));
        }
        assert_eq!(PH.nparams(), 6);
        assert_eq!(ALBERTY.nvars(), 2);
    }
}
