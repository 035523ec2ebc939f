//! Integration tests for fitting the built-in models.

use approx::assert_relative_eq;
use lmmc_rs::models::enzyme;
use lmmc_rs::{
    DataSet, Deviations, FitProblem, FitStatus, LevenbergMarquardt, LmmcError, ModelFunction,
    ModelRegistry, ParameterMask,
};
use ndarray::{array, Array1};

fn michaelis_data() -> (DataSet, Array1<f64>) {
    let data = DataSet::from_points(&[1.0, 2.0, 5.0, 10.0, 20.0]).unwrap();
    let y = data.evaluate(&enzyme::MICHAELIS, &[10.0, 5.0]);
    (data, y)
}

/// Substrate × inhibitor grid.
fn inhibition_grid() -> DataSet {
    let mut s = Vec::new();
    let mut i = Vec::new();
    for &sv in &[0.5, 1.0, 2.0, 5.0, 10.0, 20.0] {
        for &iv in &[0.0, 1.0, 3.0] {
            s.push(sv);
            i.push(iv);
        }
    }
    DataSet::from_columns(&[s, i]).unwrap()
}

#[test]
fn test_michaelis_noiseless_response() {
    let (_, y) = michaelis_data();
    let expected = [10.0 / 6.0, 20.0 / 7.0, 5.0, 20.0 / 3.0, 8.0];
    for (got, want) in y.iter().zip(expected.iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-12);
    }
}

#[test]
fn test_michaelis_recovers_parameters() {
    let (data, y) = michaelis_data();
    let problem = FitProblem::new(&enzyme::MICHAELIS, &data, &y).unwrap();
    let lm = LevenbergMarquardt::new();

    let fit = lm
        .fit(&problem, &array![8.0, 3.0], &ParameterMask::all_free(2))
        .unwrap();

    assert!(fit.status.is_converged(), "status: {:?}", fit.status);
    assert_relative_eq!(fit.params[0], 10.0, epsilon = 1e-6);
    assert_relative_eq!(fit.params[1], 5.0, epsilon = 1e-6);
    assert!(fit.chi_square < 1e-12);
    assert_eq!(fit.covariance.dim(), (2, 2));
}

#[test]
fn test_michaelis_from_exact_parameters_stops_after_one_step() {
    let (data, y) = michaelis_data();
    let problem = FitProblem::new(&enzyme::MICHAELIS, &data, &y).unwrap();

    let fit = LevenbergMarquardt::new()
        .fit(&problem, &array![10.0, 5.0], &ParameterMask::all_free(2))
        .unwrap();

    assert_eq!(fit.iterations, 1);
    assert_eq!(fit.status, FitStatus::PerfectFit);
    assert_eq!(fit.chi_square, 0.0);
    assert_eq!(fit.params[0], 10.0);
    assert_eq!(fit.params[1], 5.0);
    assert!(fit.covariance.iter().all(|c| c.is_finite()));
}

#[test]
fn test_fixed_parameter_keeps_its_value() {
    let (data, y) = michaelis_data();
    let problem = FitProblem::new(&enzyme::MICHAELIS, &data, &y).unwrap();
    let mask = ParameterMask::from_fixed(enzyme::MICHAELIS.parameter_names(), &["Km"]).unwrap();

    let fit = LevenbergMarquardt::new()
        .fit(&problem, &array![7.0, 5.0], &mask)
        .unwrap();

    assert_eq!(fit.params[1], 5.0);
    assert_relative_eq!(fit.params[0], 10.0, epsilon = 1e-6);
    assert_eq!(fit.covariance.dim(), (1, 1));
}

#[test]
fn test_competitive_inhibition_from_offset_guess() {
    let data = inhibition_grid();
    let truth = [10.0, 2.0, 1.5];
    let y = data.evaluate(&enzyme::COMPETITIVE, &truth);
    let problem = FitProblem::new(&enzyme::COMPETITIVE, &data, &y).unwrap();

    let fit = LevenbergMarquardt::new()
        .fit(&problem, &array![8.0, 2.5, 1.2], &ParameterMask::all_free(3))
        .unwrap();

    for (got, want) in fit.params.iter().zip(truth.iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-6);
    }
}

#[test]
fn test_known_deviations_scale_covariance() {
    let (data, y) = michaelis_data();
    // fixed perturbation so the residuals are not zero
    let observed: Array1<f64> = y
        .iter()
        .zip([0.02, -0.03, 0.01, 0.04, -0.02].iter())
        .map(|(v, e)| v + e)
        .collect();

    let lm = LevenbergMarquardt::new();
    let mask = ParameterMask::all_free(2);
    let guess = array![10.0, 5.0];

    let narrow = FitProblem::new(&enzyme::MICHAELIS, &data, &observed)
        .unwrap()
        .with_deviations(Deviations::Uniform(0.1))
        .unwrap();
    let wide = FitProblem::new(&enzyme::MICHAELIS, &data, &observed)
        .unwrap()
        .with_deviations(Deviations::Uniform(0.2))
        .unwrap();

    let a = lm.fit(&narrow, &guess, &mask).unwrap();
    let b = lm.fit(&wide, &guess, &mask).unwrap();

    // same minimizer, covariance grows with σ²
    assert_relative_eq!(a.params[0], b.params[0], epsilon = 1e-8);
    assert_relative_eq!(a.params[1], b.params[1], epsilon = 1e-8);
    assert_relative_eq!(b.covariance[[0, 0]], 4.0 * a.covariance[[0, 0]], max_relative = 1e-6);
    assert_relative_eq!(b.covariance[[1, 1]], 4.0 * a.covariance[[1, 1]], max_relative = 1e-6);
}

#[test]
fn test_per_point_deviations_validated() {
    let (data, y) = michaelis_data();
    let short = array![0.1, 0.1];
    let result = FitProblem::new(&enzyme::MICHAELIS, &data, &y)
        .unwrap()
        .with_deviations(Deviations::PerPoint(&short));
    assert!(matches!(result, Err(LmmcError::DimensionMismatch(_))));

    let with_zero = array![0.1, 0.1, 0.0, 0.1, 0.1];
    let result = FitProblem::new(&enzyme::MICHAELIS, &data, &y)
        .unwrap()
        .with_deviations(Deviations::PerPoint(&with_zero));
    assert!(matches!(result, Err(LmmcError::InvalidConfiguration(_))));
}

#[test]
fn test_registry_models_evaluate_at_reference_parameters() {
    let registry = ModelRegistry::builtin();
    assert_eq!(registry.len(), 10);

    for name in registry.names() {
        let model = registry.lookup(name).unwrap();
        let point: Vec<f64> = vec![2.0; model.nvars()];
        let params: Vec<f64> = vec![1.5; model.nparams()];
        let v = model.evaluate(&point, &params);
        assert!(v.is_finite() && v > 0.0, "{} gave {}", name, v);
    }

    assert!(matches!(
        registry.lookup("hill"),
        Err(LmmcError::UnknownModel(_))
    ));
}

#[test]
fn test_iteration_cap_is_a_status() {
    let (data, y) = michaelis_data();
    let problem = FitProblem::new(&enzyme::MICHAELIS, &data, &y).unwrap();
    let fit = LevenbergMarquardt::new()
        .with_max_iterations(1)
        .fit(&problem, &array![2.0, 1.0], &ParameterMask::all_free(2))
        .unwrap();

    assert_eq!(fit.iterations, 1);
    assert_eq!(fit.status, FitStatus::MaxIterations);
}
