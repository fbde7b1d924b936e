// In tests/pca_properties.rs

use approx::assert_abs_diff_eq;
use eigen_pca::decompose::{center, scatter_matrix};
use eigen_pca::diagnostics::{orthogonality_error, rayleigh_quotients, reconstruction_mse};
use eigen_pca::{PcaError, PCA};
use ndarray::{array, Array1, Array2, Axis};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TOL: f64 = 1e-9;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Gaussian data with clearly separated per-feature spreads, lightly mixed,
/// so the scatter matrix has distinct eigenvalues.
fn generate_structured_data(n_samples: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let raw: Array2<f64> = Array2::random_using((n_samples, n_features), Normal::<f64>::new(0.0, 1.0).unwrap(), &mut rng);
    let scales = Array1::from_shape_fn(n_features, |j| (n_features - j) as f64 * 1.5);
    let mixing = Array2::<f64>::random_using((n_features, n_features), Normal::<f64>::new(0.0, 0.1).unwrap(), &mut rng)
        + Array2::<f64>::eye(n_features);
    let offset = Array1::from_shape_fn(n_features, |j| 10.0 * j as f64 - 3.0);
    (raw * &scales).dot(&mixing) + &offset
}

fn random_unit_vector(n: usize, rng: &mut ChaCha8Rng) -> Array1<f64> {
    let v: Array1<f64> = Array1::random_using(n, Normal::<f64>::new(0.0, 1.0).unwrap(), rng);
    let norm = v.dot(&v).sqrt();
    v / norm
}

#[test]
fn fit_transform_has_shape_m_by_k() {
    init_logging();
    let x = generate_structured_data(40, 6, 1);
    for k in 1..=6 {
        let mut pca = PCA::new();
        let scores = pca.fit_transform(&x, k).unwrap();
        assert_eq!(scores.dim(), (40, k), "shape for k = {}", k);
        assert_eq!(pca.basis().unwrap().dim(), (6, k));
    }
}

#[test]
fn centering_twice_equals_centering_once() {
    let x = generate_structured_data(25, 4, 2);
    let once = center(x.view()).unwrap();
    let twice = center(once.view()).unwrap();
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }
    for m in once.mean_axis(Axis(0)).unwrap().iter() {
        assert_abs_diff_eq!(*m, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn basis_columns_are_orthonormal() {
    init_logging();
    let x = generate_structured_data(60, 8, 3);
    let mut pca = PCA::new();
    pca.fit(&x, 5).unwrap();
    let basis = pca.basis().unwrap();
    let err = orthogonality_error(&basis.view()).unwrap();
    assert!(err < TOL, "orthogonality error too large: {}", err);
}

#[test]
fn basis_eigenvalues_are_non_increasing() {
    let x = generate_structured_data(50, 7, 4);
    let mut pca = PCA::new();
    pca.fit(&x, 7).unwrap();

    let scatter = scatter_matrix(center(x.view()).unwrap().view()).unwrap();
    let lambdas = rayleigh_quotients(&scatter.view(), &pca.basis().unwrap().view()).unwrap();
    let scale = lambdas[0].abs().max(1.0);
    for w in lambdas.windows(2) {
        assert!(w[0] + TOL * scale >= w[1], "eigenvalues out of order: {:?}", lambdas);
    }
}

#[test]
fn first_component_maximizes_projected_variance() {
    let x = generate_structured_data(80, 5, 5);
    let mut pca = PCA::new();
    pca.fit(&x, 5).unwrap();
    let basis = pca.basis().unwrap();

    let centered = center(x.view()).unwrap();
    let variance_along = |v: &Array1<f64>| {
        let p = centered.dot(v);
        p.dot(&p) / (centered.nrows() as f64 - 1.0)
    };

    let first = variance_along(&basis.column(0).to_owned());
    let slack = TOL * first.max(1.0);
    for j in 1..basis.ncols() {
        let later = variance_along(&basis.column(j).to_owned());
        assert!(first + slack >= later, "component {} beats the first: {} > {}", j, later, first);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(55);
    for _ in 0..500 {
        let v = random_unit_vector(5, &mut rng);
        let var = variance_along(&v);
        assert!(first + slack >= var, "random direction beats the first component: {} > {}", var, first);
    }
}

#[test]
fn repeated_fits_agree_up_to_sign() {
    let x = generate_structured_data(45, 6, 6);
    let mut a = PCA::new();
    let mut b = PCA::new();
    a.fit(&x, 4).unwrap();
    b.fit(&x, 4).unwrap();
    a.fit(&x, 4).unwrap();

    let (ba, bb) = (a.basis().unwrap(), b.basis().unwrap());
    for j in 0..4 {
        let cos = ba.column(j).dot(&bb.column(j));
        assert_abs_diff_eq!(cos.abs(), 1.0, epsilon = 1e-8);
    }
}

#[test]
fn reconstruction_error_shrinks_with_more_components() {
    let x = generate_structured_data(70, 6, 7);
    let centered = center(x.view()).unwrap();

    let mut errors = Vec::new();
    for k in 1..=6 {
        let mut pca = PCA::new();
        pca.fit(&x, k).unwrap();
        let basis = pca.basis().unwrap();
        errors.push(reconstruction_mse(&centered.view(), &basis.view()).unwrap());
    }

    let scale = errors[0].max(1.0);
    for w in errors.windows(2) {
        assert!(w[1] <= w[0] + TOL * scale, "reconstruction error increased: {:?}", errors);
    }
    assert_abs_diff_eq!(errors[5], 0.0, epsilon = 1e-8);
}

#[test]
fn full_rank_projection_round_trips_centered_data() {
    let x = generate_structured_data(30, 4, 8);
    let centered = center(x.view()).unwrap();
    let mut pca = PCA::new();
    pca.fit(&x, 4).unwrap();
    let basis = pca.basis().unwrap();
    let scores = pca.transform(&centered).unwrap();
    let back = scores.dot(&basis.t());
    for (a, b) in back.iter().zip(centered.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-8);
    }
}

#[test]
fn worked_three_by_two_example() {
    init_logging();
    let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];

    let centered = center(x.view()).unwrap();
    assert_eq!(centered, array![[-2.0, -2.0], [0.0, 0.0], [2.0, 2.0]]);
    let scatter = scatter_matrix(centered.view()).unwrap();
    assert_eq!(scatter, array![[8.0, 8.0], [8.0, 8.0]]);

    let mut pca = PCA::new();
    let scores = pca.fit_transform(&x, 1).unwrap();
    let v = pca.basis().unwrap().column(0).to_owned();
    let lambda = rayleigh_quotients(&scatter.view(), &pca.basis().unwrap().view()).unwrap();
    assert_abs_diff_eq!(lambda[0], 16.0, epsilon = 1e-10);
    assert_abs_diff_eq!(v[0].abs(), 0.5f64.sqrt(), epsilon = 1e-10);
    assert_abs_diff_eq!(v[1].abs(), 0.5f64.sqrt(), epsilon = 1e-10);

    let sign = scores[[0, 0]].signum();
    let expected = [2.1213203435596424, 4.949747468305833, 7.778174593052023];
    for (i, e) in expected.iter().enumerate() {
        assert_abs_diff_eq!(scores[[i, 0]] * sign, *e, epsilon = 1e-9);
    }
}

#[test]
fn transform_does_not_recenter_new_data() {
    let x = generate_structured_data(20, 3, 9);
    let mut pca = PCA::new();
    pca.fit(&x, 2).unwrap();
    let basis = pca.basis().unwrap().clone();

    let shift = array![100.0, -50.0, 7.0];
    let shifted = &x + &shift;
    let base_scores = pca.transform(&x).unwrap();
    let shifted_scores = pca.transform(&shifted).unwrap();
    let expected_offset = shift.dot(&basis);
    for row in 0..x.nrows() {
        for k in 0..2 {
            assert_abs_diff_eq!(
                shifted_scores[[row, k]] - base_scores[[row, k]],
                expected_offset[k],
                epsilon = 1e-8
            );
        }
    }
}

#[test]
fn component_count_outside_range_is_rejected() {
    let x = generate_structured_data(10, 3, 10);
    let mut pca = PCA::new();
    assert!(matches!(pca.fit(&x, 0), Err(PcaError::InvalidComponentCount { requested: 0, n_features: 3 })));
    assert!(matches!(pca.fit(&x, 4), Err(PcaError::InvalidComponentCount { requested: 4, n_features: 3 })));
    assert!(matches!(
        pca.fit_transform(&x, 4),
        Err(PcaError::InvalidComponentCount { .. })
    ));
}

#[test]
fn transform_on_unfitted_estimator_is_rejected() {
    let pca = PCA::new();
    let x = generate_structured_data(5, 2, 11);
    let err = pca.transform(&x).unwrap_err();
    assert!(matches!(err, PcaError::Unfitted));
    assert_eq!(err.to_string(), "PCA not fitted yet");
}

#[test]
fn transform_with_wrong_feature_count_is_rejected() {
    let x = generate_structured_data(12, 4, 12);
    let mut pca = PCA::new();
    pca.fit(&x, 2).unwrap();
    let narrow = Array2::<f64>::zeros((3, 3));
    match pca.transform(&narrow) {
        Err(PcaError::ShapeMismatch { expected, found }) => {
            assert_eq!(expected, 4);
            assert_eq!(found, 3);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn empty_and_non_finite_inputs_are_rejected() {
    let mut pca = PCA::new();
    assert!(matches!(
        pca.fit(&Array2::<f64>::zeros((0, 3)), 1),
        Err(PcaError::EmptyInput { .. })
    ));
    assert!(matches!(
        pca.fit(&Array2::<f64>::zeros((3, 0)), 1),
        Err(PcaError::EmptyInput { .. })
    ));
    let bad = array![[1.0, f64::INFINITY], [2.0, 3.0]];
    assert!(matches!(
        pca.fit(&bad, 1),
        Err(PcaError::NonSymmetricOrDegenerateInput(_))
    ));
    assert!(!pca.is_fitted());
}

#[test]
fn transform_accepts_new_rows() {
    let train = generate_structured_data(30, 5, 13);
    let test = generate_structured_data(7, 5, 14);
    let mut pca = PCA::new();
    pca.fit(&train, 3).unwrap();
    let scores = pca.transform(test.view()).unwrap();
    assert_eq!(scores.dim(), (7, 3));
}
