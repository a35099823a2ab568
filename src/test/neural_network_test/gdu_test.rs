use super::*;

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

#[test]
fn test_gdu_forward_shape() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 42);
    let (x, z, h) = random_inputs(&config, 6, 0);

    let output = unit.forward(&x, &z, &h).unwrap();
    assert_eq!(output.dim(), (6, 2));

    assert_eq!(unit.layer_type(), "GDU");
    assert_eq!(unit.output_shape(), "(None, 2)");
    assert_eq!(unit.param_count(), TrainingParameters::Trainable(231));
}

#[test]
fn test_gdu_gate_ranges() {
    let config = test_config();
    let unit = GDU::with_seed(config.clone(), 5);
    let (x, z, h) = random_inputs(&config, 8, 1);

    let trace = unit.forward_trace(&x, &z, &h).unwrap();

    for gate in [&trace.f, &trace.e, &trace.g, &trace.r] {
        assert!(gate.iter().all(|&v| v > 0.0 && v < 1.0));
    }
    for candidate in [&trace.o1, &trace.o2, &trace.o3, &trace.o4] {
        assert!(candidate.iter().all(|&v| v > -1.0 && v < 1.0));
    }
    assert_eq!(trace.f.dim(), (8, 4));
    assert_eq!(trace.e.dim(), (8, 5));
    assert_eq!(trace.g.dim(), (8, 2));
    assert_eq!(trace.r.dim(), (8, 2));

    // Adjusted states never grow in magnitude
    Zip::from(&trace.z_tilde)
        .and(&z)
        .for_each(|&zt, &zv| assert!(zt.abs() <= zv.abs()));
    Zip::from(&trace.h_tilde)
        .and(&h)
        .for_each(|&ht, &hv| assert!(ht.abs() <= hv.abs()));

    assert!(trace.output.iter().all(|&v| (-1.0..=1.0).contains(&v)));
}

#[test]
fn test_gdu_output_is_convex_blend() {
    let config = test_config();
    let unit = GDU::with_seed(config.clone(), 9);
    let (x, z, h) = random_inputs(&config, 5, 2);

    let trace = unit.forward_trace(&x, &z, &h).unwrap();
    let [c1, c2, c3, c4] = trace.blend_coefficients();

    let total = &c1 + &c2 + &c3 + &c4;
    for &v in total.iter() {
        assert_relative_eq!(v, 1.0, epsilon = 1e-6);
    }

    let blended = &c1 * &trace.o1 + &(&c2 * &trace.o2) + &(&c3 * &trace.o3) + &(&c4 * &trace.o4);
    for (a, b) in blended.iter().zip(trace.output.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    // The output lies between the smallest and largest candidate
    for ((i, j), &out) in trace.output.indexed_iter() {
        let candidates = [
            trace.o1[[i, j]],
            trace.o2[[i, j]],
            trace.o3[[i, j]],
            trace.o4[[i, j]],
        ];
        let lo = candidates.iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = candidates.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(out >= lo - 1e-6 && out <= hi + 1e-6);
    }
}

#[test]
fn test_gdu_forward_is_deterministic() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 4);
    let (x, z, h) = random_inputs(&config, 3, 3);
    let params_before = unit.parameters().clone();

    let first = unit.forward(&x, &z, &h).unwrap();
    let second = unit.forward(&x, &z, &h).unwrap();
    let predicted = unit.predict(&x, &z, &h).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, predicted);
    assert_eq!(unit.parameters(), &params_before);
}

#[test]
fn test_gdu_rows_are_independent() {
    let config = test_config();
    let unit = GDU::with_seed(config.clone(), 8);
    let (x, z, h) = random_inputs(&config, 4, 4);

    let batched = unit.predict(&x, &z, &h).unwrap();
    for row in 0..4 {
        let single = unit
            .predict(
                &x.slice(s![row..row + 1, ..]).to_owned(),
                &z.slice(s![row..row + 1, ..]).to_owned(),
                &h.slice(s![row..row + 1, ..]).to_owned(),
            )
            .unwrap();
        for (a, b) in single.row(0).iter().zip(batched.row(row).iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_gdu_zero_parameters() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 0);
    unit.parameters_mut().fill(0.0);
    let (x, z, h) = random_inputs(&config, 3, 5);

    let trace = unit.forward_trace(&x, &z, &h).unwrap();

    // Every gate sits at one half and every candidate at zero
    for gate in [&trace.f, &trace.e, &trace.g, &trace.r] {
        assert!(gate.iter().all(|&v| v == 0.5));
    }
    assert!(trace.output.iter().all(|&v| v == 0.0));
}

#[test]
fn test_gdu_saturated_forget_gate() {
    let config = test_config();
    let (x, z, h) = random_inputs(&config, 3, 6);

    // Open gates pass the states through unchanged
    let mut unit = GDU::with_seed(config.clone(), 12);
    unit.parameters_mut().forget.bias.fill(100.0);
    unit.parameters_mut().evolve.bias.fill(100.0);
    let trace = unit.forward_trace(&x, &z, &h).unwrap();
    for (a, b) in trace.z_tilde.iter().zip(z.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }
    for (a, b) in trace.h_tilde.iter().zip(h.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    // Closed gates erase them
    unit.parameters_mut().forget.bias.fill(-100.0);
    unit.parameters_mut().evolve.bias.fill(-100.0);
    let trace = unit.forward_trace(&x, &z, &h).unwrap();
    assert!(trace.z_tilde.iter().all(|v| v.abs() < 1e-6));
    assert!(trace.h_tilde.iter().all(|v| v.abs() < 1e-6));
}

#[test]
fn test_gdu_forget_bias_sweep_converges() {
    let config = test_config();
    let (x, z, h) = random_inputs(&config, 4, 14);
    let mut unit = GDU::with_seed(config, 15);
    unit.parameters_mut().fill(0.0);

    let mut errors = Vec::new();
    for bias in [1.0f32, 5.0, 20.0, 100.0] {
        unit.parameters_mut().forget.bias.fill(bias);
        let trace = unit.forward_trace(&x, &z, &h).unwrap();

        // Only b_f is set, so f = σ(b_f) everywhere
        assert!(trace.f.iter().all(|&v| v == trace.f[[0, 0]]));
        let error = (&trace.z_tilde - &z)
            .iter()
            .fold(0.0f32, |acc, v| acc.max(v.abs()));
        errors.push(error);
    }

    assert!(errors[0] > errors[1] && errors[1] > errors[2]);
    assert!(errors[3] <= errors[2]);
    assert!(errors[3] < 1e-6);
}

#[test]
fn test_gdu_saturated_selection_gates() {
    let config = test_config();
    let (x, z, h) = random_inputs(&config, 2, 7);
    let mut unit = GDU::with_seed(config, 13);

    // g = r = 1 selects the candidate built from both adjusted states
    unit.parameters_mut().select_g.bias.fill(100.0);
    unit.parameters_mut().select_r.bias.fill(100.0);
    let trace = unit.forward_trace(&x, &z, &h).unwrap();
    for (a, b) in trace.output.iter().zip(trace.o1.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    // g = r = 0 selects the candidate built from the original states
    unit.parameters_mut().select_g.bias.fill(-100.0);
    unit.parameters_mut().select_r.bias.fill(-100.0);
    let trace = unit.forward_trace(&x, &z, &h).unwrap();
    for (a, b) in trace.output.iter().zip(trace.o4.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn test_gdu_single_unit_by_hand() {
    let config = GDUConfig::new("scalar", 1, 1, 1, 1, 1).unwrap();
    let mut unit = GDU::with_seed(config, 0);
    unit.parameters_mut().fill(0.5);
    for name in ParameterName::ALL.iter().filter(|n| n.is_bias()) {
        unit.parameters_mut().get_mut(*name).fill(0.0);
    }

    let x = array![[1.0f32]];
    let z = array![[1.0f32]];
    let h = array![[1.0f32]];
    let output = unit.predict(&x, &z, &h).unwrap();

    let f = sigmoid(1.5);
    let e = sigmoid(1.5);
    let g = sigmoid(0.5 * (3.0 + f + e));
    let r = g;
    let o1 = (0.5 * (1.0 + f + e)).tanh();
    let o2 = (0.5 * (2.0 + e)).tanh();
    let o3 = (0.5 * (2.0 + f)).tanh();
    let o4 = (1.5f32).tanh();
    let expected =
        g * r * o1 + (1.0 - g) * r * o2 + g * (1.0 - r) * o3 + (1.0 - g) * (1.0 - r) * o4;

    assert_relative_eq!(output[[0, 0]], expected, epsilon = 1e-5);
}

#[test]
fn test_gdu_forward_rejects_bad_inputs() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 1);
    let (x, z, h) = random_inputs(&config, 3, 8);

    // Wrong feature width
    let wide_x = Array2::zeros((3, 7));
    assert!(matches!(
        unit.forward(&wide_x, &z, &h),
        Err(ModelError::InputValidationError(_))
    ));
    let narrow_h = Array2::zeros((3, 1));
    assert!(matches!(
        unit.predict(&x, &z, &narrow_h),
        Err(ModelError::InputValidationError(_))
    ));

    // Batch size mismatch
    let short_z = Array2::zeros((2, 4));
    assert!(matches!(
        unit.forward(&x, &short_z, &h),
        Err(ModelError::InputValidationError(_))
    ));

    // A failed forward leaves nothing to backpropagate
    assert!(matches!(
        unit.backward(&Array2::ones((3, 2))),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn test_gdu_backward_before_forward() {
    let mut unit = GDU::with_seed(test_config(), 2);
    let result = unit.backward(&Array2::ones((1, 2)));
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
    assert!(unit.gradients().is_none());
}

#[test]
fn test_gdu_backward_consumes_cache() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 3);
    let (x, z, h) = random_inputs(&config, 4, 9);
    unit.forward(&x, &z, &h).unwrap();

    // Wrong shape is rejected without consuming the cache
    assert!(matches!(
        unit.backward(&Array2::ones((4, 3))),
        Err(ModelError::InputValidationError(_))
    ));

    let (grad_x, grad_z, grad_h) = unit.backward(&Array2::ones((4, 2))).unwrap();
    assert_eq!(grad_x.dim(), (4, 3));
    assert_eq!(grad_z.dim(), (4, 4));
    assert_eq!(grad_h.dim(), (4, 5));

    let gradients = unit.gradients().unwrap();
    for ((name, grad), (_, param)) in gradients.iter().zip(unit.parameters().iter()) {
        assert_eq!(grad.shape(), param.shape(), "{}", name);
        assert!(grad.iter().all(|v| v.is_finite()), "{}", name);
    }

    // A second backward needs a new forward
    assert!(matches!(
        unit.backward(&Array2::ones((4, 2))),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn test_gdu_zero_upstream_gradient() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 10);
    let (x, z, h) = random_inputs(&config, 3, 10);
    unit.forward(&x, &z, &h).unwrap();

    let (grad_x, grad_z, grad_h) = unit.backward(&Array2::zeros((3, 2))).unwrap();
    assert!(grad_x.iter().chain(grad_z.iter()).chain(grad_h.iter()).all(|&v| v == 0.0));
    for (_, grad) in unit.gradients().unwrap().iter() {
        assert!(grad.iter().all(|&v| v == 0.0));
    }
}
