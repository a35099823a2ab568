use super::*;

/// Mean squared error between the unit output and `target`, with its gradient
fn mse(output: &Array2<f32>, target: &Array2<f32>) -> (f32, Array2<f32>) {
    let diff = output - target;
    let n = diff.len() as f32;
    let loss = diff.mapv(|v| v * v).sum() / n;
    (loss, diff * (2.0 / n))
}

/// Trains a seeded unit toward a fixed target and returns the loss before and after
fn train(optimizer: &mut dyn Optimizer, epochs: usize) -> (f32, f32) {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 31);
    let (x, z, h) = random_inputs(&config, 4, 32);
    let target = Array2::from_elem((4, config.out_sz()), 0.5f32);

    let (initial_loss, _) = mse(&unit.predict(&x, &z, &h).unwrap(), &target);
    for _ in 0..epochs {
        let output = unit.forward(&x, &z, &h).unwrap();
        let (_, grad) = mse(&output, &target);
        unit.backward(&grad).unwrap();
        optimizer.update(&mut unit);
    }
    let (final_loss, _) = mse(&unit.predict(&x, &z, &h).unwrap(), &target);

    (initial_loss, final_loss)
}

#[test]
fn sgd_test() {
    let (before, after) = train(&mut SGD::new(0.1).unwrap(), 50);
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn adam_test() {
    let (before, after) = train(&mut Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap(), 50);
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn rmsprop_test() {
    let (before, after) = train(&mut RMSprop::new(0.001, 0.9, 1e-8).unwrap(), 50);
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn ada_grad_test() {
    let (before, after) = train(&mut AdaGrad::new(0.01, 1e-8).unwrap(), 50);
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn test_update_without_gradients_is_noop() {
    let mut unit = GDU::with_seed(test_config(), 33);
    let before = unit.parameters().clone();

    SGD::new(0.1).unwrap().update(&mut unit);
    Adam::new(0.1, 0.9, 0.999, 1e-8).unwrap().update(&mut unit);
    RMSprop::new(0.1, 0.9, 1e-8).unwrap().update(&mut unit);
    AdaGrad::new(0.1, 1e-8).unwrap().update(&mut unit);

    assert_eq!(unit.parameters(), &before);
}

#[test]
fn test_optimizers_share_one_unit() {
    let config = test_config();
    let mut unit = GDU::with_seed(config.clone(), 34);
    let (x, z, h) = random_inputs(&config, 2, 35);
    let mut optimizers: Vec<Box<dyn Optimizer>> = vec![
        Box::new(SGD::new(0.01).unwrap()),
        Box::new(Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap()),
        Box::new(RMSprop::new(0.01, 0.9, 1e-8).unwrap()),
        Box::new(AdaGrad::new(0.01, 1e-8).unwrap()),
    ];

    for optimizer in optimizers.iter_mut() {
        let before = unit.parameters().clone();
        unit.forward(&x, &z, &h).unwrap();
        unit.backward(&Array2::ones((2, 2))).unwrap();
        optimizer.update(&mut unit);
        assert_ne!(unit.parameters(), &before);
    }

    for (_, param) in unit.parameters().iter() {
        assert!(param.iter().all(|v| v.is_finite()));
    }
}
