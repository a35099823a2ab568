use super::*;

#[test]
fn test_config_new() {
    let config = GDUConfig::new("paper", 7, 3, 4, 5, 2).unwrap();

    assert_eq!(config.gdu_type(), "paper");
    assert_eq!(config.g_sz(), 7);
    assert_eq!(config.x_sz(), 3);
    assert_eq!(config.z_sz(), 4);
    assert_eq!(config.h_sz(), 5);
    assert_eq!(config.out_sz(), 2);
}

#[test]
fn test_config_rejects_zero_dimensions() {
    let cases = [
        (0, 3, 4, 5, 2, "g_sz"),
        (1, 0, 4, 5, 2, "x_sz"),
        (1, 3, 0, 5, 2, "z_sz"),
        (1, 3, 4, 0, 2, "h_sz"),
        (1, 3, 4, 5, 0, "out_sz"),
    ];

    for (g, x, z, h, out, name) in cases {
        match GDUConfig::new("bad", g, x, z, h, out) {
            Err(ModelError::InputValidationError(msg)) => assert!(msg.contains(name)),
            other => panic!("expected validation error for {}, got {:?}", name, other),
        }
    }
}

#[test]
fn test_gdu_new_propagates_config_error() {
    let result = GDU::new("bad", 1, 3, 0, 5, 2);
    assert!(matches!(result, Err(ModelError::InputValidationError(_))));
}

#[test]
fn test_g_sz_does_not_affect_parameters() {
    let narrow = GDU::with_seed(GDUConfig::new("a", 1, 3, 4, 5, 2).unwrap(), 11);
    let wide = GDU::with_seed(GDUConfig::new("a", 64, 3, 4, 5, 2).unwrap(), 11);

    assert_eq!(narrow.parameters(), wide.parameters());
}

#[test]
fn test_gdu_type_is_kept() {
    let unit = GDU::new("author", 1, 3, 4, 5, 2).unwrap();
    assert_eq!(unit.gdu_type(), "author");
    assert_eq!(unit.config().gdu_type(), "author");
}
