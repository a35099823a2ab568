use super::*;

#[test]
fn test_gdu_layer_weights() {
    let unit = GDU::with_seed(test_config(), 17);

    let LayerWeight::GDU(weights) = unit.get_weights();
    let params = unit.parameters();

    assert_eq!(weights.forget.w_x, &params.forget.w_x);
    assert_eq!(weights.forget.bias.len(), 4);
    assert_eq!(weights.evolve.w_h.dim(), (5, 5));
    assert_eq!(weights.evolve.bias.len(), 5);
    assert_eq!(weights.select_g.w_z_tilde, &params.select_g.w_z_tilde);
    assert_eq!(weights.select_r.w_h_tilde.dim(), (5, 2));
    assert_eq!(weights.fuse.w_z.dim(), (4, 2));
    assert_eq!(weights.fuse.bias, &params.fuse.bias);
}
