// [tests/mirror/libs/core/math_engine/curve_laws.test.rs]
/**
 * =================================================================
 * APARATO: AFFINE GROUP LAW TEST (V5.0 - CROSS-LIBRARY EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICAR LA LEY DE GRUPO CONTRA LA LIBRERÍA
 *                  SECP256K1 DE REFERENCIA
 * =================================================================
 */

use kangaroo_core_math::prelude::*;

/// Deriva k * G a través de la librería secp256k1 de referencia.
fn reference_multiple(scalar_value: u64) -> AffinePoint {
    let mut scalar_bytes = [0u8; 32];
    scalar_bytes[24..32].copy_from_slice(&scalar_value.to_be_bytes());
    let private_key = SafePrivateKey::from_bytes(&scalar_bytes).expect("REFERENCE_KEY_PANIC");
    SafePublicKey::from_private(&private_key).to_affine()
}

#[test]
fn certify_generator_membership() {
    assert!(AffinePoint::generator().is_on_curve(), "CURVE_FAULT: G off curve");
    assert!(AffinePoint::infinity().is_on_curve());
}

#[test]
fn certify_addition_against_reference_library() {
    let generator = AffinePoint::generator();

    // 2G por duplicación propia vs derivación de referencia
    let doubled = AffineCurveEngine::double_affine(&generator).expect("DOUBLE_PANIC");
    assert_eq!(doubled, reference_multiple(2), "GROUP_LAW_FAULT: 2G mismatch");

    // 3G por cuerda vs referencia
    let tripled = AffineCurveEngine::add_affine(&doubled, &generator).expect("ADD_PANIC");
    assert_eq!(tripled, reference_multiple(3), "GROUP_LAW_FAULT: 3G mismatch");

    // 7G acumulando cuerda sobre cuerda
    let mut accumulator = generator;
    for _ in 0..6 {
        accumulator = AffineCurveEngine::add_affine(&accumulator, &generator).expect("ADD_PANIC");
    }
    assert_eq!(accumulator, reference_multiple(7), "GROUP_LAW_FAULT: 7G mismatch");
}

#[test]
fn certify_identity_and_inverse_branches() {
    let generator = AffinePoint::generator();

    let from_identity = AffineCurveEngine::add_affine(&AffinePoint::infinity(), &generator)
        .expect("ADD_PANIC");
    assert_eq!(from_identity, generator);

    let collapsed = AffineCurveEngine::add_affine(&generator, &generator.negate())
        .expect("ADD_PANIC");
    assert!(collapsed.is_infinity, "INVERSE_FAULT: G + (-G) must collapse to identity");
}

#[test]
fn certify_batch_addition_parity() {
    let generator = AffinePoint::generator();

    // Targets 2G..9G, sumandos fijos G: el lote debe igualar la vía escalar
    let mut batch_targets: Vec<AffinePoint> =
        (2u64..10).map(reference_multiple).collect();
    let scalar_targets = batch_targets.clone();
    let addends = vec![generator; batch_targets.len()];

    let mut workspace = BatchAdditionWorkspace::with_capacity(batch_targets.len());
    AffineCurveEngine::batch_add_assign(&mut batch_targets, &addends, &mut workspace)
        .expect("BATCH_PANIC");

    for (batch_result, scalar_target) in batch_targets.iter().zip(scalar_targets.iter()) {
        let scalar_result =
            AffineCurveEngine::add_affine(scalar_target, &generator).expect("ADD_PANIC");
        assert_eq!(*batch_result, scalar_result, "BATCH_PARITY_FAULT");
    }

    // Rama degenerada dentro del lote: G + G debe duplicar
    let mut degenerate_targets = vec![generator];
    let degenerate_addends = vec![generator];
    let mut degenerate_workspace = BatchAdditionWorkspace::with_capacity(1);
    AffineCurveEngine::batch_add_assign(
        &mut degenerate_targets,
        &degenerate_addends,
        &mut degenerate_workspace,
    )
    .expect("BATCH_PANIC");
    assert_eq!(degenerate_targets[0], reference_multiple(2), "BATCH_DOUBLE_FAULT");
}

#[test]
fn certify_sec1_serialization_bridge() {
    let point = reference_multiple(0xDEADBEEF);
    let sec1_buffer = point.to_sec1_uncompressed().expect("SEC1_PANIC");
    let decoded = AffinePoint::from_sec1_uncompressed(&sec1_buffer).expect("SEC1_PANIC");
    assert_eq!(decoded, point);

    let bridged = SafePublicKey::from_affine(&point).expect("BRIDGE_PANIC");
    assert_eq!(bridged.to_affine(), point, "BRIDGE_FAULT: affine roundtrip via library");
}
