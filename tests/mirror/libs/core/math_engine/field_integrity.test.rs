// [tests/mirror/libs/core/math_engine/field_integrity.test.rs]
/**
 * =================================================================
 * APARATO: FIELD ENGINE INTEGRITY TEST (V4.0 - SOLINAS EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CAMPO Fp Y LA INVERSIÓN POR LOTE
 * =================================================================
 */

use kangaroo_core_math::prelude::*;

fn prime_minus_one() -> FieldElement {
    let mut limbs = SECP256K1_FIELD_PRIME;
    limbs[0] -= 1;
    FieldElement { internal_words: limbs }
}

#[test]
fn certify_canonical_reduction() {
    // p se reduce al elemento nulo
    let reduced_prime = FieldElement::from_limbs(SECP256K1_FIELD_PRIME);
    assert!(reduced_prime.is_zero(), "REDUCTION_FAULT: p mod p != 0");

    // 2^256 - 1 = p + (c - 1)  =>  residuo c - 1 = 2^32 + 976
    let all_ones = FieldElement::from_limbs([u64::MAX; 4]);
    assert_eq!(
        all_ones,
        FieldElement::from_u64(0x1000003D0),
        "REDUCTION_FAULT: 2^256 - 1 mod p"
    );
}

#[test]
fn certify_negative_one_square() {
    // (p - 1)^2 ≡ (-1)^2 ≡ 1: prueba integral del plegado Solinas
    let negative_one = prime_minus_one();
    assert_eq!(
        negative_one.multiply_modular(&negative_one),
        FieldElement::ONE,
        "SOLINAS_FAULT: (-1)^2 != 1"
    );
}

#[test]
fn certify_additive_group_laws() {
    let element = FieldElement::from_bytes_be(&[0x5Au8; 32]);
    let negated = element.negate_modular();

    assert!(element.add_modular(&negated).is_zero(), "GROUP_FAULT: a + (-a) != 0");
    assert_eq!(
        element.subtract_modular(&element),
        FieldElement::ZERO,
        "GROUP_FAULT: a - a != 0"
    );

    // Conmutatividad y asociatividad puntuales
    let other = FieldElement::from_bytes_be(&[0xC3u8; 32]);
    assert_eq!(element.add_modular(&other), other.add_modular(&element));
    assert_eq!(
        element.multiply_modular(&other),
        other.multiply_modular(&element),
        "RING_FAULT: multiplication must commute"
    );
}

#[test]
fn certify_fermat_inversion() {
    let element = FieldElement::from_bytes_be(&[0x77u8; 32]);
    let inverse = element.invert().expect("INVERSION_PANIC");

    assert_eq!(
        element.multiply_modular(&inverse),
        FieldElement::ONE,
        "FERMAT_FAULT: a * a^-1 != 1"
    );
    assert!(FieldElement::ZERO.invert().is_err(), "DIV_ZERO_FAULT: 0 must be uninvertible");
}

#[test]
fn certify_batch_inversion_parity() {
    let elements: Vec<FieldElement> = (1u64..=64)
        .map(|seed| FieldElement::from_u64(seed).multiply_modular(&FieldElement::from_bytes_be(&[0x33u8; 32])))
        .collect();

    let mut batch_inverses = vec![FieldElement::ZERO; elements.len()];
    let mut scratch_memory = vec![FieldElement::ZERO; elements.len()];
    FieldElement::batch_invert_into(&elements, &mut batch_inverses, &mut scratch_memory)
        .expect("BATCH_PANIC");

    for (element, batch_inverse) in elements.iter().zip(batch_inverses.iter()) {
        let individual_inverse = element.invert().expect("INVERSION_PANIC");
        assert_eq!(
            *batch_inverse, individual_inverse,
            "MONTGOMERY_TRICK_FAULT: batch and Fermat inverses diverge"
        );
    }

    // Un cero en el lote colapsa la operación completa
    let poisoned = vec![FieldElement::ONE, FieldElement::ZERO];
    let mut outputs = vec![FieldElement::ZERO; 2];
    let mut scratch = vec![FieldElement::ZERO; 2];
    assert!(FieldElement::batch_invert_into(&poisoned, &mut outputs, &mut scratch).is_err());
}

#[test]
fn certify_small_multiplier_path() {
    let element = prime_minus_one();
    // 8 * (p - 1) ≡ -8 ≡ p - 8
    let mut expected_limbs = SECP256K1_FIELD_PRIME;
    expected_limbs[0] -= 8;
    assert_eq!(
        element.multiply_by_u64(8),
        FieldElement { internal_words: expected_limbs },
        "U64_MULTIPLY_FAULT: 8 * (-1) != -8"
    );
}
