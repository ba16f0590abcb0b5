// [libs/core/math-engine/src/arithmetic.rs]
/*!
 * =================================================================
 * APARATO: CORE ARITHMETIC KERNEL (V121.0 - LIMB SOVEREIGN)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: OPERACIONES U256 CRUDAS SOBRE LIMBS DE 64 BITS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LIMB CANON: Toda la aritmética del enjambre opera sobre 4 palabras
 *    de 64 bits en orden Little-Endian; la conversión Big-Endian queda
 *    confinada a las fronteras de serialización.
 * 2. CARRY DISCIPLINE: Acarreo y préstamo propagados vía u128/i128 para
 *    paridad bit-perfecta entre arquitecturas.
 * 3. NOMINAL PURITY: Erradicación total de abreviaciones.
 * =================================================================
 */

use crate::errors::MathError;
use rand::RngCore;
use std::cmp::Ordering;

/// Longitud canónica de una clave de 256 bits en bytes.
pub const U256_BYTE_SIZE: usize = 32;

/// Representación cruda de un entero de 256 bits (Little-Endian limbs).
pub type U256Limbs = [u64; 4];

/**
 * Adición U256 + U256 con acarreo de salida explícito.
 */
#[inline(always)]
#[must_use]
pub fn add_limbs(alpha_operand: &U256Limbs, beta_operand: &U256Limbs) -> (U256Limbs, bool) {
    let mut result_limbs = [0u64; 4];
    let mut carry_propagation: u128 = 0;

    for index in 0..4 {
        let partial_sum = (alpha_operand[index] as u128)
            + (beta_operand[index] as u128)
            + carry_propagation;
        result_limbs[index] = partial_sum as u64;
        carry_propagation = partial_sum >> 64;
    }

    (result_limbs, carry_propagation != 0)
}

/**
 * Sustracción U256 - U256 con préstamo de salida explícito.
 */
#[inline(always)]
#[must_use]
pub fn subtract_limbs(minuend: &U256Limbs, subtrahend: &U256Limbs) -> (U256Limbs, bool) {
    let mut result_limbs = [0u64; 4];
    let mut borrow_propagation: i128 = 0;

    for index in 0..4 {
        let difference = (minuend[index] as i128)
            - (subtrahend[index] as i128)
            - borrow_propagation;
        if difference < 0 {
            result_limbs[index] = (difference + (1i128 << 64)) as u64;
            borrow_propagation = 1;
        } else {
            result_limbs[index] = difference as u64;
            borrow_propagation = 0;
        }
    }

    (result_limbs, borrow_propagation != 0)
}

/**
 * Comparación lexicográfica de escalares U256 (High-to-Low scan).
 */
#[inline(always)]
#[must_use]
pub fn compare_limbs(alpha_operand: &U256Limbs, beta_operand: &U256Limbs) -> Ordering {
    for index in (0..4).rev() {
        match alpha_operand[index].cmp(&beta_operand[index]) {
            Ordering::Equal => continue,
            verdict => return verdict,
        }
    }
    Ordering::Equal
}

/// Determina si el entero es nulo.
#[inline(always)]
#[must_use]
pub fn is_zero_limbs(operand: &U256Limbs) -> bool {
    operand.iter().all(|&limb| limb == 0)
}

/**
 * Longitud efectiva en bits del entero (0 para el valor nulo).
 */
#[inline(always)]
#[must_use]
pub fn bit_length(operand: &U256Limbs) -> u32 {
    for index in (0..4).rev() {
        if operand[index] != 0 {
            return (index as u32) * 64 + (64 - operand[index].leading_zeros());
        }
    }
    0
}

/**
 * Conteo de bits cero en el rastro binario bajo (Distinguished Point test).
 * Retorna 256 para el valor nulo.
 */
#[inline(always)]
#[must_use]
pub fn trailing_zero_bits(operand: &U256Limbs) -> u32 {
    for index in 0..4 {
        if operand[index] != 0 {
            return (index as u32) * 64 + operand[index].trailing_zeros();
        }
    }
    256
}

/// Consulta el bit en la posición solicitada (0 = menos significativo).
#[inline(always)]
#[must_use]
pub fn bit_at(operand: &U256Limbs, bit_index: u32) -> bool {
    let limb_index = (bit_index / 64) as usize;
    (operand[limb_index] >> (bit_index % 64)) & 1 == 1
}

/**
 * Decodifica un buffer Big-Endian de 32 bytes hacia limbs Little-Endian.
 */
#[inline(always)]
#[must_use]
pub fn limbs_from_be_bytes(bytes_input: &[u8; 32]) -> U256Limbs {
    let mut limbs_output = [0u64; 4];
    for (index, limb_reference) in limbs_output.iter_mut().enumerate() {
        let byte_start_offset = (3 - index) * 8;
        *limb_reference = u64::from_be_bytes(
            bytes_input[byte_start_offset..byte_start_offset + 8]
                .try_into()
                .unwrap(),
        );
    }
    limbs_output
}

/**
 * Serializa los limbs al estándar Big-Endian de 32 bytes.
 */
#[inline(always)]
#[must_use]
pub fn limbs_to_be_bytes(limbs_input: &U256Limbs) -> [u8; 32] {
    let mut bytes_output = [0u8; 32];
    for (index, limb_value) in limbs_input.iter().enumerate() {
        let byte_start_offset = (3 - index) * 8;
        bytes_output[byte_start_offset..byte_start_offset + 8]
            .copy_from_slice(&limb_value.to_be_bytes());
    }
    bytes_output
}

/**
 * Decodifica una cadena hexadecimal (con o sin prefijo 0x, hasta 64 dígitos).
 *
 * # Errors:
 * Retorna `MathError::HexFault` ante dígitos ilegales y
 * `MathError::InvalidLength` si el valor excede los 256 bits.
 */
pub fn limbs_from_hex(hexadecimal_input: &str) -> Result<U256Limbs, MathError> {
    let stripped_input = hexadecimal_input
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");

    if stripped_input.len() > 64 {
        return Err(MathError::InvalidLength {
            expected: U256_BYTE_SIZE,
            got: stripped_input.len().div_ceil(2),
        });
    }

    // Normalización a 64 dígitos para decodificación uniforme
    let padded_input = format!("{:0>64}", stripped_input);
    let decoded_bytes = hex::decode(padded_input)?;
    let mut fixed_buffer = [0u8; 32];
    fixed_buffer.copy_from_slice(&decoded_bytes);

    Ok(limbs_from_be_bytes(&fixed_buffer))
}

/// Codifica los limbs como 64 dígitos hexadecimales en mayúsculas.
#[must_use]
pub fn limbs_to_hex(limbs_input: &U256Limbs) -> String {
    hex::encode_upper(limbs_to_be_bytes(limbs_input))
}

/// Eleva un valor de 128 bits al espacio U256.
#[inline(always)]
#[must_use]
pub fn limbs_from_u128(value_to_convert: u128) -> U256Limbs {
    [value_to_convert as u64, (value_to_convert >> 64) as u64, 0, 0]
}

/// Proyecta el entero a u128 si cabe; `None` ante desborde.
#[inline(always)]
#[must_use]
pub fn limbs_to_u128(operand: &U256Limbs) -> Option<u128> {
    if operand[2] != 0 || operand[3] != 0 {
        return None;
    }
    Some((operand[0] as u128) | ((operand[1] as u128) << 64))
}

/**
 * Aproximación de punto flotante para estadísticas y reporte de progreso.
 * Nunca se utiliza en trayectorias de corrección criptográfica.
 */
#[must_use]
pub fn approximate_f64(operand: &U256Limbs) -> f64 {
    let mut accumulator = 0.0f64;
    for index in (0..4).rev() {
        accumulator = accumulator * 18_446_744_073_709_551_616.0 + (operand[index] as f64);
    }
    accumulator
}

/**
 * Genera un entero uniforme en [0, exclusive_bound) mediante muestreo por rechazo.
 *
 * # Mathematical Proof:
 * Al enmascarar a la longitud de bits de la cota, cada iteración acepta
 * con probabilidad > 1/2, garantizando terminación esperada en O(1) sorteos.
 */
pub fn random_limbs_below(exclusive_bound: &U256Limbs, entropy_source: &mut impl RngCore) -> U256Limbs {
    debug_assert!(!is_zero_limbs(exclusive_bound));

    let bound_bit_length = bit_length(exclusive_bound);
    let top_limb_index = ((bound_bit_length + 63) / 64 - 1) as usize;
    let top_limb_mask = if bound_bit_length % 64 == 0 {
        u64::MAX
    } else {
        (1u64 << (bound_bit_length % 64)) - 1
    };

    loop {
        let mut candidate_limbs = [0u64; 4];
        for limb_reference in candidate_limbs.iter_mut().take(top_limb_index + 1) {
            *limb_reference = entropy_source.next_u64();
        }
        candidate_limbs[top_limb_index] &= top_limb_mask;

        if compare_limbs(&candidate_limbs, exclusive_bound) == Ordering::Less {
            return candidate_limbs;
        }
    }
}
