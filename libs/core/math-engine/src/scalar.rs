// [libs/core/math-engine/src/scalar.rs]
/*!
 * =================================================================
 * APARATO: SCALAR MODULAR ENGINE (V14.0 - SIGNED DISTANCE READY)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: ARITMÉTICA MODULO N (ORDEN DE LA CURVA SECP256K1)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SIGNED SYNERGY: Adición de deltas i128 con signo para integrar las
 *    distancias acumuladas de la manada sin abandonar el anillo mod n.
 * 2. ATOMIC REDUCTION: Reducción k mod n de un solo paso aprovechando
 *    que n > 2^255 (2n > 2^256).
 * 3. NOMINAL PURITY: Nomenclatura nominal absoluta aplicada a limbs y bytes.
 *
 * # Mathematical Proof (Group Order Ring):
 * Todas las operaciones preservan el invariante 0 <= k < n, condición
 * necesaria para la interoperabilidad con los tweaks de la librería
 * secp256k1 subyacente.
 * =================================================================
 */

use crate::arithmetic::{
    add_limbs, bit_at, compare_limbs, is_zero_limbs, limbs_from_be_bytes, limbs_from_hex,
    limbs_from_u128, limbs_to_be_bytes, limbs_to_hex, subtract_limbs, U256Limbs,
};
use crate::errors::MathError;
use std::cmp::Ordering;

/// El orden 'n' de la curva secp256k1 en representación Little-Endian (Limb 64-bit).
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
pub const SECP256K1_CURVE_ORDER_N: U256Limbs = [
    0xBFD25E8CD0364141, // Limb 0 (Low)
    0xBAAEDCE6AF48A03B, // Limb 1
    0xFFFFFFFFFFFFFFFE, // Limb 2
    0xFFFFFFFFFFFFFFFF, // Limb 3 (High)
];

/// Complemento del orden: 2^256 - n. Utilizado para el ajuste post-acarreo.
const ORDER_COMPLEMENT: U256Limbs = [
    0x402DA1732FC9BEBF,
    0x4551231950B75FC4,
    0x0000000000000001,
    0x0000000000000000,
];

/// Escalar canónico del anillo Z/nZ. Invariante: valor < n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar {
    /// Palabras de 64 bits que componen el escalar (Little-Endian).
    pub scalar_limbs: U256Limbs,
}

impl Scalar {
    /// Elemento neutro aditivo del anillo.
    pub const ZERO: Self = Self { scalar_limbs: [0, 0, 0, 0] };
    /// Unidad del anillo.
    pub const ONE: Self = Self { scalar_limbs: [1, 0, 0, 0] };

    /**
     * Construye un escalar desde limbs crudos con reducción atómica.
     *
     * # Mathematical Proof:
     * Como n > 2^255, cualquier entero de 256 bits es < 2n y una sola
     * sustracción condicional de n produce el residuo canónico.
     */
    #[inline(always)]
    #[must_use]
    pub fn from_limbs_reduced(raw_limbs: U256Limbs) -> Self {
        let mut candidate = Self { scalar_limbs: raw_limbs };
        if candidate.is_greater_than_or_equal_to_order() {
            let (reduced_limbs, _) = subtract_limbs(&candidate.scalar_limbs, &SECP256K1_CURVE_ORDER_N);
            candidate = Self { scalar_limbs: reduced_limbs };
        }
        candidate
    }

    /// Construye un escalar a partir de un array Big-Endian de 32 bytes.
    #[inline(always)]
    #[must_use]
    pub fn from_u256_be(big_endian_bytes: &[u8; 32]) -> Self {
        Self::from_limbs_reduced(limbs_from_be_bytes(big_endian_bytes))
    }

    /**
     * Decodifica un escalar desde una cadena hexadecimal.
     *
     * # Errors:
     * Propaga los fallos de decodificación del kernel aritmético.
     */
    pub fn from_hex(hexadecimal_input: &str) -> Result<Self, MathError> {
        Ok(Self::from_limbs_reduced(limbs_from_hex(hexadecimal_input)?))
    }

    /// Eleva un valor de 128 bits al anillo.
    #[inline(always)]
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self { scalar_limbs: limbs_from_u128(value) }
    }

    /// Serializa el escalar al buffer Big-Endian de 32 bytes.
    #[inline(always)]
    #[must_use]
    pub fn to_u256_be(&self) -> [u8; 32] {
        limbs_to_be_bytes(&self.scalar_limbs)
    }

    /// Codificación hexadecimal de 64 dígitos para reportes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        limbs_to_hex(&self.scalar_limbs)
    }

    /**
     * Adición modular: (self + other) mod n.
     */
    #[inline(always)]
    #[must_use]
    pub fn add_mod_n(&self, other: &Self) -> Self {
        let (sum_limbs, carry_out) = add_limbs(&self.scalar_limbs, &other.scalar_limbs);
        let adjusted_limbs = if carry_out {
            // sum = 2^256 + low  =>  sum - n = low + (2^256 - n)
            let (wrapped_limbs, _) = add_limbs(&sum_limbs, &ORDER_COMPLEMENT);
            wrapped_limbs
        } else {
            sum_limbs
        };
        Self::from_limbs_reduced(adjusted_limbs)
    }

    /**
     * Sustracción modular: (self - other) mod n.
     */
    #[inline(always)]
    #[must_use]
    pub fn subtract_mod_n(&self, other: &Self) -> Self {
        let (difference_limbs, borrow_out) = subtract_limbs(&self.scalar_limbs, &other.scalar_limbs);
        if borrow_out {
            let (wrapped_limbs, _) = add_limbs(&difference_limbs, &SECP256K1_CURVE_ORDER_N);
            Self { scalar_limbs: wrapped_limbs }
        } else {
            Self { scalar_limbs: difference_limbs }
        }
    }

    /**
     * Integra una distancia con signo de la manada: (self + delta) mod n.
     */
    #[inline(always)]
    #[must_use]
    pub fn add_signed_mod_n(&self, signed_delta: i128) -> Self {
        if signed_delta >= 0 {
            self.add_mod_n(&Self::from_u128(signed_delta as u128))
        } else {
            self.subtract_mod_n(&Self::from_u128(signed_delta.unsigned_abs()))
        }
    }

    /// Compara el escalar contra el orden n (High-to-Low scan).
    #[inline(always)]
    #[must_use]
    pub fn is_greater_than_or_equal_to_order(&self) -> bool {
        compare_limbs(&self.scalar_limbs, &SECP256K1_CURVE_ORDER_N) != Ordering::Less
    }

    /// Determina si el escalar es nulo.
    #[inline(always)]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        is_zero_limbs(&self.scalar_limbs)
    }

    /// Consulta el bit en la posición solicitada.
    #[inline(always)]
    #[must_use]
    pub fn bit_at(&self, bit_index: u32) -> bool {
        bit_at(&self.scalar_limbs, bit_index)
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_limbs(&self.scalar_limbs, &other.scalar_limbs)
    }
}
