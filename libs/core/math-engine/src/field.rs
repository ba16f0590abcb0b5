// [libs/core/math-engine/src/field.rs]
/*!
 * =================================================================
 * APARATO: FINITE FIELD ELEMENT ENGINE (V171.0 - SOLINAS GOLD)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: ARITMÉTICA MODULAR Fp PARA EL HOT-LOOP DE LA MANADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SOLINAS SOVEREIGNTY: Reducción del producto 512-bit plegando la
 *    mitad alta por la constante c = 2^32 + 977, con doble plegado y
 *    sustracción condicional final para residuo canónico.
 * 2. BATCH INVERSION: Truco de Montgomery (productos prefijos + una
 *    inversión Fermat) para amortizar el coste del salto de la manada.
 * 3. NOMINAL PURITY: Erradicación de abreviaciones. 'res' -> 'result_element'.
 *
 * # Mathematical Proof (secp256k1 Field):
 * Opera sobre el cuerpo finito definido por p = 2^256 - 2^32 - 977.
 * Como 2^256 ≡ c (mod p), todo excedente sobre 256 bits se pliega
 * multiplicando por c, preservando la clase de congruencia.
 * =================================================================
 */

use crate::arithmetic::{add_limbs, compare_limbs, subtract_limbs, U256Limbs};
use crate::errors::MathError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// El Primo de la curva secp256k1 (p = 2^256 - 2^32 - 977).
/// Representación en palabras de 64 bits (Little-Endian).
pub const SECP256K1_FIELD_PRIME: U256Limbs = [
    0xFFFFFFFEFFFFFC2F,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
];

/// Constante de plegado Solinas: c = 2^256 mod p = 2^32 + 977.
const SOLINAS_FOLD_CONSTANT: u64 = 0x1000003D1;

/**
 * Elemento del campo finito Fp.
 * Garantiza que el valor siempre resida en el rango [0, p-1].
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldElement {
    /// Representación interna en 4 palabras de 64 bits (Little-Endian).
    pub internal_words: U256Limbs,
}

impl FieldElement {
    /// Elemento neutro aditivo del campo.
    pub const ZERO: Self = Self { internal_words: [0, 0, 0, 0] };
    /// Elemento neutro multiplicativo del campo.
    pub const ONE: Self = Self { internal_words: [1, 0, 0, 0] };

    /// Constructor atómico desde un valor escalar de 64 bits.
    #[inline(always)]
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self { internal_words: [value, 0, 0, 0] }
    }

    /**
     * Constructor desde limbs crudos con reducción canónica.
     *
     * # Mathematical Proof:
     * Cualquier valor de 256 bits es < 2p, por lo que una única
     * sustracción condicional de p garantiza el residuo canónico.
     */
    #[inline(always)]
    #[must_use]
    pub fn from_limbs(raw_limbs: U256Limbs) -> Self {
        let mut result_element = Self { internal_words: raw_limbs };
        if result_element.is_greater_than_or_equal_to_prime() {
            result_element = result_element.perform_internal_subtraction_of_prime();
        }
        result_element
    }

    /// Construye un elemento a partir de un buffer Big-Endian de 32 bytes.
    #[inline(always)]
    #[must_use]
    pub fn from_bytes_be(bytes_input: &[u8; 32]) -> Self {
        Self::from_limbs(crate::arithmetic::limbs_from_be_bytes(bytes_input))
    }

    /// Transforma el elemento en un buffer de bytes Big-Endian.
    #[inline(always)]
    #[must_use]
    pub fn to_bytes_be(&self) -> [u8; 32] {
        crate::arithmetic::limbs_to_be_bytes(&self.internal_words)
    }

    // --- INTERFAZ ARITMÉTICA NOMINAL ---

    /**
     * Adición Modular: (self + other) mod p.
     */
    #[inline(always)]
    #[must_use]
    pub fn add_modular(&self, other: &Self) -> Self {
        let (sum_limbs, carry_out) = add_limbs(&self.internal_words, &other.internal_words);
        let mut result_element = Self { internal_words: sum_limbs };
        if carry_out || result_element.is_greater_than_or_equal_to_prime() {
            result_element = result_element.perform_internal_subtraction_of_prime();
        }
        result_element
    }

    /**
     * Sustracción Modular: (self - other) mod p.
     */
    #[inline(always)]
    #[must_use]
    pub fn subtract_modular(&self, other: &Self) -> Self {
        let (difference_limbs, borrow_out) =
            subtract_limbs(&self.internal_words, &other.internal_words);
        let mut result_element = Self { internal_words: difference_limbs };
        if borrow_out {
            result_element = result_element.perform_internal_addition_of_prime();
        }
        result_element
    }

    /// Negación Modular: (p - self) mod p.
    #[inline(always)]
    #[must_use]
    pub fn negate_modular(&self) -> Self {
        Self::ZERO.subtract_modular(self)
    }

    /**
     * Multiplicación Modular: (self * other) mod p.
     * Producto escolar 256x256 -> 512 seguido de plegado Solinas.
     */
    #[inline(always)]
    #[must_use]
    pub fn multiply_modular(&self, other: &Self) -> Self {
        let product_512 = self.multiply_256x256_to_512(other);
        Self::apply_solinas_reduction(product_512)
    }

    /// Cuadrado Modular: (self^2) mod p.
    #[inline(always)]
    #[must_use]
    pub fn square_modular(&self) -> Self {
        self.multiply_modular(self)
    }

    /**
     * Multiplicación por escalar pequeño (u64) con plegado del limb alto.
     */
    #[inline(always)]
    #[must_use]
    pub fn multiply_by_u64(&self, multiplier: u64) -> Self {
        let mut product_limbs = [0u64; 4];
        let mut carry_propagation: u128 = 0;

        for index in 0..4 {
            let partial_product = (self.internal_words[index] as u128)
                * (multiplier as u128)
                + carry_propagation;
            product_limbs[index] = partial_product as u64;
            carry_propagation = partial_product >> 64;
        }

        Self::fold_overflow_limb(product_limbs, carry_propagation as u64)
    }

    /// Determina si el elemento es nulo.
    #[inline(always)]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.internal_words.iter().all(|&word| word == 0)
    }

    /// Determina la paridad del residuo canónico.
    #[inline(always)]
    #[must_use]
    pub fn is_odd(&self) -> bool {
        (self.internal_words[0] & 1) == 1
    }

    /**
     * Inversión Modular vía Pequeño Teorema de Fermat (a^(p-2) mod p).
     *
     * # Errors:
     * Retorna `MathError::DivisionByZero` para el elemento nulo.
     *
     * # Performance:
     * 256 cuadrados + ~128 multiplicaciones. El coste se amortiza en el
     * Hot-Loop mediante `batch_invert_into`.
     */
    pub fn invert(&self) -> Result<Self, MathError> {
        if self.is_zero() {
            return Err(MathError::DivisionByZero);
        }

        let mut exponent_p_minus_2 = SECP256K1_FIELD_PRIME;
        exponent_p_minus_2[0] -= 2;

        let mut base_accumulator = *self;
        let mut result_element = Self::ONE;

        for &exponent_word in &exponent_p_minus_2 {
            let mut sliding_word = exponent_word;
            for _ in 0..64 {
                if sliding_word & 1 == 1 {
                    result_element = result_element.multiply_modular(&base_accumulator);
                }
                base_accumulator = base_accumulator.square_modular();
                sliding_word >>= 1;
            }
        }

        Ok(result_element)
    }

    /**
     * Inversión por Lote (Truco de Montgomery).
     *
     * Amortiza el coste de la inversión Fermat: k elementos se invierten
     * con 3(k-1) multiplicaciones y una única exponenciación.
     *
     * # Errors:
     * Retorna `MathError::DivisionByZero` si algún elemento del lote es
     * nulo; el llamador debe excluir denominadores degenerados antes.
     */
    pub fn batch_invert_into(
        elements_collection: &[FieldElement],
        results_output: &mut [FieldElement],
        scratch_memory: &mut [FieldElement],
    ) -> Result<(), MathError> {
        let elements_count = elements_collection.len();
        if elements_count == 0 {
            return Ok(());
        }
        debug_assert!(results_output.len() >= elements_count);
        debug_assert!(scratch_memory.len() >= elements_count);

        let mut cumulative_product = FieldElement::ONE;
        for (index, element) in elements_collection.iter().enumerate() {
            if element.is_zero() {
                return Err(MathError::DivisionByZero);
            }
            cumulative_product = cumulative_product.multiply_modular(element);
            scratch_memory[index] = cumulative_product;
        }

        let mut running_inverse = cumulative_product.invert()?;
        for index in (1..elements_count).rev() {
            results_output[index] = running_inverse.multiply_modular(&scratch_memory[index - 1]);
            running_inverse = running_inverse.multiply_modular(&elements_collection[index]);
        }
        results_output[0] = running_inverse;

        Ok(())
    }

    // --- MOTOR SOLINAS CORE ---

    fn multiply_256x256_to_512(&self, other: &Self) -> [u64; 8] {
        let mut product_8words = [0u64; 8];
        for i in 0..4 {
            let mut carry_propagation: u128 = 0;
            for j in 0..4 {
                let partial_product = (self.internal_words[i] as u128)
                    * (other.internal_words[j] as u128)
                    + (product_8words[i + j] as u128)
                    + carry_propagation;
                product_8words[i + j] = partial_product as u64;
                carry_propagation = partial_product >> 64;
            }
            product_8words[i + 4] = carry_propagation as u64;
        }
        product_8words
    }

    /**
     * Plegado Solinas del producto 512-bit: low + high * c, seguido del
     * plegado del limb excedente y sustracción condicional de p.
     */
    fn apply_solinas_reduction(product_512: [u64; 8]) -> Self {
        // 1. PRIMER PLEGADO: accumulator = low + high * c  (5 limbs)
        let mut accumulator_limbs = [0u64; 4];
        let mut overflow_limb: u128 = 0;

        for index in 0..4 {
            let folded_term = (product_512[index + 4] as u128)
                * (SOLINAS_FOLD_CONSTANT as u128)
                + (product_512[index] as u128)
                + overflow_limb;
            accumulator_limbs[index] = folded_term as u64;
            overflow_limb = folded_term >> 64;
        }

        // 2. SEGUNDO PLEGADO: el excedente (< 2^34) se pliega de nuevo por c
        Self::fold_overflow_limb(accumulator_limbs, overflow_limb as u64)
    }

    /**
     * Pliega un limb excedente (valor * 2^256) dentro del residuo de 256 bits.
     */
    #[inline(always)]
    fn fold_overflow_limb(base_limbs: U256Limbs, overflow_limb: u64) -> Self {
        let mut result_limbs = base_limbs;

        let folded_low = (overflow_limb as u128) * (SOLINAS_FOLD_CONSTANT as u128)
            + (result_limbs[0] as u128);
        result_limbs[0] = folded_low as u64;
        let mut carry_propagation = folded_low >> 64;

        let mut limb_index = 1;
        while carry_propagation > 0 && limb_index < 4 {
            let partial_sum = (result_limbs[limb_index] as u128) + carry_propagation;
            result_limbs[limb_index] = partial_sum as u64;
            carry_propagation = partial_sum >> 64;
            limb_index += 1;
        }

        // Un acarreo final implica valor >= 2^256: se pliega una vez más.
        if carry_propagation > 0 {
            let final_fold = (result_limbs[0] as u128) + (SOLINAS_FOLD_CONSTANT as u128);
            result_limbs[0] = final_fold as u64;
            let mut residual_carry = final_fold >> 64;
            let mut index = 1;
            while residual_carry > 0 && index < 4 {
                let partial_sum = (result_limbs[index] as u128) + residual_carry;
                result_limbs[index] = partial_sum as u64;
                residual_carry = partial_sum >> 64;
                index += 1;
            }
        }

        let mut result_element = Self { internal_words: result_limbs };
        if result_element.is_greater_than_or_equal_to_prime() {
            result_element = result_element.perform_internal_subtraction_of_prime();
        }
        result_element
    }

    // --- AUXILIARES TÉCNICOS ---

    #[inline(always)]
    fn is_greater_than_or_equal_to_prime(&self) -> bool {
        compare_limbs(&self.internal_words, &SECP256K1_FIELD_PRIME) != Ordering::Less
    }

    fn perform_internal_subtraction_of_prime(&self) -> Self {
        let (result_limbs, _) = subtract_limbs(&self.internal_words, &SECP256K1_FIELD_PRIME);
        Self { internal_words: result_limbs }
    }

    fn perform_internal_addition_of_prime(&self) -> Self {
        let (result_limbs, _) = add_limbs(&self.internal_words, &SECP256K1_FIELD_PRIME);
        Self { internal_words: result_limbs }
    }
}
