// [libs/domain/models-rs/src/scope.rs]
/*!
 * =================================================================
 * APARATO: SEARCH SCOPE CONTRACT (V9.0 - RANGE SOVEREIGN)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN INMUTABLE DEL OBJETIVO ECDLP
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. MERGE IDENTITY: La tupla (P, kmin, kmax, dp, jump_seed) es la
 *    identidad de compatibilidad entre work files y participantes de red.
 * 2. DETERMINISTIC SEED: El jump_seed por defecto se deriva del ancho
 *    del rango, garantizando tablas de salto idénticas sin coordinación.
 * 3. WIDTH SHIELD: Rangos sobre 2^125 se rechazan en la frontera de
 *    configuración (cota del campo de distancia de 126 bits).
 * =================================================================
 */

use crate::errors::ModelError;
use kangaroo_core_math::prelude::*;
use serde::{Deserialize, Serialize};

/// Cota superior del ancho de rango tratable (bits).
pub const MAXIMUM_RANGE_WIDTH_BITS: u32 = 125;

/// Objetivo soberano de la búsqueda: P = k * G con k en [kmin, kmax].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    /// Cota inferior del rango privado (kmin, Big-Endian).
    pub range_start: [u8; 32],
    /// Cota superior del rango privado (kmax, Big-Endian).
    pub range_end: [u8; 32],
    /// Coordenada X de la clave pública objetivo (Big-Endian).
    pub public_key_x: [u8; 32],
    /// Coordenada Y de la clave pública objetivo (Big-Endian).
    pub public_key_y: [u8; 32],
    /// Bits de ceros finales exigidos a un Punto Distinguido.
    pub dp_bits: u8,
    /// Semilla determinista de la tabla de saltos.
    pub jump_seed: u64,
}

impl SearchScope {
    /**
     * Construye y certifica un objetivo de búsqueda.
     *
     * # Errors:
     * - `ScopeViolation` si kmin >= kmax, si el ancho excede 2^125 o si
     *   el punto objetivo no pertenece a la curva.
     */
    pub fn new(
        range_start: [u8; 32],
        range_end: [u8; 32],
        public_key_x: [u8; 32],
        public_key_y: [u8; 32],
        dp_bits: u8,
        jump_seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        let start_limbs = limbs_from_be_bytes(&range_start);
        let end_limbs = limbs_from_be_bytes(&range_end);

        if compare_limbs(&start_limbs, &end_limbs) != std::cmp::Ordering::Less {
            return Err(ModelError::ScopeViolation(
                "RANGE_COLLAPSE: kmin must be strictly below kmax".to_string(),
            ));
        }

        let (width_limbs, _) = subtract_limbs(&end_limbs, &start_limbs);
        if bit_length(&width_limbs) > MAXIMUM_RANGE_WIDTH_BITS {
            return Err(ModelError::ScopeViolation(format!(
                "RANGE_WIDTH_OVERFLOW: {} bits exceed the {} bit distance bound",
                bit_length(&width_limbs),
                MAXIMUM_RANGE_WIDTH_BITS
            )));
        }

        let target_point = AffinePoint::from_coordinates(
            FieldElement::from_bytes_be(&public_key_x),
            FieldElement::from_bytes_be(&public_key_y),
        );
        if !target_point.is_on_curve() {
            return Err(ModelError::ScopeViolation(
                "TARGET_OFF_CURVE: public key does not satisfy the Weierstrass equation".to_string(),
            ));
        }

        let resolved_seed = jump_seed.unwrap_or_else(|| Self::derive_jump_seed(&width_limbs));

        Ok(Self {
            range_start,
            range_end,
            public_key_x,
            public_key_y,
            dp_bits,
            jump_seed: resolved_seed,
        })
    }

    /**
     * Deriva la semilla de salto canónica desde el ancho del rango.
     * Dos participantes independientes computan el mismo valor sin red.
     */
    #[must_use]
    pub fn derive_jump_seed(width_limbs: &U256Limbs) -> u64 {
        width_limbs[0]
            ^ width_limbs[1].rotate_left(13)
            ^ width_limbs[2].rotate_left(29)
            ^ width_limbs[3].rotate_left(43)
            ^ 0x4B414E47_524F4F4Du64
    }

    /// Ancho del espacio de búsqueda: W = kmax - kmin.
    #[must_use]
    pub fn width_limbs(&self) -> U256Limbs {
        let start_limbs = limbs_from_be_bytes(&self.range_start);
        let end_limbs = limbs_from_be_bytes(&self.range_end);
        let (width_limbs, _) = subtract_limbs(&end_limbs, &start_limbs);
        width_limbs
    }

    /// Cota inferior del rango como escalar mod n.
    #[must_use]
    pub fn range_start_scalar(&self) -> Scalar {
        Scalar::from_u256_be(&self.range_start)
    }

    /// Proyección del objetivo al plano afín del motor de manada.
    #[must_use]
    pub fn target_affine(&self) -> AffinePoint {
        AffinePoint::from_coordinates(
            FieldElement::from_bytes_be(&self.public_key_x),
            FieldElement::from_bytes_be(&self.public_key_y),
        )
    }

    /**
     * Reconstruye la clave pública objetivo para los tweaks de siembra.
     *
     * # Errors:
     * Propaga fallos de decodificación SEC1 (imposibles para un scope
     * certificado en construcción).
     */
    pub fn target_public_key(&self) -> Result<SafePublicKey, ModelError> {
        let mut sec1_buffer = [0u8; 65];
        sec1_buffer[0] = 0x04;
        sec1_buffer[1..33].copy_from_slice(&self.public_key_x);
        sec1_buffer[33..65].copy_from_slice(&self.public_key_y);
        Ok(SafePublicKey::from_bytes(&sec1_buffer)?)
    }

    /// Identidad de compatibilidad para merges y handshakes de red.
    #[must_use]
    pub fn is_merge_compatible(&self, other: &Self) -> bool {
        self == other
    }

    /// Operaciones de grupo esperadas para la resolución: 2 * sqrt(W).
    #[must_use]
    pub fn expected_operations(&self) -> f64 {
        2.0 * approximate_f64(&self.width_limbs()).sqrt()
    }
}
