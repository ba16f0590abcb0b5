// [libs/domain/models-rs/src/dp.rs]
/*!
 * =================================================================
 * APARATO: DISTINGUISHED POINT CONTRACT (V12.0 - PACKED GOLD)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EMPAQUETADO DISTANCIA+ETIQUETA Y FORMATO DE CABLE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PACKED SOVEREIGNTY: La distancia con signo (complemento a dos de
 *    126 bits) y la etiqueta de manada (2 bits) comparten una palabra
 *    u128, idéntica en RAM, en el work file y en el cable.
 * 2. OFFSET FOLDING: Los sub-enjambres salvajes pliegan su offset en la
 *    distancia antes del envío; la etiqueta nunca necesita más de 2 bits.
 *
 * # Mathematical Proof (Two's Complement 126-bit):
 * Toda distancia alcanzable satisface |d| < 2^125 (rangos <= 2^125),
 * por lo que el complemento a dos de 126 bits es inyectivo y el
 * desempaquetado por extensión de signo es exacto.
 * =================================================================
 */

use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// Máscara del campo de distancia (126 bits).
const DISTANCE_FIELD_MASK: u128 = (1u128 << 126) - 1;
/// Bit de signo dentro del campo de distancia (complemento a dos).
const DISTANCE_SIGN_BIT: u128 = 1u128 << 125;
/// Longitud canónica de una entrada DP en el cable (x: 32 + dist_tag: 16).
pub const DP_WIRE_SIZE: usize = 48;

/// Identidad de la manada que emitió un punto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HerdKind {
    /// Trayectoria de origen conocido: pos = (kmin + d) * G.
    Tame,
    /// Trayectoria del objetivo: pos = P + (offset + d) * G.
    Wild,
}

impl HerdKind {
    /// Proyección a los 2 bits de etiqueta del formato empaquetado.
    #[inline(always)]
    #[must_use]
    pub fn to_tag_bits(self) -> u8 {
        match self {
            HerdKind::Tame => 0,
            HerdKind::Wild => 1,
        }
    }

    /**
     * Reconstrucción desde los bits de etiqueta.
     *
     * # Errors:
     * Los valores 2 y 3 están reservados y se rechazan.
     */
    pub fn from_tag_bits(tag_bits: u8) -> Result<Self, ModelError> {
        match tag_bits {
            0 => Ok(HerdKind::Tame),
            1 => Ok(HerdKind::Wild),
            illegal => Err(ModelError::UnknownHerdTag(illegal)),
        }
    }
}

/**
 * Empaqueta distancia con signo + etiqueta en una palabra u128.
 * Layout: bits [0..2) etiqueta, bits [2..128) distancia (c-a-dos 126 bits).
 */
#[inline(always)]
#[must_use]
pub fn pack_distance_tag(signed_distance: i128, kind: HerdKind) -> u128 {
    debug_assert!(signed_distance.unsigned_abs() < (1u128 << 125));
    let truncated_distance = (signed_distance as u128) & DISTANCE_FIELD_MASK;
    (truncated_distance << 2) | (kind.to_tag_bits() as u128)
}

/**
 * Desempaqueta la palabra dist_tag hacia (distancia con signo, etiqueta).
 *
 * # Errors:
 * Propaga `UnknownHerdTag` para bits de etiqueta reservados.
 */
pub fn unpack_distance_tag(packed_word: u128) -> Result<(i128, HerdKind), ModelError> {
    let kind = HerdKind::from_tag_bits((packed_word & 0b11) as u8)?;
    Ok((unpack_signed_distance(packed_word), kind))
}

/**
 * Extrae la distancia con signo ignorando la etiqueta (infalible).
 * Reservado para trayectorias donde la etiqueta ya fue certificada.
 */
#[inline(always)]
#[must_use]
pub fn unpack_signed_distance(packed_word: u128) -> i128 {
    let raw_distance = (packed_word >> 2) & DISTANCE_FIELD_MASK;
    if raw_distance & DISTANCE_SIGN_BIT != 0 {
        // Extensión de signo desde el bit 125
        (raw_distance | !DISTANCE_FIELD_MASK) as i128
    } else {
        raw_distance as i128
    }
}

/// Punto Distinguido: muestra dispersa de colisión emitida por la manada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedPoint {
    /// Coordenada X completa del punto (Big-Endian).
    pub x: [u8; 32],
    /// Distancia acumulada con signo (offset de sub-enjambre ya plegado).
    pub distance: i128,
    /// Manada emisora.
    pub kind: HerdKind,
}

impl DistinguishedPoint {
    /**
     * Serializa la entrada al formato de cable de 48 bytes:
     * x (32 B, Big-Endian) || dist_tag (16 B, Little-Endian u128).
     */
    #[must_use]
    pub fn to_wire_bytes(&self) -> [u8; DP_WIRE_SIZE] {
        let mut wire_buffer = [0u8; DP_WIRE_SIZE];
        wire_buffer[0..32].copy_from_slice(&self.x);
        let packed_word = pack_distance_tag(self.distance, self.kind);
        wire_buffer[32..48].copy_from_slice(&packed_word.to_le_bytes());
        wire_buffer
    }

    /**
     * Reconstruye una entrada desde el formato de cable.
     *
     * # Errors:
     * - `MalformedWireEntry` ante longitud ilegal.
     * - `UnknownHerdTag` ante bits de etiqueta reservados.
     */
    pub fn from_wire_bytes(wire_bytes: &[u8]) -> Result<Self, ModelError> {
        if wire_bytes.len() != DP_WIRE_SIZE {
            return Err(ModelError::MalformedWireEntry {
                expected: DP_WIRE_SIZE,
                got: wire_bytes.len(),
            });
        }

        let mut x = [0u8; 32];
        x.copy_from_slice(&wire_bytes[0..32]);

        let mut packed_bytes = [0u8; 16];
        packed_bytes.copy_from_slice(&wire_bytes[32..48]);
        let (distance, kind) = unpack_distance_tag(u128::from_le_bytes(packed_bytes))?;

        Ok(Self { x, distance, kind })
    }
}
