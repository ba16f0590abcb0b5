// [libs/domain/models-rs/src/herd.rs]
/*!
 * =================================================================
 * APARATO: HERD SNAPSHOT CONTRACT (V4.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: REGISTRO SERIALIZABLE DE UN CANGURO EN PAUSA
 *
 * # Mathematical Proof (Resume Consistency):
 * El registro captura (posición, distancia, etiqueta, offset) bajo la
 * barrera de guardado, por lo que todo DP presente en el archivo es
 * coherente con la posición serializada de su canguro emisor.
 * =================================================================
 */

use crate::dp::HerdKind;
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// Longitud del registro serializado (px 32 + py 32 + dist 32 + tag 1 + offset 32).
pub const HERD_RECORD_WIRE_SIZE: usize = 129;

/// Instantánea serializable de un canguro bajo la barrera de guardado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KangarooSnapshot {
    /// Coordenada X de la posición actual (Big-Endian).
    pub position_x: [u8; 32],
    /// Coordenada Y de la posición actual (Big-Endian).
    pub position_y: [u8; 32],
    /// Distancia acumulada con signo desde el origen de la trayectoria.
    pub distance: i128,
    /// Manada de pertenencia.
    pub kind: HerdKind,
    /// Offset de sub-enjambre salvaje (0 para Tame y para el enjambre local).
    pub wild_offset: i128,
}

impl KangarooSnapshot {
    /// Serializa el registro al formato canónico de 129 bytes.
    #[must_use]
    pub fn to_wire_bytes(&self) -> [u8; HERD_RECORD_WIRE_SIZE] {
        let mut wire_buffer = [0u8; HERD_RECORD_WIRE_SIZE];
        wire_buffer[0..32].copy_from_slice(&self.position_x);
        wire_buffer[32..64].copy_from_slice(&self.position_y);
        wire_buffer[64..96].copy_from_slice(&encode_signed_256_be(self.distance));
        wire_buffer[96] = self.kind.to_tag_bits();
        wire_buffer[97..129].copy_from_slice(&encode_signed_256_be(self.wild_offset));
        wire_buffer
    }

    /**
     * Reconstruye el registro desde el formato canónico.
     *
     * # Errors:
     * Propaga etiquetas reservadas y extensiones de signo ilegales.
     */
    pub fn from_wire_bytes(wire_bytes: &[u8]) -> Result<Self, ModelError> {
        if wire_bytes.len() != HERD_RECORD_WIRE_SIZE {
            return Err(ModelError::MalformedWireEntry {
                expected: HERD_RECORD_WIRE_SIZE,
                got: wire_bytes.len(),
            });
        }

        let mut position_x = [0u8; 32];
        let mut position_y = [0u8; 32];
        let mut distance_bytes = [0u8; 32];
        let mut offset_bytes = [0u8; 32];
        position_x.copy_from_slice(&wire_bytes[0..32]);
        position_y.copy_from_slice(&wire_bytes[32..64]);
        distance_bytes.copy_from_slice(&wire_bytes[64..96]);
        offset_bytes.copy_from_slice(&wire_bytes[97..129]);

        Ok(Self {
            position_x,
            position_y,
            distance: decode_signed_256_be(&distance_bytes)?,
            kind: HerdKind::from_tag_bits(wire_bytes[96])?,
            wild_offset: decode_signed_256_be(&offset_bytes)?,
        })
    }
}

/// Codifica un i128 como 256 bits en complemento a dos (Big-Endian).
#[must_use]
pub fn encode_signed_256_be(signed_value: i128) -> [u8; 32] {
    let mut encoded = [if signed_value < 0 { 0xFF } else { 0x00 }; 32];
    encoded[16..32].copy_from_slice(&(signed_value as u128).to_be_bytes());
    encoded
}

/**
 * Decodifica 256 bits en complemento a dos hacia i128, certificando que
 * la extensión de signo sea canónica (el valor cabe en 128 bits).
 *
 * # Errors:
 * `SignExtensionViolation` ante una extensión ilegal.
 */
pub fn decode_signed_256_be(encoded: &[u8; 32]) -> Result<i128, ModelError> {
    let low_word = u128::from_be_bytes(encoded[16..32].try_into().expect("fixed slice width"));
    let expected_fill = if low_word & (1u128 << 127) != 0 { 0xFF } else { 0x00 };
    if encoded[..16].iter().any(|&byte| byte != expected_fill) {
        return Err(ModelError::SignExtensionViolation);
    }
    Ok(low_word as i128)
}
