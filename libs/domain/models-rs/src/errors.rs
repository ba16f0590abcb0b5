// [libs/domain/models-rs/src/errors.rs]
//! =================================================================
//! APARATO: DOMAIN MODEL ERRORS (V2.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE CONTRATO
//! =================================================================

use thiserror::Error;

/// Fallos de validación y decodificación de los contratos de dominio.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("UNKNOWN_HERD_TAG: tag bits {0} do not map to a herd")]
    UnknownHerdTag(u8),

    #[error("MALFORMED_WIRE_ENTRY: expected {expected} bytes, got {got}")]
    MalformedWireEntry { expected: usize, got: usize },

    #[error("SCOPE_VIOLATION: {0}")]
    ScopeViolation(String),

    #[error("SIGN_EXTENSION_VIOLATION: signed 256-bit value exceeds the 128-bit distance bound")]
    SignExtensionViolation,

    #[error("MATH_FAULT: {0}")]
    MathFault(#[from] kangaroo_core_math::errors::MathError),
}
