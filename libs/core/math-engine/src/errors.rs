// [libs/core/math-engine/src/errors.rs]
//! =================================================================
//! APARATO: MATH ERROR CATALOG (V4.0 - LAMBDA ALIGNED)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS CRIPTOGRÁFICOS Y MODULARES
//! =================================================================

use thiserror::Error;

/// Catálogo soberano de fallos del estrato matemático L1.
#[derive(Error, Debug)]
pub enum MathError {
    #[error("SCALAR_DOMAIN_VIOLATION: {0}")]
    InvalidScalar(String),

    #[error("POINT_DECODE_FAULT: {0}")]
    EllipticCurveError(#[from] secp256k1::Error),

    #[error("FIELD_DIVISION_BY_ZERO: modular inverse of zero requested")]
    DivisionByZero,

    #[error("POINT_AT_INFINITY: affine operation collapsed to the identity element")]
    PointAtInfinity,

    #[error("INVALID_LENGTH: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("HEX_DECODE_FAULT: {0}")]
    HexFault(#[from] hex::FromHexError),

    #[error("RANGE_WIDTH_UNSUPPORTED: {0}")]
    UnsupportedRange(String),
}
