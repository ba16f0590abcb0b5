// [libs/infra/transport/src/errors.rs]
//! =================================================================
//! APARATO: TRANSPORT ERROR CATALOG (V3.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE CABLE
//! =================================================================

use thiserror::Error;

/// Catálogo de fallos del transporte binario del enjambre.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("NETWORK_FAULT: {0}")]
    Io(#[from] std::io::Error),

    #[error("WIRE_TIMEOUT: peer silent beyond the configured window")]
    Timeout,

    #[error("OVERSIZED_FRAME: {0} bytes exceed the DoS guard")]
    OversizedFrame(u32),

    #[error("UNKNOWN_OPCODE: {0:#04X}")]
    UnknownOpcode(u8),

    #[error("MALFORMED_PAYLOAD: {0}")]
    MalformedPayload(String),

    #[error("MODEL_FAULT: {0}")]
    Model(#[from] kangaroo_domain_models::errors::ModelError),
}
