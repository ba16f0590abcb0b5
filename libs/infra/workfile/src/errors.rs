// [libs/infra/workfile/src/errors.rs]
//! =================================================================
//! APARATO: WORK FILE ERROR CATALOG (V6.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE PERSISTENCIA
//! =================================================================

use thiserror::Error;

/// Catálogo de fallos del codec de work files.
#[derive(Error, Debug)]
pub enum WorkFileError {
    #[error("IO_VAULT_FAULT: {0}")]
    Io(#[from] std::io::Error),

    #[error("INTEGRITY_VIOLATION: {0}")]
    IntegrityViolation(String),

    #[error("SCOPE_MISMATCH: {0}")]
    ScopeMismatch(String),

    #[error("UNSUPPORTED_SHAPE: {0}")]
    UnsupportedShape(String),

    #[error("MODEL_FAULT: {0}")]
    Model(#[from] kangaroo_domain_models::errors::ModelError),
}
