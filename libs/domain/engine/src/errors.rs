// [libs/domain/engine/src/errors.rs]
//! =================================================================
//! APARATO: ENGINE ERROR CATALOG (V5.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL MOTOR DE MANADA
//! =================================================================

use thiserror::Error;

/// Catálogo de fallos del motor de resolución lambda.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("MATH_FAULT: {0}")]
    Math(#[from] kangaroo_core_math::errors::MathError),

    #[error("MODEL_FAULT: {0}")]
    Model(#[from] kangaroo_domain_models::errors::ModelError),

    #[error("JUMP_TABLE_COLLAPSE: {0}")]
    JumpTableCollapse(String),

    #[error("HERD_SPAWN_FAULT: {0}")]
    HerdSpawnFault(String),

    #[error("BAD_COLLISION_STORM: {observed} unverifiable collisions (arithmetic bug or corrupt work file)")]
    BadCollisionStorm { observed: u64 },

    #[error("DP_QUEUE_DISCONNECTED: worker channel collapsed")]
    QueueDisconnected,

    #[error("SNAPSHOT_FAULT: {0}")]
    SnapshotFault(String),

    #[error("OUTPUT_SINK_FAULT: {0}")]
    OutputSinkFault(#[from] std::io::Error),
}
