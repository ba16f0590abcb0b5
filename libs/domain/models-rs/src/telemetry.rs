// [libs/domain/models-rs/src/telemetry.rs]
/*!
 * =================================================================
 * APARATO: PROGRESS TELEMETRY CONTRACT (V5.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: INSTANTÁNEA DE PROGRESO PARA EL REPORTE 1 HZ
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Instantánea inmutable del avance de la campaña.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Operaciones de grupo ejecutadas por la manada local.
    pub total_steps: u64,
    /// Puntos Distinguidos aceptados en el almacén de trampas.
    pub total_distinguished_points: u64,
    /// Canguros reemplazados por ciclos infructuosos.
    pub dead_kangaroo_count: u64,
    /// Fusiones de trayectoria dentro de la misma manada (stalls).
    pub same_herd_fusion_count: u64,
    /// Colisiones candidatas cuya verificación falló.
    pub bad_collision_count: u64,
    /// Operaciones esperadas para la resolución (2 * sqrt(W)).
    pub expected_operations: f64,
    /// Segundos transcurridos desde la ignición (acumulando resumes).
    pub elapsed_seconds: u64,
}

impl ProgressSnapshot {
    /// Progreso estimado de la campaña en [0, 1].
    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        if self.expected_operations <= 0.0 {
            return 0.0;
        }
        (self.total_steps as f64 / self.expected_operations).min(1.0)
    }

    /// ETA en segundos derivada de la tasa de operaciones observada.
    #[must_use]
    pub fn estimated_remaining_seconds(&self) -> Option<f64> {
        if self.elapsed_seconds == 0 || self.total_steps == 0 {
            return None;
        }
        let observed_rate = self.total_steps as f64 / self.elapsed_seconds as f64;
        let remaining_operations = (self.expected_operations - self.total_steps as f64).max(0.0);
        Some(remaining_operations / observed_rate)
    }
}
