// [libs/domain/engine/src/stepper.rs]
/*!
 * =================================================================
 * APARATO: HERD BATCH STEPPER (V16.0 - MONTGOMERY SYNERGY)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: AVANCE POR LOTE DE LA MANADA Y EMISIÓN DE DPs
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. AMORTIZED LEAP: Todos los canguros del worker saltan en un único
 *    lote afín; la inversión modular se paga una sola vez por lote.
 * 2. CYCLE SENTINEL: El contador de pasos sin DP detecta ciclos
 *    infructuosos y dispara la resurrección Phoenix del canguro.
 * 3. ZERO ALLOCATION: Los buffers de posiciones, sumandos y magnitudes
 *    se reutilizan entre lotes.
 *
 * # Mathematical Proof (Step Rule):
 * i = low7(x); pos <- pos + J_i; d <- d + s_i. La regla es idéntica
 * para ambas manadas y para cualquier kernel externo certificado.
 * =================================================================
 */

use crate::errors::EngineError;
use crate::herd::Kangaroo;
use crate::jump::JumpTable;
use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_models::dp::DistinguishedPoint;
use kangaroo_domain_models::scope::SearchScope;
use rand::RngCore;

/// Factor del umbral de ciclo infructuoso: C * 2^dp pasos sin DP.
const DEAD_CYCLE_FACTOR: u64 = 8;

/// Contadores locales de un lote de avance.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepStatistics {
    /// Operaciones de grupo ejecutadas.
    pub steps: u64,
    /// Puntos Distinguidos emitidos.
    pub distinguished_points: u64,
    /// Canguros resucitados por ciclos infructuosos.
    pub dead_kangaroos: u64,
}

/// Motor de avance por lote de un segmento de la manada.
pub struct HerdStepper {
    filter: DistinguishedFilter,
    dead_step_threshold: u64,
    positions_buffer: Vec<AffinePoint>,
    addends_buffer: Vec<AffinePoint>,
    magnitudes_buffer: Vec<u128>,
    workspace: BatchAdditionWorkspace,
}

impl HerdStepper {
    /// Construye el stepper calibrado al dp del objetivo.
    #[must_use]
    pub fn new(filter: DistinguishedFilter, herd_capacity: usize) -> Self {
        let dead_step_threshold = DEAD_CYCLE_FACTOR
            .saturating_mul(1u64.checked_shl(filter.dp_bits as u32).unwrap_or(u64::MAX));
        Self {
            filter,
            dead_step_threshold,
            positions_buffer: Vec::with_capacity(herd_capacity),
            addends_buffer: Vec::with_capacity(herd_capacity),
            magnitudes_buffer: Vec::with_capacity(herd_capacity),
            workspace: BatchAdditionWorkspace::with_capacity(herd_capacity),
        }
    }

    /**
     * Avanza todo el segmento de manada un salto (una operación de grupo
     * por canguro) y emite los Puntos Distinguidos alcanzados.
     *
     * # Logic:
     * 1. Selección del salto por low7(x) y carga de buffers.
     * 2. Adición afín por lote con inversión amortizada.
     * 3. Integración de distancias, test DP y centinela de ciclos.
     *
     * # Errors:
     * Propaga fallos aritméticos del lote y de resiembra.
     */
    pub fn advance(
        &mut self,
        herd_segment: &mut [Kangaroo],
        jump_table: &JumpTable,
        scope: &SearchScope,
        entropy_source: &mut impl RngCore,
        emit_distinguished: &mut impl FnMut(DistinguishedPoint),
        statistics: &mut StepStatistics,
    ) -> Result<(), EngineError> {
        if herd_segment.is_empty() {
            return Ok(());
        }

        // 1. SELECCIÓN DE SALTOS (low7 de la coordenada X)
        self.positions_buffer.clear();
        self.addends_buffer.clear();
        self.magnitudes_buffer.clear();

        for kangaroo in herd_segment.iter() {
            let jump_entry = jump_table.entry_for(&kangaroo.position.x.internal_words);
            self.positions_buffer.push(kangaroo.position);
            self.addends_buffer.push(jump_entry.point);
            self.magnitudes_buffer.push(jump_entry.magnitude);
        }

        // 2. SALTO AFÍN POR LOTE (inversión Montgomery amortizada)
        AffineCurveEngine::batch_add_assign(
            &mut self.positions_buffer,
            &self.addends_buffer,
            &mut self.workspace,
        )?;

        // 3. INTEGRACIÓN DE DISTANCIAS Y EMISIÓN DE DPs
        for (kangaroo_index, kangaroo) in herd_segment.iter_mut().enumerate() {
            let landed_position = self.positions_buffer[kangaroo_index];

            if landed_position.is_infinity {
                // Colisión con el punto inverso: trayectoria irrecuperable
                kangaroo.respawn(scope, entropy_source)?;
                statistics.dead_kangaroos += 1;
                continue;
            }

            kangaroo.position = landed_position;
            kangaroo.distance += self.magnitudes_buffer[kangaroo_index] as i128;
            kangaroo.steps_since_last_dp += 1;
            statistics.steps += 1;

            if self.filter.is_distinguished(&kangaroo.position.x.internal_words) {
                emit_distinguished(DistinguishedPoint {
                    x: kangaroo.position.x_bytes_be(),
                    distance: kangaroo.shipped_distance(),
                    kind: kangaroo.kind,
                });
                kangaroo.steps_since_last_dp = 0;
                statistics.distinguished_points += 1;
            } else if kangaroo.steps_since_last_dp > self.dead_step_threshold {
                // Ciclo infructuoso: resurrección Phoenix
                kangaroo.respawn(scope, entropy_source)?;
                statistics.dead_kangaroos += 1;
            }
        }

        Ok(())
    }

    /// Umbral vigente del centinela de ciclos (C * 2^dp).
    #[must_use]
    pub fn dead_step_threshold(&self) -> u64 {
        self.dead_step_threshold
    }
}
