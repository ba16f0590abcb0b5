// [libs/domain/engine/src/jump.rs]
/*!
 * =================================================================
 * APARATO: DETERMINISTIC JUMP TABLE (V11.0 - MEAN BALANCED)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TABLA DE SALTOS PSEUDO-ALEATORIOS DE LA MANADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COORDINATION-FREE DETERMINISM: La tabla se deriva íntegramente de
 *    (jump_seed, W); todo participante del enjambre computa entradas
 *    bit-perfectas sin intercambiar un solo byte.
 * 2. MEAN BALANCING: La entrada 128 equilibra la media aritmética al
 *    valor óptimo M = sqrt(W * pi / 2) / 2 de forma exacta; secuencias
 *    cuyo balance cae fuera de rango se redibujan deterministamente.
 * 3. SYMMETRIC HERDS: Tame y Wild comparten la misma tabla; el índice
 *    de salto es low7(x), idéntico en CPU y en kernels externos.
 *
 * # Mathematical Proof (Optimal Mean):
 * Con saltos de media M = sqrt(W * pi / 2) / 2, el número esperado de
 * operaciones del método lambda alcanza su mínimo teórico ~2*sqrt(W).
 * =================================================================
 */

use crate::errors::EngineError;
use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::scope::SearchScope;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::instrument;

/// Cardinalidad de la tabla de saltos (potencia de dos).
pub const JUMP_TABLE_SIZE: usize = 128;
/// Máscara del índice de salto: low7(x).
const JUMP_INDEX_MASK: u64 = (JUMP_TABLE_SIZE as u64) - 1;
/// Redibujos deterministas máximos antes de declarar colapso.
const MAXIMUM_REDRAW_ATTEMPTS: u32 = 512;

/// Entrada precomputada de la tabla: magnitud escalar y su punto s * G.
#[derive(Debug, Clone, Copy)]
pub struct JumpEntry {
    /// Magnitud del salto (escala en distancia lógica).
    pub magnitude: u128,
    /// Punto precomputado magnitude * G.
    pub point: AffinePoint,
}

/// Tabla de saltos compartida por ambas manadas.
pub struct JumpTable {
    entries: Vec<JumpEntry>,
    mean_magnitude: u128,
}

impl JumpTable {
    /**
     * Deriva la tabla canónica del objetivo de búsqueda.
     *
     * # Logic:
     * 1. Sorteo de 127 magnitudes uniformes en [1, 2M] desde StdRng(jump_seed).
     * 2. La magnitud 128 se fija en 128*M - suma; si cae fuera de
     *    [1, 2^(m+2)) la secuencia completa se redibuja (determinista).
     *
     * # Errors:
     * `JumpTableCollapse` si ninguna secuencia equilibra tras el límite
     * de redibujos (estadísticamente imposible para rangos válidos).
     */
    #[instrument(skip_all, fields(jump_seed = scope.jump_seed))]
    pub fn derive(scope: &SearchScope) -> Result<Self, EngineError> {
        let width_limbs = scope.width_limbs();
        let width_approximation = approximate_f64(&width_limbs);
        if width_approximation < 2.0 {
            return Err(EngineError::JumpTableCollapse(
                "RANGE_TOO_NARROW: width below 2".to_string(),
            ));
        }

        let optimal_mean = Self::optimal_mean_magnitude(&width_limbs);
        let sampling_bound = (optimal_mean * 2).max(2);
        let half_width_bits = (width_approximation.log2() / 2.0).ceil().min(123.0) as u32;
        let balancing_bound = (1u128 << (half_width_bits + 2)).max(4);
        let required_total = optimal_mean
            .checked_mul(JUMP_TABLE_SIZE as u128)
            .ok_or_else(|| EngineError::JumpTableCollapse("MEAN_OVERFLOW".to_string()))?;

        let mut entropy_stream = StdRng::seed_from_u64(scope.jump_seed);
        let mut magnitudes = [0u128; JUMP_TABLE_SIZE];

        let mut balanced = false;
        for _ in 0..MAXIMUM_REDRAW_ATTEMPTS {
            let mut running_sum: u128 = 0;
            for magnitude_slot in magnitudes.iter_mut().take(JUMP_TABLE_SIZE - 1) {
                let raw_draw = ((entropy_stream.next_u64() as u128) << 64)
                    | (entropy_stream.next_u64() as u128);
                *magnitude_slot = raw_draw % sampling_bound + 1;
                running_sum += *magnitude_slot;
            }

            if required_total > running_sum {
                let balancing_magnitude = required_total - running_sum;
                if balancing_magnitude >= 1 && balancing_magnitude < balancing_bound {
                    magnitudes[JUMP_TABLE_SIZE - 1] = balancing_magnitude;
                    balanced = true;
                    break;
                }
            }
        }

        if !balanced {
            return Err(EngineError::JumpTableCollapse(format!(
                "MEAN_BALANCING_EXHAUSTED after {} redraws",
                MAXIMUM_REDRAW_ATTEMPTS
            )));
        }

        // Precomputo de los puntos de salto s_i * G
        let mut entries = Vec::with_capacity(JUMP_TABLE_SIZE);
        for &magnitude in &magnitudes {
            let scalar_bytes = limbs_to_be_bytes(&limbs_from_u128(magnitude));
            let jump_key = SafePrivateKey::from_bytes(&scalar_bytes)
                .map_err(EngineError::Math)?;
            entries.push(JumpEntry {
                magnitude,
                point: SafePublicKey::from_private(&jump_key).to_affine(),
            });
        }

        Ok(Self { entries, mean_magnitude: optimal_mean })
    }

    /// Valor óptimo de la media de salto: M = sqrt(W * pi / 2) / 2.
    #[must_use]
    pub fn optimal_mean_magnitude(width_limbs: &U256Limbs) -> u128 {
        let width_approximation = approximate_f64(width_limbs);
        let optimal_mean = (width_approximation * std::f64::consts::FRAC_PI_2).sqrt() / 2.0;
        (optimal_mean as u128).max(1)
    }

    /// Entrada de salto para la posición actual: índice = low7(x).
    #[inline(always)]
    #[must_use]
    pub fn entry_for(&self, x_limbs: &U256Limbs) -> &JumpEntry {
        &self.entries[(x_limbs[0] & JUMP_INDEX_MASK) as usize]
    }

    /// Media aritmética exacta de las 128 magnitudes.
    #[must_use]
    pub fn mean_magnitude(&self) -> u128 {
        let total: u128 = self.entries.iter().map(|entry| entry.magnitude).sum();
        total / (JUMP_TABLE_SIZE as u128)
    }

    /// Media objetivo utilizada durante el equilibrado.
    #[must_use]
    pub fn target_mean_magnitude(&self) -> u128 {
        self.mean_magnitude
    }

    /// Acceso inmutable a las entradas (verificación de paridad de kernels).
    #[must_use]
    pub fn entries(&self) -> &[JumpEntry] {
        &self.entries
    }
}
