// [libs/core/trapstore/src/filter.rs]
/*!
 * =================================================================
 * APARATO: DISTINGUISHED POINT FILTER (V7.0 - AUTO CALIBRATED)
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: TEST DE DISTINCIÓN Y CALIBRACIÓN AUTOMÁTICA DE dp
 *
 * # Mathematical Proof (DP Density):
 * Un punto es distinguido sii su coordenada X exhibe al menos dp ceros
 * finales; la densidad resultante 2^-dp fija el muestreo disperso del
 * grafo de trayectorias sin alterar la estadística de colisión.
 * =================================================================
 */

use kangaroo_core_math::prelude::*;

/// Cota superior del parámetro dp.
pub const MAXIMUM_DP_BITS: u8 = 32;

/// Filtro inmutable de Puntos Distinguidos.
#[derive(Debug, Clone, Copy)]
pub struct DistinguishedFilter {
    /// Bits de ceros finales exigidos a la coordenada X.
    pub dp_bits: u8,
}

impl DistinguishedFilter {
    /// Construye el filtro con el dp indicado (saturado a la cota).
    #[must_use]
    pub fn new(dp_bits: u8) -> Self {
        Self { dp_bits: dp_bits.min(MAXIMUM_DP_BITS) }
    }

    /**
     * Calibración automática: dp tal que cada canguro emita en promedio
     * un DP por cada sqrt(W)/2^dp pasos, acotando la sobrecarga de RAM.
     *
     * Regla: dp = clamp(floor(log2(sqrt(W) / (2 * herd_size))) - 1, 0, 32).
     * Se fija una única vez, en la construcción del motor, a partir del
     * tamaño final de la manada.
     */
    #[must_use]
    pub fn auto_calibrated(width_limbs: &U256Limbs, herd_size: usize) -> Self {
        let width_approximation = approximate_f64(width_limbs);
        let herd_denominator = (2 * herd_size.max(1)) as f64;
        let density_exponent = (width_approximation.sqrt() / herd_denominator).log2();

        let calibrated_bits = if density_exponent.is_finite() {
            (density_exponent.floor() as i64 - 1).clamp(0, MAXIMUM_DP_BITS as i64) as u8
        } else {
            0
        };

        Self { dp_bits: calibrated_bits }
    }

    /// Test de distinción sobre los limbs de la coordenada X.
    #[inline(always)]
    #[must_use]
    pub fn is_distinguished(&self, x_limbs: &U256Limbs) -> bool {
        trailing_zero_bits(x_limbs) >= self.dp_bits as u32
    }

    /// Test de distinción sobre la coordenada X serializada (Big-Endian).
    #[inline(always)]
    #[must_use]
    pub fn is_distinguished_bytes(&self, x_bytes: &[u8; 32]) -> bool {
        self.is_distinguished(&limbs_from_be_bytes(x_bytes))
    }
}
