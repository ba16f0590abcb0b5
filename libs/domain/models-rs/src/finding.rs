// [libs/domain/models-rs/src/finding.rs]
/*!
 * =================================================================
 * APARATO: FINDING CONTRACT (V8.0 - COLLISION SEALED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: ARTEFACTO INMUTABLE DEL LOGARITMO RECUPERADO
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Descubrimiento criptográfico certificado: k tal que k * G == P.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Escalar privado recuperado (64 dígitos hexadecimales).
    pub private_key_hex: String,
    /// Clave pública objetivo en formato SEC1 comprimido (hex).
    pub public_key_hex: String,
    /// Número ordinal del hallazgo dentro de la campaña.
    pub candidate_index: u64,
    /// Logaritmo base 2 del volumen de operaciones de grupo invertidas.
    pub operations_log2: f64,
    /// Duración de la resolución en segundos.
    pub elapsed_seconds: u64,
    /// Marca temporal RFC 3339 del sellado.
    pub detected_at: String,
}

impl Finding {
    /**
     * Formatea la línea canónica del archivo de resultados:
     * `Key#<n> [Count 2^<log2>][<time>] Pub:<hex> Priv: 0x<hex>`
     */
    #[must_use]
    pub fn format_output_line(&self) -> String {
        format!(
            "Key#{} [Count 2^{:.1}][{}] Pub:{} Priv: 0x{}\n",
            self.candidate_index,
            self.operations_log2,
            format_elapsed_clock(self.elapsed_seconds),
            self.public_key_hex,
            self.private_key_hex
        )
    }
}

/// Formatea segundos como reloj HH:MM:SS para el archivo de resultados.
#[must_use]
pub fn format_elapsed_clock(elapsed_seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        elapsed_seconds / 3600,
        (elapsed_seconds % 3600) / 60,
        elapsed_seconds % 60
    )
}
