// [libs/core/math-engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CORE MATH MASTER HUB (V38.0 - LAMBDA SYNC)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: ORQUESTACIÓN DE PRIMITIVAS MODULARES Y AFINES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. STRATA REGISTRATION: Registra los módulos del plano afín y la
 *    inversión por lote que alimentan el salto de la manada.
 * 2. NOMINAL PRELUDE ALIGNMENT: Exportación unificada de aritmética,
 *    campo, escalares y geometría bajo el preludio soberano.
 * 3. HYGIENE: Cero advertencias de compilación.
 *
 * # Mathematical Proof (Modular Integrity):
 * Este aparato actúa como el nodo raíz del grafo matemático, asegurando
 * que la ley de grupo y la aritmética de campo sean bit-perfectas a
 * través de todos los hilos de computación del enjambre.
 * =================================================================
 */

/// Operaciones aritméticas U256 crudas sobre limbs de 64 bits (L1-Core).
pub mod arithmetic;
/// Singleton del contexto secp256k1 para pre-cómputo de tablas dinámicas.
pub mod context;
/// Ley de grupo afín y adición por lote con inversión amortizada.
pub mod curve;
/// Catálogo de fallos criptográficos y matemáticos del sistema.
pub mod errors;
/// Aritmética de campo modular Fp con reducción Solinas.
pub mod field;
/// Estructuras de puntos afines y serialización SEC1.
pub mod point;
/// Gestión segura de escalares secretos (Private Keys).
pub mod private_key;
/// Gestión de puntos afines y serialización SEC1 (Public Keys).
pub mod public_key;
/// Aritmética modulo n (Orden de la curva secp256k1).
pub mod scalar;

/**
 * PRELUDIO MATEMÁTICO SOBERANO
 *
 * Única autoridad de importación autorizada para los estratos superiores
 * (L2-Engine y L3-Apps). Centraliza la nomenclatura nominal.
 */
pub mod prelude {
    // Aritmética U256 cruda
    pub use crate::arithmetic::{
        add_limbs, approximate_f64, bit_at, bit_length, compare_limbs, is_zero_limbs,
        limbs_from_be_bytes, limbs_from_hex, limbs_from_u128, limbs_to_be_bytes, limbs_to_hex,
        limbs_to_u128, random_limbs_below, subtract_limbs, trailing_zero_bits, U256Limbs,
        U256_BYTE_SIZE,
    };

    // Estructuras Geométricas y de Campo
    pub use crate::curve::{AffineCurveEngine, BatchAdditionWorkspace};
    pub use crate::field::{FieldElement, SECP256K1_FIELD_PRIME};
    pub use crate::point::AffinePoint;

    // Primitivas de Identidad Criptográfica
    pub use crate::errors::MathError;
    pub use crate::private_key::SafePrivateKey;
    pub use crate::public_key::SafePublicKey;
    pub use crate::scalar::{Scalar, SECP256K1_CURVE_ORDER_N};
}
