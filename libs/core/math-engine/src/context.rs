// [libs/core/math-engine/src/context.rs]
/*!
 * =================================================================
 * APARATO: GLOBAL CRYPTO CONTEXT (V19.0 - LAMBDA ALIGNED)
 * CLASIFICACIÓN: CORE MATH (L1)
 * RESPONSABILIDAD: SINGLETON DEL CONTEXTO SECP256K1
 * =================================================================
 */

use once_cell::sync::Lazy;
use secp256k1::{All, Secp256k1};

/**
 * Instancia global y estática del contexto de Curva Elíptica.
 *
 * Este Singleton pre-computa las tablas de multiplicación escalar (G * k)
 * durante el primer acceso, optimizando todas las operaciones subsiguientes.
 */
pub static GLOBAL_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/**
 * Provee acceso seguro y de alto rendimiento al contexto global de criptografía.
 *
 * @returns Una referencia estática al motor de secp256k1.
 */
#[inline]
#[must_use]
pub fn global_context() -> &'static Secp256k1<All> {
    &GLOBAL_CONTEXT
}
