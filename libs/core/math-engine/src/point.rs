// [libs/core/math-engine/src/point.rs]
/*!
 * =================================================================
 * APARATO: GEOMETRIC POINT ENGINE (V64.0 - AFFINE SOVEREIGN)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: GESTIÓN DE PUNTOS AFINES Y SERIALIZACIÓN SEC1
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. AFFINE CANON: La manada opera en coordenadas afines puras; la
 *    inversión del denominador se amortiza por lote en el motor de curva.
 * 2. NOMINAL SYNC: Sincronización absoluta con el estándar Big-Endian
 *    del motor de campo modular Fp.
 * 3. HYGIENE: Identidad del grupo modelada con bandera explícita.
 *
 * # Mathematical Proof (Weierstrass Form):
 * Todo punto finito (x, y) satisface y^2 = x^3 + 7 (mod p). La identidad
 * del grupo se representa fuera del plano mediante 'is_infinity'.
 * =================================================================
 */

use crate::errors::MathError;
use crate::field::FieldElement;

/// Coordenada X del generador G de secp256k1 (limbs Little-Endian).
pub const GENERATOR_X: [u64; 4] = [
    0x59F2815B16F81798,
    0x029BFCDB2DCE28D9,
    0x55A06295CE870B07,
    0x79BE667EF9DCBBAC,
];

/// Coordenada Y del generador G de secp256k1 (limbs Little-Endian).
pub const GENERATOR_Y: [u64; 4] = [
    0x9C47D08FFB10D4B8,
    0xFD17B448A6855419,
    0x5DA4FBFC0E1108A8,
    0x483ADA7726A3C465,
];

/// Término independiente de la ecuación de Weierstrass (b = 7).
const CURVE_CONSTANT_B: FieldElement = FieldElement { internal_words: [7, 0, 0, 0] };

/// Punto afín de la curva secp256k1 (o la identidad del grupo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinePoint {
    /// Coordenada X en el plano afín.
    pub x: FieldElement,
    /// Coordenada Y en el plano afín.
    pub y: FieldElement,
    /// Indicador de la identidad del grupo (Punto al Infinito).
    pub is_infinity: bool,
}

impl AffinePoint {
    /// Construye la identidad del grupo.
    #[inline(always)]
    #[must_use]
    pub const fn infinity() -> Self {
        Self {
            x: FieldElement::ZERO,
            y: FieldElement::ZERO,
            is_infinity: true,
        }
    }

    /// Construye un punto finito desde sus coordenadas de campo.
    #[inline(always)]
    #[must_use]
    pub const fn from_coordinates(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, is_infinity: false }
    }

    /// El generador canónico G de secp256k1.
    #[inline(always)]
    #[must_use]
    pub fn generator() -> Self {
        Self {
            x: FieldElement { internal_words: GENERATOR_X },
            y: FieldElement { internal_words: GENERATOR_Y },
            is_infinity: false,
        }
    }

    /// Refleja el punto sobre el eje X: (x, -y).
    #[inline(always)]
    #[must_use]
    pub fn negate(&self) -> Self {
        if self.is_infinity {
            return *self;
        }
        Self {
            x: self.x,
            y: self.y.negate_modular(),
            is_infinity: false,
        }
    }

    /**
     * Certifica la pertenencia del punto a la curva: y^2 == x^3 + 7.
     * La identidad del grupo se considera trivialmente válida.
     */
    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity {
            return true;
        }
        let left_hand_side = self.y.square_modular();
        let right_hand_side = self
            .x
            .square_modular()
            .multiply_modular(&self.x)
            .add_modular(&CURVE_CONSTANT_B);
        left_hand_side == right_hand_side
    }

    /**
     * Serializa el punto al formato SEC1 no comprimido (0x04 || X || Y).
     *
     * # Errors:
     * Retorna `MathError::PointAtInfinity` para la identidad, que carece
     * de representación SEC1.
     */
    pub fn to_sec1_uncompressed(&self) -> Result<[u8; 65], MathError> {
        if self.is_infinity {
            return Err(MathError::PointAtInfinity);
        }
        let mut sec1_buffer = [0u8; 65];
        sec1_buffer[0] = 0x04;
        sec1_buffer[1..33].copy_from_slice(&self.x.to_bytes_be());
        sec1_buffer[33..65].copy_from_slice(&self.y.to_bytes_be());
        Ok(sec1_buffer)
    }

    /**
     * Reconstruye un punto desde el formato SEC1 no comprimido.
     *
     * # Errors:
     * - `InvalidLength` si el buffer no mide 65 bytes.
     * - `InvalidScalar` si el prefijo es ilegal o el punto no pertenece a la curva.
     */
    pub fn from_sec1_uncompressed(sec1_bytes: &[u8]) -> Result<Self, MathError> {
        if sec1_bytes.len() != 65 {
            return Err(MathError::InvalidLength { expected: 65, got: sec1_bytes.len() });
        }
        if sec1_bytes[0] != 0x04 {
            return Err(MathError::InvalidScalar("SEC1_PREFIX_VIOLATION".to_string()));
        }

        let mut x_bytes = [0u8; 32];
        let mut y_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&sec1_bytes[1..33]);
        y_bytes.copy_from_slice(&sec1_bytes[33..65]);

        let candidate_point = Self::from_coordinates(
            FieldElement::from_bytes_be(&x_bytes),
            FieldElement::from_bytes_be(&y_bytes),
        );

        if !candidate_point.is_on_curve() {
            return Err(MathError::InvalidScalar("POINT_OFF_CURVE".to_string()));
        }

        Ok(candidate_point)
    }

    /// Coordenada X en bytes Big-Endian (huella para el TrapStore).
    #[inline(always)]
    #[must_use]
    pub fn x_bytes_be(&self) -> [u8; 32] {
        self.x.to_bytes_be()
    }
}
