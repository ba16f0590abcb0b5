// [libs/core/math-engine/src/public_key.rs]
/*!
 * =================================================================
 * APARATO: PUBLIC KEY ENGINE (V18.0 - AFFINE BRIDGE)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: GESTIÓN DE PUNTOS AFINES Y SERIALIZACIÓN SEC1
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. AFFINE BRIDGE: Conversión bit-perfecta hacia/desde 'AffinePoint'
 *    para sembrar la manada y verificar colisiones candidatas.
 * 2. MATHEMATICAL RIGOR: Ajustes escalares (tweaks) delegados al
 *    contexto global pre-computado de la librería subyacente.
 * 3. PERFORMANCE: Marcadores #[inline(always)] en el Hot-Path de siembra.
 * =================================================================
 */

use crate::context::global_context;
use crate::errors::MathError;
use crate::point::AffinePoint;
use crate::private_key::SafePrivateKey;
use secp256k1::{PublicKey, Scalar as TweakScalar};

/// Representa una Clave Pública en la curva secp256k1.
///
/// Es un punto (x, y) que satisface la ecuación de Weierstrass
/// y^2 = x^3 + 7 (mod p). Actúa como el identificador soberano del
/// objetivo del logaritmo discreto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafePublicKey {
    /// El punto de la curva elíptica gestionado por la librería criptográfica subyacente.
    internal_point: PublicKey,
}

impl SafePublicKey {
    /**
     * Deriva una clave pública a partir de una clave privada (Q = k * G).
     *
     * # Mathematical Proof
     * Multiplicación escalar del generador G por el escalar secreto k,
     * utilizando las tablas de pre-cómputo del contexto global.
     */
    #[inline(always)]
    #[must_use]
    pub fn from_private(private_key_handle: &SafePrivateKey) -> Self {
        let context = global_context();
        let point = PublicKey::from_secret_key(context, private_key_handle.as_inner());
        Self { internal_point: point }
    }

    /**
     * Reconstruye una clave pública desde una ráfaga de bytes SEC1
     * (33 bytes comprimidos o 65 no comprimidos).
     *
     * # Errors
     * Retorna `MathError::EllipticCurveError` si los bytes no representan
     * un punto válido en la curva.
     */
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MathError> {
        let point = PublicKey::from_slice(bytes).map_err(MathError::EllipticCurveError)?;
        Ok(Self { internal_point: point })
    }

    /**
     * Ajusta la clave pública sumándole un escalar arbitrario (Q' = Q + s * G).
     *
     * # Mathematical Proof
     * Propiedad homomórfica de la curva: desplaza el logaritmo discreto
     * en s unidades sin conocer el escalar original. Es la operación de
     * siembra de los canguros salvajes.
     *
     * # Errors
     * Retorna error si el escalar desborda el orden n de la curva.
     */
    #[inline(always)]
    pub fn add_scalar(&self, scalar_bytes: &[u8; 32]) -> Result<Self, MathError> {
        let context = global_context();
        let scalar_value = TweakScalar::from_be_bytes(*scalar_bytes)
            .map_err(|_| MathError::InvalidScalar("TWEAK_OVERFLOW".to_string()))?;

        let updated_point = self
            .internal_point
            .add_exp_tweak(context, &scalar_value)
            .map_err(MathError::EllipticCurveError)?;

        Ok(Self { internal_point: updated_point })
    }

    /**
     * Serializa la clave pública al formato binario estándar SEC1.
     *
     * # Arguments
     * * `use_compression` - true: 33 bytes (prefijo + X); false: 65 bytes (0x04 + X + Y).
     */
    #[inline(always)]
    #[must_use]
    pub fn to_bytes(&self, use_compression: bool) -> Vec<u8> {
        if use_compression {
            self.internal_point.serialize().to_vec()
        } else {
            self.internal_point.serialize_uncompressed().to_vec()
        }
    }

    /**
     * Proyecta la clave al plano afín del motor de manada.
     */
    #[inline(always)]
    #[must_use]
    pub fn to_affine(&self) -> AffinePoint {
        let sec1_uncompressed = self.internal_point.serialize_uncompressed();
        // La serialización de la librería es canónica: el punto es válido.
        AffinePoint::from_sec1_uncompressed(&sec1_uncompressed)
            .unwrap_or_else(|_| AffinePoint::infinity())
    }

    /**
     * Reconstruye la clave desde un punto afín del motor de manada.
     *
     * # Errors
     * Retorna `PointAtInfinity` para la identidad del grupo.
     */
    pub fn from_affine(affine_point: &AffinePoint) -> Result<Self, MathError> {
        let sec1_buffer = affine_point.to_sec1_uncompressed()?;
        Self::from_bytes(&sec1_buffer)
    }

    /// Provee acceso por referencia al tipo nativo de la librería criptográfica.
    #[inline(always)]
    #[must_use]
    pub fn as_inner(&self) -> &PublicKey {
        &self.internal_point
    }
}
