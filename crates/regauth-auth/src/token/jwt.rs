//! Signing keys for registry tokens.
//!
//! This module turns already-parsed private keys into a [`SigningKeyPair`]
//! that can sign compact tokens and derive the key ID the registry uses to
//! pick the matching trusted key.
//!
//! ## Supported Algorithms
//!
//! - **RS256**, **RS384**, **RS512**: RSA PKCS#1 v1.5 with SHA-2
//! - **ES256**: ECDSA with the P-256 curve
//! - **ES384**: ECDSA with the P-384 curve
//!
//! ## Key IDs
//!
//! - [`KeyIdFormat::Libtrust`]: SHA-256 of the DER SubjectPublicKeyInfo,
//!   truncated to 240 bits, base32 encoded and grouped as
//!   `ABCD:EFGH:...` (12 groups of 4). This is what the registry derives
//!   from the certificates in its trust bundle.
//! - [`KeyIdFormat::Thumbprint`]: RFC 7638 JWK thumbprint.
//!
//! ## Example
//!
//! ```ignore
//! use regauth_auth::token::jwt::{KeyIdFormat, SigningAlgorithm, SigningKeyPair};
//!
//! let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(&pem)?;
//! let key_pair = SigningKeyPair::from_rsa(&private_key, SigningAlgorithm::RS256, KeyIdFormat::Libtrust)?;
//! let token = key_pair.encode(&claims)?;
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use elliptic_curve::sec1::ToEncodedPoint;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while handling keys or compact tokens.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode or sign a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token has expired.
    #[error("Token has expired")]
    Expired,

    /// A registered claim failed validation.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of the failed check.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },

    /// Invalid key format or data, or a key that does not fit the algorithm.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// The algorithm name is not supported.
    #[error("Unsupported signing algorithm: {name}")]
    UnsupportedAlgorithm {
        /// The rejected algorithm name.
        name: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGenerationError`.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGenerationError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if the token itself was rejected.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::Expired | Self::InvalidClaims { .. }
        )
    }

    /// Returns `true` if this is a key-related error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::KeyGenerationError { .. } | Self::InvalidKey { .. } | Self::UnsupportedAlgorithm { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Algorithm
// ============================================================================

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// RSA with SHA-256.
    RS256,
    /// RSA with SHA-384.
    RS384,
    /// RSA with SHA-512.
    RS512,
    /// ECDSA with P-256 and SHA-256.
    ES256,
    /// ECDSA with P-384 and SHA-384.
    ES384,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    /// Returns the algorithm name as used in the token header.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
        }
    }

    /// Returns `true` if this is an RSA-based algorithm.
    #[must_use]
    pub fn is_rsa(&self) -> bool {
        matches!(self, Self::RS256 | Self::RS384 | Self::RS512)
    }

    /// Returns `true` if this is an EC-based algorithm.
    #[must_use]
    pub fn is_ec(&self) -> bool {
        matches!(self, Self::ES256 | Self::ES384)
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            _ => Err(JwtError::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// How the `kid` header is derived from the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyIdFormat {
    /// Docker libtrust fingerprint (`XXXX:XXXX:...`).
    #[default]
    Libtrust,
    /// RFC 7638 JWK thumbprint.
    Thumbprint,
}

// ============================================================================
// Signing Key Pair
// ============================================================================

/// Public key components, kept for key IDs and verification.
enum PublicKeyData {
    Rsa { n: Vec<u8>, e: Vec<u8> },
    Ec { crv: &'static str, x: Vec<u8>, y: Vec<u8> },
}

/// A private key ready to sign tokens, with its public half.
pub struct SigningKeyPair {
    /// Key ID placed in the token header.
    pub kid: String,

    /// Signing algorithm.
    pub algorithm: SigningAlgorithm,

    encoding_key: EncodingKey,
    decoding_key: DecodingKey,

    /// DER-encoded SubjectPublicKeyInfo.
    public_key_der: Vec<u8>,

    public_key_data: PublicKeyData,
}

impl SigningKeyPair {
    /// Builds a key pair from a parsed RSA private key.
    ///
    /// # Errors
    /// Returns an error if `algorithm` is not RSA-based or the key cannot be
    /// re-encoded.
    pub fn from_rsa(
        private_key: &RsaPrivateKey,
        algorithm: SigningAlgorithm,
        kid_format: KeyIdFormat,
    ) -> Result<Self, JwtError> {
        if !algorithm.is_rsa() {
            return Err(JwtError::invalid_key(format!(
                "Algorithm {algorithm} cannot be used with an RSA key"
            )));
        }

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        let public_key = private_key.to_public_key();
        Self::from_rsa_public(encoding_key, &public_key, algorithm, kid_format)
    }

    fn from_rsa_public(
        encoding_key: EncodingKey,
        public_key: &RsaPublicKey,
        algorithm: SigningAlgorithm,
        kid_format: KeyIdFormat,
    ) -> Result<Self, JwtError> {
        let n = public_key.n().to_bytes_be();
        let e = public_key.e().to_bytes_be();
        let decoding_key =
            DecodingKey::from_rsa_components(&URL_SAFE_NO_PAD.encode(&n), &URL_SAFE_NO_PAD.encode(&e))
                .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_key_der = public_key
            .to_public_key_der()
            .map_err(|e| JwtError::invalid_key(e.to_string()))?
            .as_bytes()
            .to_vec();

        Ok(Self::assemble(
            algorithm,
            kid_format,
            encoding_key,
            decoding_key,
            public_key_der,
            PublicKeyData::Rsa { n, e },
        ))
    }

    /// Builds an ES256 key pair from a parsed P-256 secret key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be re-encoded.
    pub fn from_p256(secret_key: &p256::SecretKey, kid_format: KeyIdFormat) -> Result<Self, JwtError> {
        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_key = secret_key.public_key();
        let public_key_der = public_key
            .to_public_key_der()
            .map_err(|e| JwtError::invalid_key(e.to_string()))?
            .as_bytes()
            .to_vec();
        let point = public_key.to_encoded_point(false);

        Self::from_ec_parts(
            SigningAlgorithm::ES256,
            "P-256",
            private_pem.as_bytes(),
            public_key_der,
            point.x().map(|x| x.to_vec()),
            point.y().map(|y| y.to_vec()),
            kid_format,
        )
    }

    /// Builds an ES384 key pair from a parsed P-384 secret key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be re-encoded.
    pub fn from_p384(secret_key: &p384::SecretKey, kid_format: KeyIdFormat) -> Result<Self, JwtError> {
        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_key = secret_key.public_key();
        let public_key_der = public_key
            .to_public_key_der()
            .map_err(|e| JwtError::invalid_key(e.to_string()))?
            .as_bytes()
            .to_vec();
        let point = public_key.to_encoded_point(false);

        Self::from_ec_parts(
            SigningAlgorithm::ES384,
            "P-384",
            private_pem.as_bytes(),
            public_key_der,
            point.x().map(|x| x.to_vec()),
            point.y().map(|y| y.to_vec()),
            kid_format,
        )
    }

    fn from_ec_parts(
        algorithm: SigningAlgorithm,
        crv: &'static str,
        private_pem: &[u8],
        public_key_der: Vec<u8>,
        x: Option<Vec<u8>>,
        y: Option<Vec<u8>>,
        kid_format: KeyIdFormat,
    ) -> Result<Self, JwtError> {
        let x = x.ok_or_else(|| JwtError::invalid_key("Missing x coordinate"))?;
        let y = y.ok_or_else(|| JwtError::invalid_key("Missing y coordinate"))?;

        let encoding_key =
            EncodingKey::from_ec_pem(private_pem).map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let decoding_key =
            DecodingKey::from_ec_components(&URL_SAFE_NO_PAD.encode(&x), &URL_SAFE_NO_PAD.encode(&y))
                .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        Ok(Self::assemble(
            algorithm,
            kid_format,
            encoding_key,
            decoding_key,
            public_key_der,
            PublicKeyData::Ec { crv, x, y },
        ))
    }

    fn assemble(
        algorithm: SigningAlgorithm,
        kid_format: KeyIdFormat,
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        public_key_der: Vec<u8>,
        public_key_data: PublicKeyData,
    ) -> Self {
        let kid = match kid_format {
            KeyIdFormat::Libtrust => libtrust_key_id(&public_key_der),
            KeyIdFormat::Thumbprint => jwk_thumbprint(&public_key_data),
        };

        Self {
            kid,
            algorithm,
            encoding_key,
            decoding_key,
            public_key_der,
            public_key_data,
        }
    }

    /// Generates a new 2048-bit RSA key pair.
    ///
    /// # Errors
    /// Returns an error if key generation fails or algorithm is not RSA-based.
    pub fn generate_rsa(algorithm: SigningAlgorithm) -> Result<Self, JwtError> {
        if !algorithm.is_rsa() {
            return Err(JwtError::invalid_key(format!(
                "Algorithm {algorithm} is not RSA-based"
            )));
        }

        let private_key = RsaPrivateKey::new(&mut OsRng, 2048)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        Self::from_rsa(&private_key, algorithm, KeyIdFormat::default())
    }

    /// Generates a new EC key pair on the curve `algorithm` names.
    ///
    /// # Errors
    /// Returns an error if the algorithm is not EC-based.
    pub fn generate_ec(algorithm: SigningAlgorithm) -> Result<Self, JwtError> {
        match algorithm {
            SigningAlgorithm::ES256 => {
                Self::from_p256(&p256::SecretKey::random(&mut OsRng), KeyIdFormat::default())
            }
            SigningAlgorithm::ES384 => {
                Self::from_p384(&p384::SecretKey::random(&mut OsRng), KeyIdFormat::default())
            }
            other => Err(JwtError::invalid_key(format!(
                "Algorithm {other} is not EC-based"
            ))),
        }
    }

    /// Returns the DER-encoded SubjectPublicKeyInfo.
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Returns the RFC 7638 thumbprint, whatever format `kid` uses.
    #[must_use]
    pub fn thumbprint(&self) -> String {
        jwk_thumbprint(&self.public_key_data)
    }

    /// Signs `claims` into a compact token whose header carries `typ`, `alg`
    /// and `kid`, in that order.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be serialized or signed.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let mut header = Header::new(self.algorithm.to_jwt_algorithm());
        header.kid = Some(self.kid.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Verifies a token signed by this key and checks `iss`, `aud`, `exp`
    /// and `nbf`.
    ///
    /// # Errors
    /// Returns an error if the signature or any checked claim is invalid.
    pub fn decode<T: DeserializeOwned>(
        &self,
        token: &str,
        issuer: &str,
        audience: &str,
    ) -> Result<TokenData<T>, JwtError> {
        let mut validation = Validation::new(self.algorithm.to_jwt_algorithm());
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        decode(token, &self.decoding_key, &validation).map_err(JwtError::from)
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Key IDs
// ============================================================================

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Derives the libtrust key ID from a DER SubjectPublicKeyInfo.
#[must_use]
pub fn libtrust_key_id(public_key_der: &[u8]) -> String {
    let digest = Sha256::digest(public_key_der);
    let encoded = base32_encode(&digest[..30]);

    encoded
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// RFC 4648 base32 without padding.
fn base32_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

fn jwk_thumbprint(public_key: &PublicKeyData) -> String {
    // Required members only, lexicographic order, no whitespace.
    let canonical = match public_key {
        PublicKeyData::Rsa { n, e } => format!(
            r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
            URL_SAFE_NO_PAD.encode(e),
            URL_SAFE_NO_PAD.encode(n)
        ),
        PublicKeyData::Ec { crv, x, y } => format!(
            r#"{{"crv":"{}","kty":"EC","x":"{}","y":"{}"}}"#,
            crv,
            URL_SAFE_NO_PAD.encode(x),
            URL_SAFE_NO_PAD.encode(y)
        ),
    };

    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use p256::pkcs8::DecodePrivateKey;

    pub(crate) const EC256_KEY: &str = include_str!("../../testdata/ec256.key");
    pub(crate) const EC384_KEY: &str = include_str!("../../testdata/ec384.key");
    pub(crate) const RSA_KEY: &str = include_str!("../../testdata/rsa.key");

    pub(crate) fn ec256_key_pair(kid_format: KeyIdFormat) -> SigningKeyPair {
        let secret = p256::SecretKey::from_pkcs8_pem(EC256_KEY).unwrap();
        SigningKeyPair::from_p256(&secret, kid_format).unwrap()
    }

    pub(crate) fn rsa_key_pair(algorithm: SigningAlgorithm) -> SigningKeyPair {
        let private_key = RsaPrivateKey::from_pkcs8_pem(RSA_KEY).unwrap();
        SigningKeyPair::from_rsa(&private_key, algorithm, KeyIdFormat::Libtrust).unwrap()
    }

    #[test]
    fn test_base32_rfc4648_vectors() {
        assert_eq!(base32_encode(b""), "");
        assert_eq!(base32_encode(b"f"), "MY");
        assert_eq!(base32_encode(b"fo"), "MZXQ");
        assert_eq!(base32_encode(b"foo"), "MZXW6");
        assert_eq!(base32_encode(b"foob"), "MZXW6YQ");
        assert_eq!(base32_encode(b"fooba"), "MZXW6YTB");
        assert_eq!(base32_encode(b"foobar"), "MZXW6YTBOI");
    }

    #[test]
    fn test_libtrust_key_id_ec256() {
        let key_pair = ec256_key_pair(KeyIdFormat::Libtrust);
        assert_eq!(key_pair.algorithm, SigningAlgorithm::ES256);
        assert_eq!(
            key_pair.kid,
            "IUR5:DTVH:QUHS:YRPA:UQBQ:HPYQ:4QYT:IZ3A:K4FO:H6WT:3MVO:JILJ"
        );
    }

    #[test]
    fn test_libtrust_key_id_rsa() {
        let key_pair = rsa_key_pair(SigningAlgorithm::RS256);
        assert_eq!(
            key_pair.kid,
            "ALSV:KPYL:243M:SCRZ:GO4Z:QEDZ:NPUQ:VWVQ:F3DI:FYSY:2L6V:47RB"
        );
    }

    #[test]
    fn test_libtrust_key_id_ec384() {
        let secret = p384::SecretKey::from_pkcs8_pem(EC384_KEY).unwrap();
        let key_pair = SigningKeyPair::from_p384(&secret, KeyIdFormat::Libtrust).unwrap();
        assert_eq!(key_pair.algorithm, SigningAlgorithm::ES384);
        assert_eq!(
            key_pair.kid,
            "X6FF:GCUO:ZYAP:IEPI:VQLD:LPN7:RJVW:WE7X:KS3X:J4SA:FG7E:WGJV"
        );
    }

    #[test]
    fn test_thumbprint_key_ids() {
        let ec = ec256_key_pair(KeyIdFormat::Thumbprint);
        assert_eq!(ec.kid, "FvpFE5T0MIbFQGBSFoJl0rS0NaK0AYyn0TMvSWU_ffI");

        let rsa = rsa_key_pair(SigningAlgorithm::RS256);
        assert_eq!(rsa.thumbprint(), "kmEOtO9JFEZcvy-LCaWbc0C6zEpbh9ET61xBgbDqw5M");
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct TestClaims {
        iss: String,
        aud: String,
        exp: i64,
        nbf: i64,
    }

    fn test_claims(exp_offset: i64) -> TestClaims {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        TestClaims {
            iss: "auth.example.com".to_string(),
            aud: "registry.example.com".to_string(),
            exp: now + exp_offset,
            nbf: now - 1,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        for key_pair in [
            ec256_key_pair(KeyIdFormat::Libtrust),
            rsa_key_pair(SigningAlgorithm::RS384),
            SigningKeyPair::generate_ec(SigningAlgorithm::ES384).unwrap(),
        ] {
            let token = key_pair.encode(&test_claims(300)).unwrap();
            assert_eq!(token.split('.').count(), 3);
            assert!(!token.contains('='));

            let data = key_pair
                .decode::<TestClaims>(&token, "auth.example.com", "registry.example.com")
                .unwrap();
            assert_eq!(data.header.kid.as_deref(), Some(key_pair.kid.as_str()));
            assert_eq!(data.header.alg, key_pair.algorithm.to_jwt_algorithm());
        }
    }

    #[test]
    fn test_header_member_order() {
        let key_pair = ec256_key_pair(KeyIdFormat::Libtrust);
        let token = key_pair.encode(&test_claims(300)).unwrap();
        let header = URL_SAFE_NO_PAD
            .decode(token.split('.').next().unwrap())
            .unwrap();
        assert_eq!(
            String::from_utf8(header).unwrap(),
            format!(r#"{{"typ":"JWT","alg":"ES256","kid":"{}"}}"#, key_pair.kid)
        );
    }

    #[test]
    fn test_decode_rejects_other_key() {
        let signer = ec256_key_pair(KeyIdFormat::Libtrust);
        let other = SigningKeyPair::generate_ec(SigningAlgorithm::ES256).unwrap();
        let token = signer.encode(&test_claims(300)).unwrap();

        let err = other
            .decode::<TestClaims>(&token, "auth.example.com", "registry.example.com")
            .unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature));
    }

    #[test]
    fn test_decode_checks_claims() {
        let key_pair = ec256_key_pair(KeyIdFormat::Libtrust);

        let expired = key_pair.encode(&test_claims(-3600)).unwrap();
        let err = key_pair
            .decode::<TestClaims>(&expired, "auth.example.com", "registry.example.com")
            .unwrap_err();
        assert!(matches!(err, JwtError::Expired));

        let token = key_pair.encode(&test_claims(300)).unwrap();
        let err = key_pair
            .decode::<TestClaims>(&token, "auth.example.com", "other.example.com")
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_algorithm_must_match_key_type() {
        let private_key = RsaPrivateKey::from_pkcs8_pem(RSA_KEY).unwrap();
        let err = SigningKeyPair::from_rsa(&private_key, SigningAlgorithm::ES256, KeyIdFormat::Libtrust)
            .unwrap_err();
        assert!(err.is_key_error());

        assert!(SigningKeyPair::generate_ec(SigningAlgorithm::RS256).is_err());
        assert!(SigningKeyPair::generate_rsa(SigningAlgorithm::ES384).is_err());
    }

    #[test]
    fn test_signing_algorithm_parsing() {
        assert_eq!("RS256".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::RS256);
        assert_eq!("es256".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::ES256);
        let err = "HS256".parse::<SigningAlgorithm>().unwrap_err();
        assert!(matches!(err, JwtError::UnsupportedAlgorithm { .. }));
    }

    #[test]
    fn test_signing_algorithm_properties() {
        assert!(SigningAlgorithm::RS512.is_rsa());
        assert!(!SigningAlgorithm::ES256.is_rsa());
        assert!(SigningAlgorithm::ES384.is_ec());
        assert_eq!(SigningAlgorithm::RS512.as_str(), "RS512");
        assert_eq!(SigningAlgorithm::ES256.to_string(), "ES256");
    }

    #[test]
    fn test_key_id_format_serde() {
        let format: KeyIdFormat = serde_json::from_str(r#""thumbprint""#).unwrap();
        assert_eq!(format, KeyIdFormat::Thumbprint);
        assert_eq!(KeyIdFormat::default(), KeyIdFormat::Libtrust);
    }
}
