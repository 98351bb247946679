//! Signing key loading.
//!
//! Private keys are read from PEM files in PKCS#8 (`PRIVATE KEY`), PKCS#1
//! (`RSA PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) form. The key type must fit
//! the configured algorithm. If a public key file is configured it must hold
//! the public half of the private key, as SPKI (`PUBLIC KEY`), for RSA also
//! PKCS#1 (`RSA PUBLIC KEY`), or as an X.509 `CERTIFICATE` such as the
//! registry's root certificate bundle.

use std::fs;

use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use regauth_auth::config::SigningConfig;
use regauth_auth::{AuthError, AuthResult, SigningAlgorithm, SigningKeyPair};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use x509_cert::Certificate;
use x509_cert::der::{DecodePem, Encode};

const CERTIFICATE_LABEL: &str = "-----BEGIN CERTIFICATE-----";

/// Loads the configured signing key.
///
/// # Errors
///
/// Returns `AuthError::Configuration` if a file cannot be read or parsed,
/// the key does not fit the algorithm, or the public key does not match.
pub fn load_signing_key(config: &SigningConfig) -> AuthResult<SigningKeyPair> {
    let algorithm = config
        .algorithm()
        .map_err(|e| AuthError::configuration(e.to_string()))?;
    let private_pem = read_pem(&config.private_key_path)?;

    let key_pair = match algorithm {
        SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => {
            let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(&private_pem)
                .or_else(|_| rsa::RsaPrivateKey::from_pkcs1_pem(&private_pem))
                .map_err(|e| key_error(&config.private_key_path, algorithm, e))?;
            SigningKeyPair::from_rsa(&private_key, algorithm, config.key_id_format)
        }
        SigningAlgorithm::ES256 => {
            let secret_key = p256::SecretKey::from_pkcs8_pem(&private_pem)
                .or_else(|_| p256::SecretKey::from_sec1_pem(&private_pem))
                .map_err(|e| key_error(&config.private_key_path, algorithm, e))?;
            SigningKeyPair::from_p256(&secret_key, config.key_id_format)
        }
        SigningAlgorithm::ES384 => {
            let secret_key = p384::SecretKey::from_pkcs8_pem(&private_pem)
                .or_else(|_| p384::SecretKey::from_sec1_pem(&private_pem))
                .map_err(|e| key_error(&config.private_key_path, algorithm, e))?;
            SigningKeyPair::from_p384(&secret_key, config.key_id_format)
        }
    }
    .map_err(|e| AuthError::configuration(e.to_string()))?;

    if let Some(public_key_path) = config.public_key_path.as_deref() {
        let public_der = read_public_key_der(public_key_path, algorithm)?;
        if public_der != key_pair.public_key_der() {
            return Err(AuthError::configuration(format!(
                "public key {public_key_path} does not match private key {}",
                config.private_key_path
            )));
        }
    }

    tracing::info!(
        algorithm = %key_pair.algorithm,
        kid = %key_pair.kid,
        "Signing key loaded"
    );
    Ok(key_pair)
}

fn read_pem(path: &str) -> AuthResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AuthError::configuration(format!("cannot read key file {path}: {e}")))
}

fn key_error(path: &str, algorithm: SigningAlgorithm, err: impl std::fmt::Display) -> AuthError {
    AuthError::configuration(format!("{path} is not a valid {algorithm} private key: {err}"))
}

/// Reads a public key file and returns its DER SubjectPublicKeyInfo.
///
/// The file holds either a bare public key or the X.509 certificate the
/// registry trusts, whose subject key is used.
fn read_public_key_der(path: &str, algorithm: SigningAlgorithm) -> AuthResult<Vec<u8>> {
    let pem = read_pem(path)?;
    let invalid = |e: &dyn std::fmt::Display| {
        AuthError::configuration(format!("{path} is not a valid {algorithm} public key: {e}"))
    };

    let document = if pem.contains(CERTIFICATE_LABEL) {
        let certificate = Certificate::from_pem(pem.as_bytes()).map_err(|e| invalid(&e))?;
        let spki = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| invalid(&e))?;

        match algorithm {
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => {
                rsa::RsaPublicKey::from_public_key_der(&spki)
                    .map_err(|e| invalid(&e))?
                    .to_public_key_der()
            }
            SigningAlgorithm::ES256 => p256::PublicKey::from_public_key_der(&spki)
                .map_err(|e| invalid(&e))?
                .to_public_key_der(),
            SigningAlgorithm::ES384 => p384::PublicKey::from_public_key_der(&spki)
                .map_err(|e| invalid(&e))?
                .to_public_key_der(),
        }
    } else {
        match algorithm {
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => {
                rsa::RsaPublicKey::from_public_key_pem(&pem)
                    .or_else(|_| rsa::RsaPublicKey::from_pkcs1_pem(&pem))
                    .map_err(|e| invalid(&e))?
                    .to_public_key_der()
            }
            SigningAlgorithm::ES256 => p256::PublicKey::from_public_key_pem(&pem)
                .map_err(|e| invalid(&e))?
                .to_public_key_der(),
            SigningAlgorithm::ES384 => p384::PublicKey::from_public_key_pem(&pem)
                .map_err(|e| invalid(&e))?
                .to_public_key_der(),
        }
    }
    .map_err(|e| invalid(&e))?;

    Ok(document.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regauth_auth::KeyIdFormat;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn signing(algorithm: &str, private: &str, public: Option<&str>) -> SigningConfig {
        SigningConfig {
            algorithm: algorithm.to_string(),
            private_key_path: fixture(private),
            public_key_path: public.map(fixture),
            key_id_format: KeyIdFormat::Libtrust,
        }
    }

    #[test]
    fn loads_pkcs8_rsa_with_matching_public_key() {
        let key = load_signing_key(&signing("RS256", "rsa.key", Some("rsa.pub"))).unwrap();
        assert_eq!(key.algorithm, SigningAlgorithm::RS256);
        assert_eq!(
            key.kid,
            "ALSV:KPYL:243M:SCRZ:GO4Z:QEDZ:NPUQ:VWVQ:F3DI:FYSY:2L6V:47RB"
        );
    }

    #[test]
    fn pkcs1_and_pkcs8_rsa_keys_agree() {
        let pkcs8 = load_signing_key(&signing("RS512", "rsa.key", None)).unwrap();
        let pkcs1 = load_signing_key(&signing("RS512", "rsa_pkcs1.key", Some("rsa.pub"))).unwrap();
        assert_eq!(pkcs8.kid, pkcs1.kid);
    }

    #[test]
    fn loads_ec_keys_in_both_encodings() {
        let pkcs8 = load_signing_key(&signing("ES256", "ec256.key", Some("ec256.pub"))).unwrap();
        let sec1 = load_signing_key(&signing("ES256", "ec256_sec1.key", None)).unwrap();
        assert_eq!(
            pkcs8.kid,
            "IUR5:DTVH:QUHS:YRPA:UQBQ:HPYQ:4QYT:IZ3A:K4FO:H6WT:3MVO:JILJ"
        );
        assert_eq!(pkcs8.kid, sec1.kid);
    }

    #[test]
    fn thumbprint_key_ids() {
        let mut config = signing("ES256", "ec256.key", None);
        config.key_id_format = KeyIdFormat::Thumbprint;
        let key = load_signing_key(&config).unwrap();
        assert_eq!(key.kid, "FvpFE5T0MIbFQGBSFoJl0rS0NaK0AYyn0TMvSWU_ffI");
    }

    #[test]
    fn rejects_mismatched_public_key() {
        let err = load_signing_key(&signing("ES256", "ec256_sec1.key", Some("rsa.pub"))).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[test]
    fn accepts_certificate_as_public_key() {
        let from_cert = load_signing_key(&signing("ES256", "ec256.key", Some("ec256.crt"))).unwrap();
        let from_key = load_signing_key(&signing("ES256", "ec256.key", Some("ec256.pub"))).unwrap();
        assert_eq!(from_cert.kid, from_key.kid);

        let rsa = load_signing_key(&signing("RS256", "rsa_pkcs1.key", Some("rsa.crt"))).unwrap();
        assert_eq!(
            rsa.kid,
            "ALSV:KPYL:243M:SCRZ:GO4Z:QEDZ:NPUQ:VWVQ:F3DI:FYSY:2L6V:47RB"
        );
    }

    #[test]
    fn rejects_certificate_for_another_key() {
        let err = load_signing_key(&signing("ES256", "ec256.key", Some("rsa.crt"))).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));

        let err = load_signing_key(&signing("RS256", "rsa.key", Some("ec256.crt"))).unwrap_err();
        assert!(err.to_string().contains("RS256 public key"));
    }

    #[test]
    fn rejects_key_of_wrong_type() {
        let err = load_signing_key(&signing("ES256", "rsa.key", None)).unwrap_err();
        assert!(err.to_string().contains("ES256"));

        let err = load_signing_key(&signing("RS256", "ec256.key", None)).unwrap_err();
        assert!(err.to_string().contains("RS256"));
    }

    #[test]
    fn rejects_missing_file_and_unknown_algorithm() {
        let err = load_signing_key(&signing("RS256", "missing.key", None)).unwrap_err();
        assert!(err.to_string().contains("cannot read key file"));

        let err = load_signing_key(&signing("HS256", "rsa.key", None)).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
