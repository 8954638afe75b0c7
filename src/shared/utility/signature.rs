use thiserror::Error;

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;

/// The signature artifacts could not be turned into something the verifier accepts.
///
/// A signature that decodes fine but does not match is not an error; [`verify`] returns
/// `Ok(false)` for that.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to hex decode public key: {0}")]
    PublicKeyEncoding(#[source] hex::FromHexError),
    #[error("failed to hex decode signature: {0}")]
    SignatureEncoding(#[source] hex::FromHexError),
    #[error("public key must be {PUBLIC_KEY_LENGTH} bytes, got {0}")]
    PublicKeyLength(usize),
    #[error("signature must be {SIGNATURE_LENGTH} bytes, got {0}")]
    SignatureLength(usize),
    #[error("failed to verify: {0}")]
    Backend(String),
}

pub fn decode_public_key(public_key: &str) -> Result<Vec<u8>, SignatureError> {
    let bytes = hex::decode(public_key).map_err(SignatureError::PublicKeyEncoding)?;
    if bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(SignatureError::PublicKeyLength(bytes.len()));
    }

    Ok(bytes)
}

fn decode_signature(signature: &str) -> Result<Vec<u8>, SignatureError> {
    let bytes = hex::decode(signature).map_err(SignatureError::SignatureEncoding)?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::SignatureLength(bytes.len()));
    }

    Ok(bytes)
}

/// Checks an Ed25519 `signature` over `timestamp || body` against `public_key`.
///
/// Both the key and the signature are hex strings. The body must be the exact bytes received
/// on the wire.
pub fn verify(
    public_key: &str,
    body: &[u8],
    signature: &str,
    timestamp: &str,
) -> Result<bool, SignatureError> {
    let public_key_bytes = decode_public_key(public_key)?;
    let signature_bytes = decode_signature(signature)?;

    let message = [timestamp.as_bytes(), body].concat();

    nacl::sign::verify(&signature_bytes, &message, &public_key_bytes)
        .map_err(|e| SignatureError::Backend(format!("{e:?}")))
}
