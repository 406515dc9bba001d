use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of the base64 encoding of the raw body. The gateway signs
/// the base64 text, not the bytes it sends.
pub fn sign(raw_body: &[u8], secret: &str) -> Option<String> {
    let encoded = STANDARD.encode(raw_body);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(encoded.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify(raw_body: &[u8], signature_header: &str, secret: &str) -> bool {
    match sign(raw_body, secret) {
        Some(expected) => expected
            .as_bytes()
            .ct_eq(signature_header.trim().as_bytes())
            .into(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"type":"SALE_APPROVED","subject":"INT-1"}"#;

    #[test]
    fn accepts_own_signature() {
        let sig = sign(BODY, "whsec").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify(BODY, &sig, "whsec"));
    }

    #[test]
    fn signs_base64_text_not_raw_bytes() {
        let mut mac = HmacSha256::new_from_slice(b"whsec").unwrap();
        mac.update(BODY);
        let over_raw = hex::encode(mac.finalize().into_bytes());
        assert!(!verify(BODY, &over_raw, "whsec"));
    }

    #[test]
    fn any_flipped_byte_fails() {
        let sig = sign(BODY, "whsec").unwrap();

        for i in 0..BODY.len() {
            let mut body = BODY.to_vec();
            body[i] ^= 0x01;
            assert!(!verify(&body, &sig, "whsec"), "body byte {i}");
        }

        for i in 0..sig.len() {
            let mut bytes = sig.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(!verify(BODY, &tampered, "whsec"), "signature byte {i}");
        }

        for i in 0.."whsec".len() {
            let mut secret = b"whsec".to_vec();
            secret[i] ^= 0x01;
            let secret = String::from_utf8(secret).unwrap();
            assert!(!verify(BODY, &sig, &secret), "secret byte {i}");
        }
    }

    #[test]
    fn length_mismatch_fails() {
        let sig = sign(BODY, "whsec").unwrap();
        assert!(!verify(BODY, &sig[..63], "whsec"));
        assert!(!verify(BODY, &format!("{sig}0"), "whsec"));
        assert!(!verify(BODY, "", "whsec"));
    }
}
