//! Collaborator request payloads
//!
//! Collaborators (name, app and reward registries) authorize their own
//! requests through the ledger. Their parameters are opaque, so they are
//! committed to by digest: `keccak256(domain ∥ 0x00 ∥ params)`. The signed
//! payload is then [`custody_core::collaborator_payload`], a fixed-length,
//! tagged layout that no ledger operation shares.

use crate::ecdsa::keccak256;
use crate::errors::{SignatureError, SignatureResult};
use custody_core::{Identity, Nonce, PackedEncoder};

/// Separator between the domain name and the parameters in the digest input
const DOMAIN_SEPARATOR: u8 = 0x00;

/// Check that `domain` can name a collaborator
pub fn validate_domain(domain: &str) -> SignatureResult<()> {
    if domain.is_empty() || domain.as_bytes().contains(&DOMAIN_SEPARATOR) {
        return Err(SignatureError::InvalidDomain {
            domain: domain.to_string(),
        });
    }
    Ok(())
}

/// Digest committing to a collaborator's domain and packed parameters
pub fn collaborator_digest(domain: &str, params: &[u8]) -> SignatureResult<[u8; 32]> {
    validate_domain(domain)?;
    let input = PackedEncoder::new()
        .string(domain)
        .bytes(&[DOMAIN_SEPARATOR])
        .bytes(params)
        .finish();
    Ok(keccak256(&input))
}

/// Full payload `identity` signs to authorize `params` for `domain`
pub fn collaborator_payload(
    identity: &Identity,
    domain: &str,
    params: &[u8],
    nonce: Nonce,
) -> SignatureResult<Vec<u8>> {
    let digest = collaborator_digest(domain, params)?;
    Ok(custody_core::collaborator_payload(identity, &digest, nonce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use custody_core::SignedOperation;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 20])
    }

    #[test]
    fn domains_do_not_share_digests() {
        let params = b"alice.vda";
        assert_ne!(
            collaborator_digest("name-registry", params).unwrap(),
            collaborator_digest("app-registry", params).unwrap()
        );
        // The separator keeps the split between domain and params unambiguous
        assert_ne!(
            collaborator_digest("ab", b"c").unwrap(),
            collaborator_digest("a", b"bc").unwrap()
        );
    }

    #[test]
    fn empty_or_separator_domains_are_rejected() {
        assert_matches!(
            collaborator_digest("", b"x"),
            Err(SignatureError::InvalidDomain { .. })
        );
        assert_matches!(
            collaborator_digest("name\0registry", b"x"),
            Err(SignatureError::InvalidDomain { .. })
        );
    }

    #[test]
    fn name_shaped_params_do_not_read_as_an_unlock() {
        let identity = id(7);
        let mut params = identity.as_bytes().to_vec();
        params.extend_from_slice(b"storage");

        let payload = collaborator_payload(&identity, "name-registry", &params, 4).unwrap();
        let unlock = SignedOperation::Unlock {
            identity,
            purpose: "storage".to_string(),
        };
        assert_ne!(payload, unlock.payload(4));
        assert_eq!(payload.len(), 85);
    }
}
