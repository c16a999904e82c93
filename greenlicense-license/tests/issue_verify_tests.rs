//! Issuance and verification tests.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{key_pair, now, software, token, with_signature};
use greenlicense_license::{IssueRequest, LicenseError, LicenseKey, issue, verify};
use greenlicense_types::{LicenseVersion, Software, SoftwareId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn acme_tool_license_verifies_with_customer() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let request = IssueRequest::new().customer("cust-42");

    let key = issue(&acme, &pair, &request).unwrap();
    assert!(key.to_text().starts_with("GL2-"));

    let claims = verify(&key.to_text(), &acme, pair.public_key(), now()).unwrap();
    assert_eq!(claims.software_id.as_str(), "acme-tool");
    assert_eq!(claims.software_version, "1.0");
    assert_eq!(claims.software_name.as_deref(), Some("Acme Tool"));
    assert_eq!(claims.customer.as_deref(), Some("cust-42"));
    assert_eq!(claims.expires_at, None);

    let other = software("other-tool", &pair, LicenseVersion::V2);
    let err = verify(&key.to_text(), &other, pair.public_key(), now()).unwrap_err();
    assert!(matches!(
        err,
        LicenseError::SoftwareMismatch { ref expected, ref actual }
            if expected.as_str() == "other-tool" && actual.as_str() == "acme-tool"
    ));
}

#[test]
fn v1_license_verifies() {
    let pair = key_pair("k1", 7);
    let legacy = software("legacy", &pair, LicenseVersion::V1);
    let key = issue(&legacy, &pair, &IssueRequest::new()).unwrap();

    assert!(key.to_text().starts_with("GL1-"));
    let claims = verify(&key.to_text(), &legacy, pair.public_key(), now()).unwrap();
    assert_eq!(claims.version, LicenseVersion::V1);
    assert_eq!(claims.software_name, None);
}

#[test]
fn text_and_token_forms_agree() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new().customer("cust-42")).unwrap();

    let from_text = LicenseKey::parse(&key.to_text()).unwrap();
    let from_token: LicenseKey = key.to_token().parse().unwrap();
    assert_eq!(from_text, key);
    assert_eq!(from_token, key);
    assert!(verify(&key.to_token(), &acme, pair.public_key(), now()).is_ok());
}

#[test]
fn manual_entry_tolerates_case_and_spacing() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new()).unwrap();

    let typed = format!("  {}\n", key.to_text().to_lowercase().replace('-', " - "));
    assert!(verify(&typed, &acme, pair.public_key(), now()).is_ok());
}

#[test]
fn issuing_is_deterministic() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let request = IssueRequest::new().customer("cust-42");
    assert_eq!(
        issue(&acme, &pair, &request).unwrap().to_text(),
        issue(&acme, &pair, &request).unwrap().to_text()
    );
}

#[test]
fn issue_rejects_foreign_key_pair() {
    let pair = key_pair("k1", 7);
    let other = key_pair("k2", 8);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);

    let err = issue(&acme, &other, &IssueRequest::new()).unwrap_err();
    assert!(matches!(err, LicenseError::KeyMismatch { .. }));
}

#[test]
fn key_mismatch_is_checked_before_claims() {
    let pair = key_pair("k1", 7);
    let other = key_pair("k2", 8);
    let legacy = software("legacy", &pair, LicenseVersion::V1);
    let request = IssueRequest::new().customer("cust-42");

    let err = issue(&legacy, &other, &request).unwrap_err();
    assert!(matches!(err, LicenseError::KeyMismatch { .. }));
}

#[test]
fn v1_rejects_customer_and_expiry() {
    let pair = key_pair("k1", 7);
    let legacy = software("legacy", &pair, LicenseVersion::V1);

    let err = issue(&legacy, &pair, &IssueRequest::new().customer("cust-42")).unwrap_err();
    assert!(matches!(
        err,
        LicenseError::UnsupportedClaimForVersion { claim: "customer", version: LicenseVersion::V1 }
    ));

    let err = issue(&legacy, &pair, &IssueRequest::new().expires_at(now())).unwrap_err();
    assert!(matches!(
        err,
        LicenseError::UnsupportedClaimForVersion { claim: "expires_at", .. }
    ));
}

#[test]
fn blank_customer_is_invalid() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let err = issue(&acme, &pair, &IssueRequest::new().customer("   ")).unwrap_err();
    assert!(matches!(err, LicenseError::InvalidClaim { claim: "customer", .. }));
}

#[test]
fn oversized_v1_version_is_invalid() {
    let pair = key_pair("k1", 7);
    let legacy = Software::with_id(
        SoftwareId::new("legacy").unwrap(),
        "Legacy",
        &"9".repeat(300),
        pair.id().clone(),
        LicenseVersion::V1,
    )
    .unwrap();
    let err = issue(&legacy, &pair, &IssueRequest::new()).unwrap_err();
    assert!(matches!(err, LicenseError::InvalidClaim { claim: "software_version", .. }));
}

#[test]
fn expiry_is_enforced_at_boundary() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let expires_at = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
    let key = issue(&acme, &pair, &IssueRequest::new().expires_at(expires_at)).unwrap();
    let text = key.to_text();

    let before = expires_at - Duration::seconds(1);
    let claims = verify(&text, &acme, pair.public_key(), before).unwrap();
    assert_eq!(claims.expires_at, Some(expires_at));

    for at in [expires_at, expires_at + Duration::days(1)] {
        let err = verify(&text, &acme, pair.public_key(), at).unwrap_err();
        assert!(matches!(err, LicenseError::Expired { expired_at } if expired_at == expires_at));
    }
}

#[test]
fn expiry_is_truncated_to_seconds() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let precise = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(750);

    let key = issue(&acme, &pair, &IssueRequest::new().expires_at(precise)).unwrap();
    assert_eq!(
        key.claims().expires_at,
        Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn wrong_public_key_is_signature_invalid() {
    let pair = key_pair("k1", 7);
    let stranger = key_pair("k2", 8);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new()).unwrap();

    let err = verify(&key.to_text(), &acme, stranger.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn identity_is_checked_before_signature() {
    let pair = key_pair("k1", 7);
    let stranger = key_pair("k2", 8);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let other = software("other-tool", &stranger, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new()).unwrap();

    let err = verify(&key.to_text(), &other, stranger.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::SoftwareMismatch { .. }));
}

#[test]
fn signature_is_checked_before_expiry() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new().expires_at(now())).unwrap();

    let forged = token("GL2", &with_signature(&key, [0u8; 64]));
    let later = now() + Duration::days(30);
    let err = verify(&forged, &acme, pair.public_key(), later).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn version_switch_keeps_old_keys_valid() {
    let pair = key_pair("k1", 7);
    let before = software("acme-tool", &pair, LicenseVersion::V1);
    let key = issue(&before, &pair, &IssueRequest::new()).unwrap();

    let after = software("acme-tool", &pair, LicenseVersion::V2);
    let claims = verify(&key.to_text(), &after, pair.public_key(), now()).unwrap();
    assert_eq!(claims.version, LicenseVersion::V1);
}

#[test]
fn cross_version_tags_are_rejected() {
    let pair = key_pair("k1", 7);
    let v1 = issue(&software("acme-tool", &pair, LicenseVersion::V1), &pair, &IssueRequest::new())
        .unwrap();
    let v2 = issue(&software("acme-tool", &pair, LicenseVersion::V2), &pair, &IssueRequest::new())
        .unwrap();
    let acme = software("acme-tool", &pair, LicenseVersion::V2);

    for text in [token("GL2", &v1.to_bytes()), token("GL1", &v2.to_bytes())] {
        let err = verify(&text, &acme, pair.public_key(), now()).unwrap_err();
        assert!(matches!(err, LicenseError::MalformedLicense(_)), "{text}: {err:?}");
    }
}

#[test]
fn unknown_and_missing_tags() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new()).unwrap();
    let body = key.to_text()[4..].to_string();

    let err = verify(&format!("GL3-{body}"), &acme, pair.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::UnknownVersion(ref tag) if tag == "GL3"));

    let err = verify(&body, &acme, pair.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::MalformedLicense(_)));

    let err = verify("", &acme, pair.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::MalformedLicense(_)));
}

#[test]
fn missing_signature_is_malformed() {
    let pair = key_pair("k1", 7);
    let acme = software("acme-tool", &pair, LicenseVersion::V2);
    let key = issue(&acme, &pair, &IssueRequest::new()).unwrap();

    let err =
        verify(&token("GL2", key.signed_bytes()), &acme, pair.public_key(), now()).unwrap_err();
    assert!(matches!(err, LicenseError::MalformedLicense(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn single_bit_flips_never_verify(
        customer in "[a-z0-9-]{1,12}",
        bit in any::<prop::sample::Index>(),
        v1 in any::<bool>(),
    ) {
        let pair = key_pair("k1", 7);
        let version = if v1 { LicenseVersion::V1 } else { LicenseVersion::V2 };
        let acme = software("acme-tool", &pair, version);
        let request = if v1 { IssueRequest::new() } else { IssueRequest::new().customer(customer) };
        let key = issue(&acme, &pair, &request).unwrap();

        let mut bytes = key.to_bytes();
        let bit = bit.index(bytes.len() * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);
        let tag = format!("GL{}", version.as_u8());

        let result = verify(&token(&tag, &bytes), &acme, pair.public_key(), now());
        prop_assert!(
            matches!(
                result,
                Err(LicenseError::SignatureInvalid
                    | LicenseError::MalformedLicense(_)
                    | LicenseError::SoftwareMismatch { .. })
            ),
            "bit {} gave {:?}",
            bit,
            result
        );
    }

    #[test]
    fn issued_keys_verify(
        customer in proptest::option::of("[A-Za-z0-9 ]{0,20}[A-Za-z0-9]"),
        days in proptest::option::of(1i64..3650),
    ) {
        let pair = key_pair("k1", 7);
        let acme = software("acme-tool", &pair, LicenseVersion::V2);
        let mut request = IssueRequest::new();
        request.customer = customer.clone();
        request.expires_at = days.map(|d| now() + Duration::days(d));

        let key = issue(&acme, &pair, &request).unwrap();
        let claims = verify(&key.to_text(), &acme, pair.public_key(), now()).unwrap();
        prop_assert_eq!(claims.customer, customer.map(|c| c.trim().to_string()));
    }
}
