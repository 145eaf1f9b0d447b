//! Property-based tests for the token codec

use chrono::{Duration, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use kamou_shop::backend::auth::{TokenError, TokenMaker};
use kamou_shop::shared::TokenKind;

const KEY: &str = "an-example-signing-key-of-32-bytes!";

fn kind() -> impl Strategy<Value = TokenKind> {
    prop_oneof![Just(TokenKind::Access), Just(TokenKind::Refresh)]
}

proptest! {
    #[test]
    fn test_roundtrip_keeps_user_and_times(
        seed in any::<u128>(),
        kind in kind(),
        secs in 1i64..86_400,
    ) {
        let maker = TokenMaker::new(KEY).unwrap();
        let user_id = Uuid::from_u128(seed);
        let duration = Duration::seconds(secs);

        let (token, _) = maker.create_token(user_id, kind, duration).unwrap();
        let payload = maker.verify_token(&token).unwrap();
        let now = Utc::now();

        prop_assert_eq!(payload.user_id, user_id);
        prop_assert_eq!(payload.kind, kind);
        prop_assert!((now - payload.issued_at).num_milliseconds().abs() <= 1_000);
        prop_assert!((now + duration - payload.expires_at).num_milliseconds().abs() <= 1_000);
    }

    #[test]
    fn test_expired_is_never_invalid(
        kind in kind(),
        secs in 1i64..86_400,
        late_by in 1i64..1_000_000,
    ) {
        let maker = TokenMaker::new(KEY).unwrap();
        let (token, payload) = maker
            .create_token(Uuid::new_v4(), kind, Duration::seconds(secs))
            .unwrap();

        let later = payload.expires_at + Duration::seconds(late_by);
        prop_assert_eq!(maker.verify_token_at(&token, later), Err(TokenError::ExpiredToken));
    }

    #[test]
    fn test_tampered_token_is_invalid(
        kind in kind(),
        segment in 0usize..3,
        position in 0.0f64..1.0,
        expired in any::<bool>(),
    ) {
        let maker = TokenMaker::new(KEY).unwrap();
        let duration = if expired { Duration::seconds(-60) } else { Duration::minutes(15) };
        let (token, _) = maker.create_token(Uuid::new_v4(), kind, duration).unwrap();

        // Flip one character of the chosen segment (header, claims or
        // signature), never its last one: that may only hold padding bits
        let mut start = 0;
        for _ in 0..segment {
            start += token[start..].find('.').unwrap() + 1;
        }
        let end = token[start..].find('.').map_or(token.len(), |dot| start + dot);
        let span = end - 1 - start;
        let index = start + (position * span as f64) as usize;

        let mut bytes = token.into_bytes();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert_eq!(maker.verify_token(&tampered), Err(TokenError::InvalidToken));
    }
}
