//! Cache key derivation.
//!
//! Keys look like `admin/widget/42/{from=archive}`: the resource identity as a
//! lowercase slug, then every forwarded argument in caller order. `reload`
//! never reaches this module, so a reload and a plain call share a key.

use cachefront_core::constants::KEY_SEPARATOR;
use cachefront_core::types::FetchRequest;

/// Turns a resource identity into a lowercase, path-like slug.
///
/// Every run of characters other than letters, digits and `_` becomes one
/// separator; leading and trailing separators are dropped.
pub fn normalize_identity(identity: &str) -> String {
    let mut slug = String::with_capacity(identity.len());
    let mut pending_separator = false;

    for ch in identity.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push(KEY_SEPARATOR);
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Builds the cache key for one lookup.
///
/// Pure: the same identity and request always give the same key.
pub fn build_key(resource_identity: &str, request: &FetchRequest) -> String {
    let mut key = normalize_identity(resource_identity);

    for segment in request.segments() {
        key.push(KEY_SEPARATOR);
        key.push_str(&segment.to_string());
    }

    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachefront_core::types::{ArgValue, CallArguments};
    use proptest::prelude::*;
    use test_case::test_case;

    fn request(args: CallArguments) -> FetchRequest {
        args.into_request().0
    }

    #[test_case("Widget", "widget" ; "simple name")]
    #[test_case("Admin::Widget", "admin/widget" ; "namespaced")]
    #[test_case("line-item", "line/item" ; "dashed")]
    #[test_case("  Order  Line  ", "order/line" ; "padded")]
    #[test_case("widget_v2", "widget_v2" ; "underscore kept")]
    #[test_case("--", "" ; "only separators")]
    fn test_normalize_identity(identity: &str, expected: &str) {
        assert_eq!(normalize_identity(identity), expected);
    }

    #[test]
    fn test_key_for_single_id() {
        let key = build_key("Widget", &request(CallArguments::new().arg(42)));
        assert_eq!(key, "widget/42");
    }

    #[test]
    fn test_key_without_arguments() {
        let key = build_key("Admin::Widget", &request(CallArguments::new()));
        assert_eq!(key, "admin/widget");
    }

    #[test]
    fn test_key_ignores_reload() {
        let plain = build_key("Widget", &request(CallArguments::new().arg(42)));
        let reload = build_key("Widget", &request(CallArguments::new().arg(42).reload(true)));
        assert_eq!(plain, reload);
    }

    #[test]
    fn test_key_includes_options() {
        let key = build_key(
            "Widget",
            &request(
                CallArguments::new()
                    .arg("all")
                    .option("From", "Archive")
                    .option("limit", 10),
            ),
        );
        assert_eq!(key, "widget/all/{from=archive,limit=10}");
    }

    #[test]
    fn test_key_is_lowercase() {
        let key = build_key("Widget", &request(CallArguments::new().arg("ABC")));
        assert_eq!(key, "widget/abc");
    }

    #[test]
    fn test_key_distinguishes_list_from_positional() {
        let list = build_key(
            "Widget",
            &request(CallArguments::new().arg(vec![ArgValue::Int(1), ArgValue::Int(2)])),
        );
        let positional = build_key("Widget", &request(CallArguments::new().arg(1).arg(2)));
        assert_ne!(list, positional);
    }

    #[test]
    fn test_key_distinguishes_large_unsigned_ids() {
        let max = build_key(
            "Widget",
            &request(CallArguments::from_values(vec![serde_json::json!(u64::MAX).into()])),
        );
        let below = build_key(
            "Widget",
            &request(CallArguments::from_values(vec![serde_json::json!(u64::MAX - 1).into()])),
        );

        assert_eq!(max, "widget/18446744073709551615");
        assert_eq!(below, "widget/18446744073709551614");
    }

    #[test]
    fn test_key_distinguishes_large_ids_from_json() {
        let values: Vec<ArgValue> =
            serde_json::from_str("[18446744073709551000, 18446744073709551615]").unwrap();
        let keys: Vec<String> = values
            .into_iter()
            .map(|v| build_key("Widget", &request(CallArguments::new().arg(v))))
            .collect();

        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_key_distinguishes_float_from_int() {
        let float = build_key("Widget", &request(CallArguments::new().arg(1.0)));
        let int = build_key("Widget", &request(CallArguments::new().arg(1)));

        assert_eq!(float, "widget/1.0");
        assert_eq!(int, "widget/1");
    }

    fn arg_value() -> impl Strategy<Value = ArgValue> {
        prop_oneof![
            any::<i64>().prop_map(ArgValue::Int),
            any::<u64>().prop_map(ArgValue::from),
            any::<bool>().prop_map(ArgValue::Bool),
            "[a-zA-Z0-9 _.-]{0,12}".prop_map(ArgValue::Str),
        ]
    }

    proptest! {
        #[test]
        fn prop_key_is_deterministic(
            identity in "[A-Za-z:_ -]{0,16}",
            args in proptest::collection::vec(arg_value(), 0..6),
        ) {
            let first = build_key(&identity, &request(CallArguments::from_values(args.clone())));
            let second = build_key(&identity, &request(CallArguments::from_values(args)));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_key_has_no_uppercase(
            identity in "[A-Za-z:_ -]{0,16}",
            args in proptest::collection::vec(arg_value(), 0..6),
        ) {
            let key = build_key(&identity, &request(CallArguments::from_values(args)));
            prop_assert_eq!(key.to_lowercase(), key);
        }

        #[test]
        fn prop_distinct_integers_give_distinct_keys(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            let ka = build_key("Widget", &request(CallArguments::new().arg(a)));
            let kb = build_key("Widget", &request(CallArguments::new().arg(b)));
            prop_assert_ne!(ka, kb);
        }
    }
}
