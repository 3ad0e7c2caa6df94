// SPDX-License-Identifier: Apache-2.0

use bijux_conformance_model::{canonical_id, group_stem, method_stem, CanonicalId};
use proptest::prelude::*;
use proptest::test_runner::Config;

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn canonical_id_is_deterministic_and_parseable(
        package in "([a-z]{1,6}\\.){0,3}",
        group in "[A-Z][A-Za-z0-9_]{0,12}",
        method in "[a-z][A-Za-z0-9_]{0,12}"
    ) {
        let qualified = format!("{package}{group}");
        let first = canonical_id(&qualified, &method);
        let second = canonical_id(&qualified, &method);
        prop_assert_eq!(&first, &second);
        let reparsed = CanonicalId::parse(first.as_str());
        prop_assert_eq!(reparsed.ok(), Some(first));
    }

    #[test]
    fn canonical_id_is_injective_over_stems(
        a in "[A-Z][A-Za-z0-9_]{0,8}",
        b in "[a-z][A-Za-z0-9_]{0,8}",
        c in "[A-Z][A-Za-z0-9_]{0,8}",
        d in "[a-z][A-Za-z0-9_]{0,8}"
    ) {
        let same_stems = group_stem(&a) == group_stem(&c) && method_stem(&b) == method_stem(&d);
        prop_assert_eq!(canonical_id(&a, &b) == canonical_id(&c, &d), same_stems);
    }

    #[test]
    fn conventional_names_strip_to_stems(
        stem in "[A-Z][A-Za-z0-9]{0,10}",
        action in "[A-Z][A-Za-z0-9]{0,10}"
    ) {
        let id = canonical_id(&format!("{stem}Test"), &format!("test{action}"));
        prop_assert_eq!(id.as_str(), format!("{stem}-{action}"));
    }
}
