// SPDX-License-Identifier: Apache-2.0

//! Fixed vocabularies used by the assertion graph.

macro_rules! vocabulary {
    ($(#[$meta:meta])* $module:ident, $prefix:literal, $ns:literal { $($name:ident = $local:literal),* $(,)? }) => {
        $(#[$meta])*
        pub mod $module {
            pub const PREFIX: &str = $prefix;
            pub const NS: &str = $ns;
            $(pub const $name: &str = concat!($ns, $local);)*
        }
    };
}

vocabulary!(
    /// Evaluation and Report Language.
    earl, "earl", "http://www.w3.org/ns/earl#" {
        ASSERTION = "Assertion",
        TEST_RESULT = "TestResult",
        TEST_SUBJECT = "TestSubject",
        TEST_CASE = "TestCase",
        SOFTWARE = "Software",
        SUBJECT = "subject",
        ASSERTED_BY = "assertedBy",
        TEST = "test",
        MODE = "mode",
        RESULT = "result",
        OUTCOME = "outcome",
    }
);

vocabulary!(foaf, "foaf", "http://xmlns.com/foaf/0.1/" {
    PERSON = "Person",
    AGENT = "Agent",
    NAME = "name",
    MBOX = "mbox",
    HOMEPAGE = "homepage",
});

vocabulary!(doap, "doap", "http://usefulinc.com/ns/doap#" {
    PROJECT = "Project",
    NAME = "name",
    HOMEPAGE = "homepage",
    DESCRIPTION = "description",
    PROGRAMMING_LANGUAGE = "programming-language",
    DEVELOPER = "developer",
});

vocabulary!(rdf, "rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#" {
    TYPE = "type",
    FIRST = "first",
    REST = "rest",
    NIL = "nil",
});

vocabulary!(rdfs, "rdfs", "http://www.w3.org/2000/01/rdf-schema#" {
    LABEL = "label",
    COMMENT = "comment",
    SEE_ALSO = "seeAlso",
});

vocabulary!(
    /// Test manifest vocabulary.
    mf, "mf", "http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#" {
        MANIFEST = "Manifest",
        NAME = "name",
        ENTRIES = "entries",
        INCLUDE = "include",
    }
);

vocabulary!(
    /// Test description vocabulary; carries the review states.
    td, "td", "http://www.w3.org/2006/03/test-description#" {
        TEST_CASE = "TestCase",
        REVIEW_STATUS = "reviewStatus",
        APPROVED = "approved",
        UNREVIEWED = "unreviewed",
        REJECTED = "rejected",
        ON_HOLD = "onhold",
    }
);

vocabulary!(dcterms, "dcterms", "http://purl.org/dc/terms/" {
    DATE = "date",
    DESCRIPTION = "description",
});

vocabulary!(xsd, "xsd", "http://www.w3.org/2001/XMLSchema#" {
    DATE_TIME = "dateTime",
});

/// Prefix under which the suite namespace is written.
pub const SUITE_PREFIX: &str = "ct";

/// Local names of the terms the suite defines in its own namespace.
pub mod suite_terms {
    pub const CONFORMANCE_LEVEL: &str = "conformanceLevel";
    pub const TEST_METHOD: &str = "testMethod";
    pub const DECLARED_IN_GROUP: &str = "declaredInGroup";
    pub const COVERED_BY_GROUP: &str = "coveredByGroup";
    pub const COVERED_BY_TEST: &str = "coveredByTest";
    pub const COVERING_LEVEL: &str = "coveringLevel";
    pub const EXTENSION: &str = "extension";
}

/// Prefix table for a graph rooted in `suite_namespace`, in the order the
/// serializers write it.
#[must_use]
pub fn standard_prefixes(suite_namespace: &str) -> Vec<(String, String)> {
    [
        (earl::PREFIX, earl::NS),
        (foaf::PREFIX, foaf::NS),
        (doap::PREFIX, doap::NS),
        (rdf::PREFIX, rdf::NS),
        (rdfs::PREFIX, rdfs::NS),
        (mf::PREFIX, mf::NS),
        (td::PREFIX, td::NS),
        (dcterms::PREFIX, dcterms::NS),
        (xsd::PREFIX, xsd::NS),
        (SUITE_PREFIX, suite_namespace),
    ]
    .into_iter()
    .map(|(prefix, ns)| (prefix.to_string(), ns.to_string()))
    .collect()
}
