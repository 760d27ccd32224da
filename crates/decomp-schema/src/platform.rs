//! Capability table for common platform runtime types.
//!
//! The analyzed application only declares its own types; the classifier still
//! needs to know that `java.util.ArrayList` is a collection and that
//! `java.lang.String` is serializable.

use crate::node::ExternalType;

pub const SERIALIZABLE: &str = "java.io.Serializable";
pub const COLLECTION: &str = "java.util.Collection";

const NUMBER: &str = "java.lang.Number";
const COMPARABLE: &str = "java.lang.Comparable";
const LIST: &str = "java.util.List";
const SET: &str = "java.util.Set";
const MAP: &str = "java.util.Map";

///
/// PLATFORM_TYPES
/// (type, direct supertypes)
///

pub const PLATFORM_TYPES: &[(&str, &[&str])] = &[
    ("java.lang.Object", &[]),
    (SERIALIZABLE, &[]),
    (COMPARABLE, &[]),
    ("java.lang.CharSequence", &[]),
    ("java.lang.Iterable", &[]),
    ("java.lang.Runnable", &[]),
    ("java.lang.AutoCloseable", &[]),
    ("java.io.Closeable", &["java.lang.AutoCloseable"]),
    // scalars
    (
        "java.lang.String",
        &[SERIALIZABLE, COMPARABLE, "java.lang.CharSequence"],
    ),
    (NUMBER, &[SERIALIZABLE]),
    ("java.lang.Boolean", &[SERIALIZABLE, COMPARABLE]),
    ("java.lang.Character", &[SERIALIZABLE, COMPARABLE]),
    ("java.lang.Byte", &[NUMBER, COMPARABLE]),
    ("java.lang.Short", &[NUMBER, COMPARABLE]),
    ("java.lang.Integer", &[NUMBER, COMPARABLE]),
    ("java.lang.Long", &[NUMBER, COMPARABLE]),
    ("java.lang.Float", &[NUMBER, COMPARABLE]),
    ("java.lang.Double", &[NUMBER, COMPARABLE]),
    ("java.math.BigDecimal", &[NUMBER, COMPARABLE]),
    ("java.math.BigInteger", &[NUMBER, COMPARABLE]),
    ("java.lang.Enum", &[SERIALIZABLE, COMPARABLE]),
    ("java.util.UUID", &[SERIALIZABLE, COMPARABLE]),
    ("java.util.Date", &[SERIALIZABLE, COMPARABLE]),
    ("java.time.Instant", &[SERIALIZABLE, COMPARABLE]),
    ("java.time.Duration", &[SERIALIZABLE, COMPARABLE]),
    ("java.time.LocalDate", &[SERIALIZABLE, COMPARABLE]),
    ("java.time.LocalDateTime", &[SERIALIZABLE, COMPARABLE]),
    ("java.time.LocalTime", &[SERIALIZABLE, COMPARABLE]),
    // collections
    (COLLECTION, &["java.lang.Iterable"]),
    (LIST, &[COLLECTION]),
    (SET, &[COLLECTION]),
    ("java.util.Queue", &[COLLECTION]),
    ("java.util.Deque", &["java.util.Queue"]),
    ("java.util.SortedSet", &[SET]),
    ("java.util.ArrayList", &[LIST, SERIALIZABLE]),
    ("java.util.LinkedList", &[LIST, "java.util.Deque", SERIALIZABLE]),
    ("java.util.HashSet", &[SET, SERIALIZABLE]),
    ("java.util.LinkedHashSet", &["java.util.HashSet"]),
    ("java.util.TreeSet", &["java.util.SortedSet", SERIALIZABLE]),
    ("java.util.ArrayDeque", &["java.util.Deque", SERIALIZABLE]),
    // maps are not collections
    (MAP, &[]),
    ("java.util.HashMap", &[MAP, SERIALIZABLE]),
    ("java.util.LinkedHashMap", &["java.util.HashMap"]),
    ("java.util.TreeMap", &[MAP, SERIALIZABLE]),
    // runtime handles with no transferable state
    ("java.util.Optional", &[]),
    ("java.lang.Thread", &["java.lang.Runnable"]),
    ("java.io.InputStream", &["java.io.Closeable"]),
    ("java.io.OutputStream", &["java.io.Closeable"]),
];

/// Platform capability table as external type entries.
#[must_use]
pub fn platform_types() -> Vec<ExternalType> {
    PLATFORM_TYPES
        .iter()
        .map(|(name, supers)| ExternalType {
            name: (*name).to_string(),
            supertypes: supers.iter().map(|s| (*s).to_string()).collect(),
        })
        .collect()
}
