//! Thin wrapper over the `log` facade (spec.md §4.2, §4.6): the crate emits
//! diagnostics through `log` and leaves backend choice (or silence) to the
//! embedding application, the way the teacher keeps `log`/tracing backend
//! selection out of library code and only wires a backend in `main.rs`.

/// An XML child tag or enum token was not recognized, and strict mode was
/// off, so the caller fell back to a default.
pub(crate) fn unknown_token(kind: &str, token: &str, context: &str) {
    log::warn!("unknown {kind} {token:?} in {context}, using default");
}

/// A top-level `<finale>` child section was absent; the factory allocated
/// an empty pool in its place (spec.md §4.6 step 3).
pub(crate) fn empty_section(section: &str) {
    log::debug!("section <{section}> absent, allocating empty pool");
}
