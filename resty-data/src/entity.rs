/// A persisted record type and its field-mapping table.
///
/// `columns()` is the allow-list of assignable input keys: request fields that
/// are not listed here never reach a statement. The entity's serde field names
/// are expected to match its column names.
///
/// # Example
///
/// ```ignore
/// impl Entity for Animal {
///     fn table_name() -> &'static str { "animals" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "legs"] }
/// }
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    fn table_name() -> &'static str;
    fn columns() -> &'static [&'static str];

    fn has_column(name: &str) -> bool {
        Self::columns().contains(&name)
    }
}
