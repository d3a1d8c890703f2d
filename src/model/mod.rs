/// Box geometry and text style of one field.
pub mod field;
/// Record values.
pub mod record;
/// Columns with their boxes and styles.
pub mod template;
