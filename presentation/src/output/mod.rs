//! Output formatting for command results

pub mod console;
pub mod formatter;
pub mod json;

/// One configuration layer as shown by `config-sources`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigSourceLine {
    pub kind: String,
    pub location: String,
    pub found: bool,
}
