use crate::width::Width;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The oracle has no value for a catalog symbol or layout subject.
    #[error("unresolvable oracle symbol: {0}")]
    Unresolved(String),
    /// The oracle value does not fit the declared width of the constant.
    #[error("value {value} of {name} does not fit the declared width {width}")]
    OutOfRange {
        name: String,
        width: Width,
        value: i128,
    },
    /// A constant name appears more than once in the catalog.
    #[error("duplicate catalog entry: {0}")]
    DuplicateEntry(String),
    /// A constant is listed after an entry of a later group.
    #[error("catalog entry {0} is out of group order")]
    GroupOrder(String),
    /// A layout subject string could not be parsed.
    #[error("invalid layout subject: '{0}'")]
    InvalidSubject(String),
}
