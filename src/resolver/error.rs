use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cannot resolve a reference reservoir for '{city_key}': the candidate set is empty")]
    NoCandidates { city_key: String },
}
