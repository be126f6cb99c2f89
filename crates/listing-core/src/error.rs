use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid facet value: {0}")]
    InvalidFacet(String),

    #[error("Catalog query failed: {0}")]
    Query(String),

    #[error("Catalog query timed out after {0} ms")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(Error::Query("service unavailable".into()).to_string(), "Catalog query failed: service unavailable");
        assert_eq!(Error::Timeout(8_000).to_string(), "Catalog query timed out after 8000 ms");
        assert_eq!(Error::InvalidFacet("tier 9".into()).to_string(), "Invalid facet value: tier 9");
        assert_eq!(Error::InvalidConfig("x".into()).to_string(), "Invalid configuration: x");
    }
}
