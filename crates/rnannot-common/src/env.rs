//! Typed environment variable lookups
//!
//! Unset variables fall back to the supplied default. A variable that is set
//! but cannot be parsed is an error: a typo in `BATCH_SIZE` should stop the
//! run instead of quietly using the default.

use crate::error::{CommonError, Result};
use std::env::VarError;
use std::str::FromStr;

/// Read a raw variable, treating "unset" and "empty" the same way.
pub fn var(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(CommonError::NotUnicode(key.to_string())),
    }
}

/// Parse a variable into `T`, or return `default` when it is unset.
pub fn parse_var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| CommonError::invalid_env_var(key, raw.clone(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a comma-separated list; blank items are dropped.
pub fn list_var_or(key: &str, default: &[&str]) -> Result<Vec<String>> {
    let items = match var(key)? {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    };
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_parse_var_or_default_when_unset() {
        std::env::remove_var("RNANNOT_TEST_NUMBER");
        assert_eq!(parse_var_or("RNANNOT_TEST_NUMBER", 7usize).unwrap(), 7);
    }

    #[test]
    #[serial]
    fn test_parse_var_or_reads_value() {
        std::env::set_var("RNANNOT_TEST_NUMBER", " 12 ");
        assert_eq!(parse_var_or("RNANNOT_TEST_NUMBER", 7usize).unwrap(), 12);
        std::env::remove_var("RNANNOT_TEST_NUMBER");
    }

    #[test]
    #[serial]
    fn test_parse_var_or_rejects_garbage() {
        std::env::set_var("RNANNOT_TEST_NUMBER", "twelve");
        let err = parse_var_or("RNANNOT_TEST_NUMBER", 7usize).unwrap_err();
        assert!(matches!(err, CommonError::InvalidEnvVar { ref key, .. } if key == "RNANNOT_TEST_NUMBER"));
        std::env::remove_var("RNANNOT_TEST_NUMBER");
    }

    #[test]
    #[serial]
    fn test_list_var_or() {
        std::env::remove_var("RNANNOT_TEST_LIST");
        assert_eq!(list_var_or("RNANNOT_TEST_LIST", &["GO", "SO"]).unwrap(), vec!["GO", "SO"]);

        std::env::set_var("RNANNOT_TEST_LIST", "GO, ,CL ");
        assert_eq!(list_var_or("RNANNOT_TEST_LIST", &["GO"]).unwrap(), vec!["GO", "CL"]);
        std::env::remove_var("RNANNOT_TEST_LIST");
    }
}
