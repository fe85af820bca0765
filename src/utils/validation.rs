use crate::utils::error::{LookupError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Length of the `b-{md5}.iso6523-actorid-upis.` prefix put in front of the SML domain.
pub const SML_HOST_PREFIX_LEN: usize = "b-".len() + 32 + ".iso6523-actorid-upis.".len();

/// Longest SML domain whose derived hostname still fits in 253 characters.
pub const MAX_SML_DOMAIN_LEN: usize = 253 - SML_HOST_PREFIX_LEN;

/// Checks that `domain` is a syntactically valid DNS name (RFC 1123 labels)
/// short enough to carry the SML hostname prefix.
pub fn validate_domain(field_name: &str, domain: &str) -> Result<()> {
    let invalid = |reason: String| LookupError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: domain.to_string(),
        reason,
    };

    if domain.is_empty() {
        return Err(invalid("Domain cannot be empty".to_string()));
    }
    // 完整主機名還要加上 b-<md5>.iso6523-actorid-upis. 前綴
    if domain.trim_end_matches('.').len() > MAX_SML_DOMAIN_LEN {
        return Err(invalid(format!(
            "Domain is longer than {} characters, the SML hostname would exceed 253",
            MAX_SML_DOMAIN_LEN
        )));
    }

    for label in domain.trim_end_matches('.').split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(invalid(format!(
                "Label '{}' must be between 1 and 63 characters",
                label
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid(format!(
                "Label '{}' cannot start or end with a hyphen",
                label
            )));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid(format!(
                "Label '{}' contains characters outside [A-Za-z0-9-]",
                label
            )));
        }
    }

    Ok(())
}
