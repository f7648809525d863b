//! Tag format validation (spec §3 supplement), grounded in the teacher's
//! `repository::validation::validate_tag`.

use regex::Regex;

use crate::error::SmartUnderwriteError;

const MAX_TAG_LEN: usize = 50;

pub fn validate_tag(tag: &str) -> Result<(), SmartUnderwriteError> {
    if tag.is_empty() {
        return Err(SmartUnderwriteError::InvalidTag(
            "tag cannot be empty".to_string(),
        ));
    }

    if tag.len() > MAX_TAG_LEN {
        return Err(SmartUnderwriteError::InvalidTag(format!(
            "tag cannot exceed {} characters",
            MAX_TAG_LEN
        )));
    }

    let re = Regex::new(r"^[a-z][a-z0-9_-]*$").expect("static tag regex is valid");
    if !re.is_match(tag) {
        return Err(SmartUnderwriteError::InvalidTag(format!(
            "invalid tag '{}': must start with a lowercase letter and contain only lowercase letters, digits, underscore, or hyphen",
            tag
        )));
    }

    Ok(())
}
