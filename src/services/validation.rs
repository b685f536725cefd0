/// Checks a target or account name used as a store key suffix.
///
/// Returns the error message on failure so each service can wrap it in its
/// own error type.
pub fn validate_name<'a>(kind: &str, name: &'a str) -> Result<&'a str, String> {
    const MAX_LEN: usize = 128;

    if name.is_empty() {
        return Err(format!("{kind} name cannot be empty"));
    }

    if name.len() > MAX_LEN {
        return Err(format!("{kind} name must be {MAX_LEN} characters or less"));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(format!(
            "{kind} name can only contain letters, numbers, dots, hyphens, and underscores"
        ));
    }

    Ok(name)
}
