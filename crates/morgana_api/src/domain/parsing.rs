use common::domain::{Association, DomainResult};

/// Optional association code from a validated request. Blank means none.
pub(crate) fn parse_association(value: Option<&str>) -> DomainResult<Option<Association>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(code) => code.parse().map(Some),
        None => Ok(None),
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_association() {
        assert_eq!(parse_association(None).unwrap(), None);
        assert_eq!(parse_association(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_association(Some("economia")).unwrap(),
            Some(Association::Economia)
        );
        assert!(parse_association(Some("nowhere")).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Anna@Morgana.Example "), "anna@morgana.example");
    }
}
