//! Turns known backend failure messages into actionable hints.

/// Specific advice for a recognised start failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    /// The backend rejected the pre-configured credentials.
    Authentication,
    /// The backend could not find the image build definition.
    MissingBuildDefinition,
}

impl Guidance {
    pub fn hint(self) -> &'static str {
        match self {
            Guidance::Authentication => {
                "Authentication error. Please check the API credentials configured for the panel."
            }
            Guidance::MissingBuildDefinition => {
                "The Dockerfile could not be found. Check the path of the Mini Shell project."
            }
        }
    }
}

/// Best-effort classification of a failure message. `None` means the raw
/// message is all the visitor gets.
pub fn classify_failure(message: &str) -> Option<Guidance> {
    let lower = message.to_lowercase();
    if lower.contains("authentication") || lower.contains("authentification") {
        Some(Guidance::Authentication)
    } else if lower.contains("dockerfile") {
        Some(Guidance::MissingBuildDefinition)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_detected() {
        assert_eq!(
            classify_failure("authentication failed"),
            Some(Guidance::Authentication)
        );
        assert_eq!(
            classify_failure("Erreur d'authentification"),
            Some(Guidance::Authentication)
        );
        assert!(Guidance::Authentication.hint().contains("Authentication"));
    }

    #[test]
    fn test_dockerfile_detected() {
        assert_eq!(
            classify_failure("Dockerfile not found in /srv/minishell"),
            Some(Guidance::MissingBuildDefinition)
        );
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify_failure("port already allocated"), None);
    }
}
