//! `todo auth` subcommands.

use std::io::Write;

use anyhow::Result;
use todo_gist_app::{AuthError, AuthStatus, Authenticator, Clock, TokenStorage, TokenValidator};

pub async fn setup<T, C, V>(
    authenticator: &Authenticator<T, C>,
    validator: &V,
    token: &str,
    out: &mut impl Write,
) -> Result<bool>
where
    T: TokenStorage,
    C: Clock,
    V: TokenValidator,
{
    match authenticator.authenticate(validator, token).await {
        Ok(_) => {
            writeln!(
                out,
                "Authentication successful! You're now ready to sync tasks with GitHub Gist."
            )?;
            Ok(true)
        }
        Err(AuthError::EmptyToken) => {
            writeln!(out, "Error: Token cannot be empty")?;
            Ok(false)
        }
        Err(AuthError::Storage(err)) => Err(err),
        Err(err) => {
            writeln!(out, "Authentication failed: {err}")?;
            Ok(false)
        }
    }
}

pub fn status<T: TokenStorage, C: Clock>(authenticator: &Authenticator<T, C>, out: &mut impl Write) -> Result<bool> {
    let line = match authenticator.status() {
        AuthStatus::NotConfigured => "Not authenticated. Run 'todo auth setup' to configure a GitHub token.",
        AuthStatus::Validated => "Authenticated. Token validated recently.",
        AuthStatus::Unverified => "Token configured. It will be re-validated on the next sync.",
    };
    writeln!(out, "{line}")?;
    Ok(true)
}

pub fn logout<T: TokenStorage, C: Clock>(authenticator: &Authenticator<T, C>, out: &mut impl Write) -> Result<bool> {
    authenticator.logout()?;
    writeln!(out, "Logged out. Stored token removed.")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;
    use time::macros::datetime;
    use todo_gist_app::{ManualClock, MemoryTokens, ValidationCache};
    use todo_gist_remote::TokenValidation;

    struct Verdict(TokenValidation);

    impl TokenValidator for Verdict {
        async fn validate(&self, _token: &str) -> TokenValidation {
            self.0.clone()
        }
    }

    fn authenticator() -> Authenticator<MemoryTokens, Arc<ManualClock>> {
        Authenticator::new(
            MemoryTokens::default(),
            ValidationCache::in_memory(
                Arc::new(ManualClock::new(datetime!(2024-03-01 09:00 UTC))),
                Duration::hours(1),
            ),
        )
    }

    #[tokio::test]
    async fn setup_then_status_then_logout() {
        let auth = authenticator();
        let mut out = Vec::new();

        assert!(setup(&auth, &Verdict(TokenValidation::Valid), "ghp_x", &mut out).await.unwrap());
        assert!(status(&auth, &mut out).unwrap());
        assert!(logout(&auth, &mut out).unwrap());
        assert!(status(&auth, &mut out).unwrap());

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Authentication successful!"));
        assert!(lines[1].starts_with("Authenticated."));
        assert!(lines[2].starts_with("Logged out."));
        assert!(lines[3].starts_with("Not authenticated."));
    }

    #[tokio::test]
    async fn rejected_token_reports_reason() {
        let auth = authenticator();
        let mut out = Vec::new();
        let ok = setup(
            &auth,
            &Verdict(TokenValidation::InsufficientPermissions),
            "ghp_x",
            &mut out,
        )
        .await
        .unwrap();
        assert!(!ok);
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("'gist' scope"));
        assert!(auth.credential().is_none());
    }

    #[tokio::test]
    async fn blank_token_is_rejected_locally() {
        let auth = authenticator();
        let mut out = Vec::new();
        let ok = setup(&auth, &Verdict(TokenValidation::Valid), "  ", &mut out).await.unwrap();
        assert!(!ok);
        assert_eq!(String::from_utf8(out).unwrap(), "Error: Token cannot be empty\n");
    }
}
