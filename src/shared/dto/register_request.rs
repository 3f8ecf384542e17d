use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

impl RegisterRequest {
    /// Returns the first problem found, phrased for the caller.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err("All fields are required".to_string());
        }
        if !is_plausible_email(&self.email) {
            return Err("Invalid email address".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        Ok(())
    }
}

/// Something before and after a single `@`, with a dot in the domain.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_complete_request() {
        assert!(request("Ada", "ada@example.com", "secret1").validate().is_ok());
    }

    #[rstest]
    #[case(request("", "ada@example.com", "secret1"), "All fields are required")]
    #[case(request("Ada", "  ", "secret1"), "All fields are required")]
    #[case(request("Ada", "ada@example.com", ""), "All fields are required")]
    #[case(request("Ada", "ada.example.com", "secret1"), "Invalid email address")]
    #[case(request("Ada", "ada@localhost", "secret1"), "Invalid email address")]
    #[case(request("Ada", "ada@example.com", "short"), "Password must be at least 6 characters")]
    fn rejects(#[case] req: RegisterRequest, #[case] message: &str) {
        assert_eq!(req.validate().unwrap_err(), message);
    }
}
