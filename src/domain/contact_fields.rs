/// Shared rule for the free-text fields: reject empty/whitespace, keep the
/// trimmed value.
fn non_blank(
    value: String,
    error: &str,
) -> Result<String, String> {
    let trimmed = value.trim();
    match trimmed.is_empty() {
        true => Err(error.to_string()),
        false => Ok(trimmed.to_string()),
    }
}

/// Must be instantiated with `ContactName::parse`; the field is private so
/// that the check cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactName(String);

impl ContactName {
    pub fn parse(name: String) -> Result<Self, String> {
        non_blank(name, "Name is required").map(Self)
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str { &self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubject(String);

impl ContactSubject {
    pub fn parse(subject: String) -> Result<Self, String> {
        non_blank(subject, "Subject is required").map(Self)
    }
}

impl AsRef<str> for ContactSubject {
    fn as_ref(&self) -> &str { &self.0 }
}

/// Body of the visitor's message. Inner whitespace and newlines are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub fn parse(message: String) -> Result<Self, String> {
        non_blank(message, "Message is required").map(Self)
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str { &self.0 }
}
