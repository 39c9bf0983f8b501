/// Reply address of a visitor. Deliberately loose: anything non-blank that
/// contains an `@` is accepted, since the address is only ever read by a
/// human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        let email = email.trim();
        match !email.is_empty() && email.contains('@') {
            true => Ok(Self(email.to_string())),
            false => Err("Valid email is required".to_string()),
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str { &self.0 }
}
