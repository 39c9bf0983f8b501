mod contact_email;
mod contact_fields;
mod contact_submission;
// allow external `use` statements to skip `contact_submission` etc
pub use contact_email::ContactEmail;
pub use contact_fields::ContactMessage;
pub use contact_fields::ContactName;
pub use contact_fields::ContactSubject;
pub use contact_submission::validate;
pub use contact_submission::ContactForm;
pub use contact_submission::ContactSubmission;
