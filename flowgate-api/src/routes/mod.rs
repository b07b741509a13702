/// API route handlers
///
/// - `health`: Health check endpoint
/// - `users`: Identity user collection and single-user resources
/// - `form_instances`: Submitted form instance listing

pub mod form_instances;
pub mod health;
pub mod users;
