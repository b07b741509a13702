/// Credential handling for identity users
///
/// - `password`: Argon2id hashing and verification
pub mod password;
