/// Authentication and authorization
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`authorization`]: per-board role gates backing every board operation

pub mod authorization;
pub mod jwt;
pub mod password;

pub use authorization::require_board_role;
pub use jwt::{Claims, TokenType};
