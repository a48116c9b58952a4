//! Application Layer
//!
//! Use cases and application services.

pub mod change_password;
pub mod config;
pub mod login;
pub mod password_reset;
pub mod profile;
pub mod register;
pub mod seed;
pub mod templates;

// Re-exports
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use password_reset::{
    ForgotPasswordOutput, ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase,
    VerifyResetTokenUseCase,
};
pub use profile::GetProfileUseCase;
pub use register::{RegisterInput, RegisterUseCase};
