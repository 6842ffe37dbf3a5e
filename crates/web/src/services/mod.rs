//! Business logic services.

pub mod auth;
pub mod campaign;
pub mod qr;
pub mod resend;
pub mod storage;
pub mod storefront;

pub use resend::ResendClient;
pub use storage::LogoStorage;
pub use storefront::StorefrontService;
