//! Domain models shared by repositories, services and templates.

pub mod menu;
pub mod profile;
pub mod receipt;
pub mod session;

pub use menu::MenuItem;
pub use profile::Profile;
pub use receipt::{NewReceipt, Receipt};
pub use session::{CurrentUser, keys as session_keys};
