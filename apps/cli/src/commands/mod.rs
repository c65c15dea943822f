//! # Commands
//!
//! One module per shop view. Each exposes its clap subcommand enum and an
//! async `run` that borrows the [`AppContext`](crate::context::AppContext).
//!
//! | Module     | Backend resources                          |
//! |------------|--------------------------------------------|
//! | `auth`     | `auth/login`                               |
//! | `carpets`  | `carpets/`, `carpets/operations/`          |
//! | `invoice`  | `invoices/`, `checks/` (on finalize)       |
//! | `checks`   | `checks/`, `checks/upcoming`               |
//! | `reports`  | `reports/financial`, `reports/inventory`   |
//! | `users`    | `users/`, `auth/register`, `auth/me`       |

pub mod auth;
pub mod carpets;
pub mod checks;
pub mod invoice;
pub mod reports;
pub mod users;
