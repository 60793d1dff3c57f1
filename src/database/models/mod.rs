pub mod sheet;
pub mod user;

pub use sheet::{NewSheet, PersistedSheet};
pub use user::{Role, SheetRef, TokenUpdate, User};
