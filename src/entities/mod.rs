pub mod prelude;

pub mod admin_users;
pub mod contacts;
pub mod products;
