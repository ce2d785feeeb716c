pub use super::admin_users::Entity as AdminUsers;
pub use super::contacts::Entity as Contacts;
pub use super::products::Entity as Products;
