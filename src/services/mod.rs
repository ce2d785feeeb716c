pub mod lead_mail;
pub mod notifications;
pub mod token;

pub use lead_mail::LeadTemplates;
pub use notifications::{EnqueueOutcome, NotificationQueue};
pub use token::{AdminClaims, TokenError, TokenService};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AdminProfile, AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod contact_service;
pub mod contact_service_impl;
pub use contact_service::{ContactError, ContactService, ContactSubmission};
pub use contact_service_impl::SeaOrmContactService;

pub mod product_service;
pub mod product_service_impl;
pub use product_service::{ImageSource, ProductError, ProductFields, ProductService};
pub use product_service_impl::SeaOrmProductService;
