pub mod mailer;
pub use mailer::{LogMailer, MailError, Mailer, RecordingMailer, SentMail, SmtpMailer};

pub mod token;
pub use token::{Claims, TokenError, TokenKeys};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, SignupResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod review_service;
pub mod review_service_impl;
pub use review_service::{ReviewError, ReviewService};
pub use review_service_impl::SeaOrmReviewService;
