pub mod blob;
pub mod cloudinary;
pub mod local_blob;
pub mod mailer;

pub use blob::{BlobError, BlobStore, ImageUpload, StoredBlob};
pub use cloudinary::{CloudinaryClient, CloudinaryConfig};
pub use local_blob::LocalBlobStore;
pub use mailer::{DisabledMailer, MailError, MailTransport, OutboundMail, SmtpMailer};
