pub mod attachment;
pub mod render;

pub use attachment::{Attachment, Issue, User};
