mod document;
mod track;

pub use document::ActiveModel as DocumentActive;
pub use document::Column as DocumentColumn;
pub use document::Entity as DocumentEntity;
pub use document::Model as Document;
pub use track::{NewTrack, Track, ValidationError};
