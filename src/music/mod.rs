pub mod key;
pub mod note;
pub mod track;

pub use key::{Key, Mode, NOTE_MAX, NOTE_MIN};
pub use note::{pitch_to_name, Note};
pub use track::{Bar, Track};
