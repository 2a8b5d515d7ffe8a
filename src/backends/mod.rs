//! Drawing surfaces other than the script generator.

pub mod cairo;
