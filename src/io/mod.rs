mod cursor;
mod endian;
mod file;

pub use cursor::ByteCursor;
pub use endian::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, ByteOrder};
pub use file::{open_file, read_file};
