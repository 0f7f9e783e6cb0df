pub mod dtw;
pub mod indirect;
pub mod multipass;
pub mod path;
pub mod phone;
pub(crate) mod timeline_map;
