pub mod filters;
pub mod frame_mailbox;
pub mod placeholder;
pub mod render;
