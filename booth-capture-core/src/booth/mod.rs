pub mod controller;
pub mod countdown;
pub mod slot_machine;
