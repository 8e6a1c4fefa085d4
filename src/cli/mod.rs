//! Interactive front end for printing task tickets.

pub mod menu;
pub mod visuals;

pub use self::menu::Menu;
