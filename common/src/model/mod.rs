pub mod cell;
pub mod draft;
pub mod formula;
pub mod roster;
pub mod sharing;
pub mod template;
