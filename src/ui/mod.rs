pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, status, success};
pub use table::{value_table, TableBuilder};
pub use theme::{theme, Theme};
