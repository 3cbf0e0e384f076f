pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::{phase_icon, Icons};
pub use output::{header, info, phase, section, sql_block, success, summary_row, warn};
pub use progress::{RunProgress, Spinner};
pub use progress_message::ProgressMessage;
pub use table::{plan_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
