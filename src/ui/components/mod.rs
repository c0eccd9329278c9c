pub mod help_panel;
pub mod insights_panel;
pub mod progress_bar;
pub mod stats_sidebar;
pub mod typing_area;
