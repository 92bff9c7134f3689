// TUI widget modules for each panel and overlay.

pub mod confirm;
pub mod history_page;
pub mod roll_details;
pub mod roll_page;
pub mod season_form;
pub mod seasons_page;
pub mod status_bar;
