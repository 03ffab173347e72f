//! HTTP request handlers for the web server.

mod aop;
mod api;
mod dashboard;
mod edit;
mod export;
mod helpers;
mod static_files;

// Re-export handlers for use by the router
pub use aop::{aop_bulk_update, aop_page};
pub use api::{
    api_bulk_update, api_dashboard, api_recalculate, api_recalculate_status, api_service,
    api_services, health,
};
pub use dashboard::dashboard_page;
pub use edit::{edit_page, edit_submit};
pub use export::export_csv;
pub use static_files::serve_css;
