//! Input forms that produce service updates.

mod bulk_update;
mod date;
mod edit;
mod update;

pub use bulk_update::{BulkUpdateDialog, BulkUpdateForm, NO_CHANGE};
pub use date::{date_error, is_valid_date, parse_date, DATE_FORMAT_HINT};
pub use edit::{EditForm, EditPage};
pub use update::{ServiceUpdate, UpdateError};
