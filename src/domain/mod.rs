//! Field-shaped sanitizers.
//!
//! Each one picks a profile for a single kind of data. Email and phone
//! reject (`None`) rather than return a mangled value; records keep only
//! fields of the expected type; passwords are never touched.

mod contact;
mod records;
mod search;

pub use contact::{sanitize_email, sanitize_phone, MAX_EMAIL_LENGTH};
pub use records::{
    sanitize_product_data, sanitize_user_input, ImageUpload, ProductData, UserRegistration,
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_TITLE_LENGTH,
};
pub use search::{sanitize_search_query, MAX_QUERY_LENGTH};
