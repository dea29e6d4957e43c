//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod characters;
pub mod error;
pub mod health;
pub mod schemas;
pub mod sheet_entries;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api` route on `cfg`.
///
/// Character routes are registered ahead of the `/{kind}/{id}` entry routes
/// so `character` is never treated as an entry kind.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::signup)
        .service(users::login)
        .service(characters::list_characters)
        .service(characters::create_character)
        .service(characters::get_character)
        .service(characters::update_character)
        .service(characters::delete_character)
        .service(sheet_entries::create_entry)
        .service(sheet_entries::get_entry)
        .service(sheet_entries::update_entry);
}
