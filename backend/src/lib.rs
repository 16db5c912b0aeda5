pub mod catchers;
pub mod cleanup;
pub mod clock;
pub mod config;
pub mod context;
pub mod cors;
pub mod error;
pub mod logging;
pub mod processor;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;
pub use shared::{models::*, error::*};

use rocket::{Build, Rocket, catchers, figment::Figment, routes};
use crate::{
    catchers::{bad_request, internal_error, not_found, unprocessable},
    cors::CORS,
    logging::RequestLogger,
    routes::{all_options, create_poll, get_results, health, vote, AppState},
};

pub fn build(figment: Figment, state: AppState) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(CORS)
        .attach(RequestLogger)
        .manage(state)
        .mount("/api/v1", routes![create_poll, vote, get_results])
        .mount("/", routes![health, all_options])
        .register(
            "/",
            catchers![
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        )
}
