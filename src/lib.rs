//! Booking inquiry backend: public inquiry intake, staff review of clients
//! and bookings, a public content feed, and cookie sessions backed by the
//! record store.

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod routes;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod account;
    pub mod booking;
    pub mod client;
    pub mod feed;
    pub mod patch;
    pub mod session;
}

pub mod repositories {
    pub mod memory;
    pub mod postgres;
    pub mod store;
}

pub mod services {
    pub mod auth;
    pub mod inquiry;
    pub mod notifier;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod bookings;
    pub mod clients;
    pub mod feed;
    pub mod inquiry;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod inquiry;
}
