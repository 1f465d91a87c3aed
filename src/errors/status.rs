// Start of file: /src/errors/status.rs

// * Status-code tables deciding the response shape for a resolved error.

use axum::http::StatusCode;

// ! Statuses that must never carry a body
const EMPTY: [u16; 3] = [204, 205, 304];

// ! Statuses answered with a Location header instead of a body
const REDIRECT: [u16; 7] = [300, 301, 302, 303, 305, 307, 308];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Empty,
    Redirect,
    Body,
}

impl StatusClass {
    pub fn of(status: StatusCode) -> Self {
        let code: u16 = status.as_u16();

        if EMPTY.contains(&code) {
            StatusClass::Empty
        } else if REDIRECT.contains(&code) {
            StatusClass::Redirect
        } else {
            StatusClass::Body
        }
    }
}


// End of file: /src/errors/status.rs
