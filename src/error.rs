// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types shared by the library modules

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {code}: {reason}")]
    Server { code: u16, reason: String },

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot convert {0} to USD: conversion rate is zero")]
    RateDivision(String),

    #[error("Amount out of range: {0}")]
    Overflow(String),

    #[error("Currency not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidRequest(err.to_string())
    }
}
