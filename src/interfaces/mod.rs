//! User-facing front ends over the URL service

pub mod cli;
