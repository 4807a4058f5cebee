pub mod clock;
pub mod grouping;
pub mod hasher;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod services;
pub mod window;
