pub mod aggregator;
pub mod config;
pub mod controller;
pub mod feed;
pub mod filter;
pub mod pager;
pub mod tui;
