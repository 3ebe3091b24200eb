pub mod hh;
