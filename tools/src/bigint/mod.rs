pub mod uint_dh;
