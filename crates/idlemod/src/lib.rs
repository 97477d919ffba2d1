//! Command line interface for packing, unpacking and modding the data containers of the
//! *Moorhuhn Kart* games.

pub mod commands;
