pub mod filter_bar;
pub mod header;
pub mod station_list;
pub mod waveform;
