pub mod mute_sweep;
