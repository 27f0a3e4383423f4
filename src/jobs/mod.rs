pub mod display_cycle;
