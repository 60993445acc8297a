pub mod night_expansion;
